use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    // the id is exactly 11 characters; the trailing boundary keeps a
    // longer id segment from matching truncated
    Regex::new(
        r"(?:youtu\.be/|youtube\.com/(?:embed/|v/|watch\?v=))([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    )
    .expect("invalid youtube regex")
});

static VIMEO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"vimeo\.com/(\d+)").expect("invalid vimeo regex"));

/// A playable embed reference extracted from a stored video URL.
///
/// `Unsupported` is a normal terminal state, not an error: the caller
/// renders a fallback instead of a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "provider")]
pub enum EmbedRef {
    #[serde(rename = "youtube")]
    YouTube { id: String },
    #[serde(rename = "vimeo")]
    Vimeo { id: String },
    #[serde(rename = "unsupported")]
    Unsupported,
}

/// Classify a video URL. Purely syntactic: no check that the referenced
/// video actually exists. YouTube is tried before Vimeo, first match wins.
pub fn resolve(url: &str) -> EmbedRef {
    if let Some(caps) = YOUTUBE_RE.captures(url) {
        return EmbedRef::YouTube {
            id: caps[1].to_string(),
        };
    }
    if let Some(caps) = VIMEO_RE.captures(url) {
        return EmbedRef::Vimeo {
            id: caps[1].to_string(),
        };
    }
    EmbedRef::Unsupported
}
