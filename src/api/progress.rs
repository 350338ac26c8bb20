use axum::{
    Router,
    extract::{Json, State},
    routing::{get, post},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use utoipa::ToSchema;

use crate::{
    api::require_user,
    error::Error,
    progress::{self, ProgressRecord, ProgressSummary},
};

#[derive(Deserialize, ToSchema)]
pub struct MarkRequest {
    pub video_id: i64,
    pub completed: bool,
}

#[utoipa::path(
    context_path = "/api/progress",
    path = "/mark",
    method(post),
    request_body = MarkRequest,
    responses(
        (status = 200, description = "Updated progress record", body = ProgressRecord),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn mark(
    State(database): State<SqlitePool>,
    session: Session,
    Json(req): Json<MarkRequest>,
) -> Result<Json<ProgressRecord>, Error> {
    let user_id = require_user(&session).await?;
    let record =
        progress::set_completion(&database, user_id, req.video_id, req.completed).await?;
    Ok(Json(record))
}

#[utoipa::path(
    context_path = "/api/progress",
    path = "/summary",
    method(get),
    responses(
        (status = 200, description = "Per-course and overall completion", body = ProgressSummary),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn summary(
    State(database): State<SqlitePool>,
    session: Session,
) -> Result<Json<ProgressSummary>, Error> {
    let user_id = require_user(&session).await?;
    let summary = progress::get_progress_summary(&database, user_id).await?;
    Ok(Json(summary))
}

pub fn get_progress_scope() -> Router<SqlitePool> {
    Router::new().nest(
        "/progress",
        Router::new()
            .route("/mark", post(mark))
            .route("/summary", get(summary)),
    )
}
