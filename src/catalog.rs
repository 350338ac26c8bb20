use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::{
    embed::{self, EmbedRef},
    error::Error,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Chapter {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct Video {
    pub id: i64,
    pub chapter_id: i64,
    pub title: String,
    pub url: String,
    pub position: i64,
}

/// A video as rendered on a course page: the stored URL resolved to an
/// embed reference, plus the current user's completion flag.
#[derive(Debug, Serialize, ToSchema)]
pub struct VideoView {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub position: i64,
    pub embed: EmbedRef,
    pub completed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChapterView {
    pub id: i64,
    pub title: String,
    pub videos: Vec<VideoView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseDetail {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub chapters: Vec<ChapterView>,
}

pub async fn get_course_list(database: &SqlitePool) -> Result<Vec<Course>, Error> {
    let courses =
        sqlx::query_as::<_, Course>("SELECT id, title, description FROM course ORDER BY id")
            .fetch_all(database)
            .await?;
    Ok(courses)
}

pub async fn get_course(database: &SqlitePool, id: i64) -> Result<Course, Error> {
    let course =
        sqlx::query_as::<_, Course>("SELECT id, title, description FROM course WHERE id = ?")
            .bind(id)
            .fetch_optional(database)
            .await?
            .ok_or(Error::NotFound("course"))?;
    Ok(course)
}

/// Chapters display in insertion order, videos by their position field
/// within each chapter.
pub async fn get_course_chapters(
    database: &SqlitePool,
    course_id: i64,
) -> Result<Vec<Chapter>, Error> {
    let chapters = sqlx::query_as::<_, Chapter>(
        "SELECT id, course_id, title FROM chapter WHERE course_id = ? ORDER BY id",
    )
    .bind(course_id)
    .fetch_all(database)
    .await?;
    Ok(chapters)
}

pub async fn get_chapter_videos(
    database: &SqlitePool,
    chapter_id: i64,
) -> Result<Vec<Video>, Error> {
    let videos = sqlx::query_as::<_, Video>(
        "SELECT id, chapter_id, title, url, position FROM video \
         WHERE chapter_id = ? ORDER BY position, id",
    )
    .bind(chapter_id)
    .fetch_all(database)
    .await?;
    Ok(videos)
}

/// Ids of every video in a course, across all its chapters.
pub async fn get_course_video_ids(
    database: &SqlitePool,
    course_id: i64,
) -> Result<Vec<i64>, Error> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT video.id FROM video \
         INNER JOIN chapter ON video.chapter_id = chapter.id \
         WHERE chapter.course_id = ?",
    )
    .bind(course_id)
    .fetch_all(database)
    .await?;
    Ok(ids)
}

/// Assemble the full course page for one user: ordered chapters, ordered
/// videos, resolved embeds and the user's completion flags.
pub async fn get_course_detail(
    database: &SqlitePool,
    course_id: i64,
    user_id: i64,
) -> Result<CourseDetail, Error> {
    let course = get_course(database, course_id).await?;
    let completed = crate::progress::get_completed_video_ids(database, user_id).await?;
    let mut chapters = Vec::new();
    for chapter in get_course_chapters(database, course_id).await? {
        let videos = get_chapter_videos(database, chapter.id)
            .await?
            .into_iter()
            .map(|v| VideoView {
                completed: completed.contains(&v.id),
                embed: embed::resolve(&v.url),
                id: v.id,
                title: v.title,
                url: v.url,
                position: v.position,
            })
            .collect();
        chapters.push(ChapterView {
            id: chapter.id,
            title: chapter.title,
            videos,
        });
    }
    Ok(CourseDetail {
        id: course.id,
        title: course.title,
        description: course.description,
        chapters,
    })
}

pub async fn create_course(
    database: &SqlitePool,
    title: String,
    description: Option<String>,
) -> Result<i64, Error> {
    let result = sqlx::query("INSERT INTO course (title, description) VALUES (?, ?)")
        .bind(title)
        .bind(description)
        .execute(database)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn delete_course(database: &SqlitePool, id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM course WHERE id = ?")
        .bind(id)
        .execute(database)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound("course"));
    }
    Ok(())
}

pub async fn create_chapter(
    database: &SqlitePool,
    course_id: i64,
    title: String,
) -> Result<i64, Error> {
    let result = sqlx::query("INSERT INTO chapter (course_id, title) VALUES (?, ?)")
        .bind(course_id)
        .bind(title)
        .execute(database)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn create_video(
    database: &SqlitePool,
    chapter_id: i64,
    title: String,
    url: String,
    position: i64,
) -> Result<i64, Error> {
    let result =
        sqlx::query("INSERT INTO video (chapter_id, title, url, position) VALUES (?, ?, ?, ?)")
            .bind(chapter_id)
            .bind(title)
            .bind(url)
            .bind(position)
            .execute(database)
            .await?;
    Ok(result.last_insert_rowid())
}

pub async fn delete_video(database: &SqlitePool, id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM video WHERE id = ?")
        .bind(id)
        .execute(database)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound("video"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{embed::EmbedRef, utils::test_pool};

    async fn seed_course(db: &SqlitePool) -> (i64, i64) {
        let course_id = create_course(db, "Rust".into(), Some("intro".into()))
            .await
            .unwrap();
        let chapter_id = create_chapter(db, course_id, "Basics".into()).await.unwrap();
        (course_id, chapter_id)
    }

    #[tokio::test]
    async fn videos_order_by_position() {
        let db = test_pool().await;
        let (course_id, chapter_id) = seed_course(&db).await;
        create_video(&db, chapter_id, "b".into(), "https://vimeo.com/2".into(), 2)
            .await
            .unwrap();
        create_video(&db, chapter_id, "a".into(), "https://vimeo.com/1".into(), 1)
            .await
            .unwrap();
        let videos = get_chapter_videos(&db, chapter_id).await.unwrap();
        assert_eq!(
            videos.iter().map(|v| v.title.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        let ids = get_course_video_ids(&db, course_id).await.unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn chapter_under_unknown_course_is_not_found() {
        let db = test_pool().await;
        let err = create_chapter(&db, 42, "orphan".into()).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn course_detail_resolves_embeds() {
        let db = test_pool().await;
        let (course_id, chapter_id) = seed_course(&db).await;
        create_video(
            &db,
            chapter_id,
            "intro".into(),
            "https://youtu.be/dQw4w9WgXcQ".into(),
            1,
        )
        .await
        .unwrap();
        create_video(
            &db,
            chapter_id,
            "raw file".into(),
            "https://example.com/video.mp4".into(),
            2,
        )
        .await
        .unwrap();
        let user_id =
            crate::user::create_user(&db, "u".into(), "u@example.com".into(), "pw".into())
                .await
                .unwrap();
        let detail = get_course_detail(&db, course_id, user_id).await.unwrap();
        assert_eq!(detail.chapters.len(), 1);
        let videos = &detail.chapters[0].videos;
        assert_eq!(
            videos[0].embed,
            EmbedRef::YouTube {
                id: "dQw4w9WgXcQ".to_string()
            }
        );
        assert_eq!(videos[1].embed, EmbedRef::Unsupported);
        assert!(!videos[0].completed);
    }

    #[tokio::test]
    async fn deleting_course_cascades_to_children() {
        let db = test_pool().await;
        let (course_id, chapter_id) = seed_course(&db).await;
        create_video(&db, chapter_id, "v".into(), "https://vimeo.com/1".into(), 1)
            .await
            .unwrap();
        delete_course(&db, course_id).await.unwrap();
        let chapters = get_course_chapters(&db, course_id).await.unwrap();
        assert!(chapters.is_empty());
        let videos = get_chapter_videos(&db, chapter_id).await.unwrap();
        assert!(videos.is_empty());
    }
}
