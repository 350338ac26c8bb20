use std::collections::HashSet;

use serde::Serialize;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::{catalog, error::Error, user};

/// One completion flag per (user, video) pair; the pair is the primary
/// key, so toggling mutates in place rather than inserting duplicates.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct ProgressRecord {
    pub user_id: i64,
    pub video_id: i64,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Mark a video watched or unwatched. Safe to call repeatedly with the
/// same arguments; the final state is the same regardless of call count.
/// Fails with `NotFound` when the user or video does not exist (the
/// foreign key constraint rejects the insert).
pub async fn set_completion(
    database: &SqlitePool,
    user_id: i64,
    video_id: i64,
    completed: bool,
) -> Result<ProgressRecord, Error> {
    let now = OffsetDateTime::now_utc();
    let record = sqlx::query_as::<_, ProgressRecord>(
        "INSERT INTO progress_record (user_id, video_id, completed, updated_at) \
         VALUES (?, ?, ?, ?) \
         ON CONFLICT (user_id, video_id) DO UPDATE \
         SET completed = excluded.completed, updated_at = excluded.updated_at \
         RETURNING user_id, video_id, completed, updated_at",
    )
    .bind(user_id)
    .bind(video_id)
    .bind(completed)
    .bind(now)
    .fetch_one(database)
    .await?;
    Ok(record)
}

pub async fn get_progress_records(
    database: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ProgressRecord>, Error> {
    let records = sqlx::query_as::<_, ProgressRecord>(
        "SELECT user_id, video_id, completed, updated_at FROM progress_record WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_all(database)
    .await?;
    Ok(records)
}

pub async fn get_completed_video_ids(
    database: &SqlitePool,
    user_id: i64,
) -> Result<HashSet<i64>, Error> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT video_id FROM progress_record WHERE user_id = ? AND completed = 1",
    )
    .bind(user_id)
    .fetch_all(database)
    .await?;
    Ok(ids.into_iter().collect())
}

/// One enrolled course and the ids of every video it contains, the input
/// shape the aggregator works over.
#[derive(Debug, Clone)]
pub struct CourseVideos {
    pub course_id: i64,
    pub title: String,
    pub video_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseProgress {
    pub course_id: i64,
    pub title: String,
    pub total_videos: usize,
    pub completed_videos: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProgressSummary {
    /// Completed over total across all enrolled courses combined, not an
    /// average of the per-course percentages.
    pub overall_percent: f64,
    pub courses: Vec<CourseProgress>,
}

fn percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        // a course with no videos reports 0%, never NaN
        return 0.0;
    }
    completed as f64 / total as f64 * 100.0
}

/// Derive completion percentages from enrolled courses and the user's
/// progress records. Pure: no I/O, same inputs always yield the same
/// outputs.
pub fn compute_progress(
    courses: &[CourseVideos],
    records: &[ProgressRecord],
) -> ProgressSummary {
    let completed_ids: HashSet<i64> = records
        .iter()
        .filter(|r| r.completed)
        .map(|r| r.video_id)
        .collect();

    let mut total = 0;
    let mut completed = 0;
    let mut per_course = Vec::with_capacity(courses.len());
    for course in courses {
        let course_total = course.video_ids.len();
        let course_completed = course
            .video_ids
            .iter()
            .filter(|id| completed_ids.contains(id))
            .count();
        total += course_total;
        completed += course_completed;
        per_course.push(CourseProgress {
            course_id: course.course_id,
            title: course.title.clone(),
            total_videos: course_total,
            completed_videos: course_completed,
            percent: percent(course_completed, course_total),
        });
    }

    ProgressSummary {
        overall_percent: percent(completed, total),
        courses: per_course,
    }
}

/// Load the user's enrollments and progress records and aggregate them.
pub async fn get_progress_summary(
    database: &SqlitePool,
    user_id: i64,
) -> Result<ProgressSummary, Error> {
    let mut courses = Vec::new();
    for course in user::get_enrolled_courses(database, user_id).await? {
        let video_ids = catalog::get_course_video_ids(database, course.id).await?;
        courses.push(CourseVideos {
            course_id: course.id,
            title: course.title,
            video_ids,
        });
    }
    let records = get_progress_records(database, user_id).await?;
    Ok(compute_progress(&courses, &records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog, user, utils::test_pool};

    fn record(video_id: i64, completed: bool) -> ProgressRecord {
        ProgressRecord {
            user_id: 1,
            video_id,
            completed,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn zero_video_course_reports_zero_percent() {
        let courses = vec![CourseVideos {
            course_id: 1,
            title: "empty".into(),
            video_ids: vec![],
        }];
        let summary = compute_progress(&courses, &[]);
        assert_eq!(summary.courses[0].percent, 0.0);
        assert_eq!(summary.overall_percent, 0.0);
    }

    #[test]
    fn overall_is_ratio_of_sums_not_average() {
        // course A: 4 videos, 2 completed -> 50%
        // course B: 1 video, 1 completed -> 100%
        // overall: 3/5 -> 60%, not the 75% average
        let courses = vec![
            CourseVideos {
                course_id: 1,
                title: "A".into(),
                video_ids: vec![1, 2, 3, 4],
            },
            CourseVideos {
                course_id: 2,
                title: "B".into(),
                video_ids: vec![5],
            },
        ];
        let records = vec![record(1, true), record(2, true), record(3, false), record(5, true)];
        let summary = compute_progress(&courses, &records);
        assert_eq!(summary.courses[0].percent, 50.0);
        assert_eq!(summary.courses[1].percent, 100.0);
        assert_eq!(summary.overall_percent, 60.0);
    }

    #[test]
    fn unwatched_records_do_not_count() {
        let courses = vec![CourseVideos {
            course_id: 1,
            title: "A".into(),
            video_ids: vec![1, 2],
        }];
        let summary = compute_progress(&courses, &[record(1, false)]);
        assert_eq!(summary.courses[0].completed_videos, 0);
        assert_eq!(summary.overall_percent, 0.0);
    }

    async fn seed_video(db: &sqlx::SqlitePool) -> (i64, i64, i64) {
        let user_id = user::create_user(db, "u".into(), "u@example.com".into(), "pw".into())
            .await
            .unwrap();
        let course_id = catalog::create_course(db, "Rust".into(), None).await.unwrap();
        let chapter_id = catalog::create_chapter(db, course_id, "Basics".into())
            .await
            .unwrap();
        let video_id =
            catalog::create_video(db, chapter_id, "v".into(), "https://vimeo.com/1".into(), 1)
                .await
                .unwrap();
        (user_id, course_id, video_id)
    }

    #[tokio::test]
    async fn set_completion_is_idempotent() {
        let db = test_pool().await;
        let (user_id, _, video_id) = seed_video(&db).await;
        for _ in 0..3 {
            let record = set_completion(&db, user_id, video_id, true).await.unwrap();
            assert!(record.completed);
        }
        let records = get_progress_records(&db, user_id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].completed);
    }

    #[tokio::test]
    async fn toggle_updates_in_place() {
        let db = test_pool().await;
        let (user_id, _, video_id) = seed_video(&db).await;
        let first = set_completion(&db, user_id, video_id, true).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        let record = set_completion(&db, user_id, video_id, false).await.unwrap();
        assert!(!record.completed);
        // the in-place update refreshes the timestamp to the time of the call
        assert!(record.updated_at > first.updated_at);
        let records = get_progress_records(&db, user_id).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(!records[0].completed);
        assert_eq!(records[0].updated_at, record.updated_at);
    }

    #[tokio::test]
    async fn unknown_video_is_not_found() {
        let db = test_pool().await;
        let (user_id, _, _) = seed_video(&db).await;
        let err = set_completion(&db, user_id, 9999, true).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn deleting_video_cascades_to_progress() {
        let db = test_pool().await;
        let (user_id, _, video_id) = seed_video(&db).await;
        set_completion(&db, user_id, video_id, true).await.unwrap();
        catalog::delete_video(&db, video_id).await.unwrap();
        let records = get_progress_records(&db, user_id).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_progress() {
        let db = test_pool().await;
        let (user_id, _, video_id) = seed_video(&db).await;
        set_completion(&db, user_id, video_id, true).await.unwrap();
        user::delete_user(&db, user_id).await.unwrap();
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM progress_record")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn summary_reads_current_state() {
        let db = test_pool().await;
        let (user_id, course_id, video_id) = seed_video(&db).await;
        user::enroll(&db, user_id, course_id).await.unwrap();
        let summary = get_progress_summary(&db, user_id).await.unwrap();
        assert_eq!(summary.overall_percent, 0.0);
        set_completion(&db, user_id, video_id, true).await.unwrap();
        let summary = get_progress_summary(&db, user_id).await.unwrap();
        assert_eq!(summary.overall_percent, 100.0);
        assert_eq!(summary.courses.len(), 1);
        assert_eq!(summary.courses[0].completed_videos, 1);
    }
}
