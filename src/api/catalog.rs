use axum::{
    Router,
    extract::{Json, Path, State},
    routing::get,
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    api::require_user,
    catalog::{self, Course, CourseDetail},
    error::Error,
};

#[utoipa::path(
    context_path = "/api/catalog",
    path = "/courses",
    method(get),
    responses((status = 200, description = "All courses", body = Vec<Course>))
)]
pub async fn get_courses(
    State(database): State<SqlitePool>,
) -> Result<Json<Vec<Course>>, Error> {
    let courses = catalog::get_course_list(&database).await?;
    Ok(Json(courses))
}

#[utoipa::path(
    context_path = "/api/catalog",
    path = "/courses/{course_id}",
    method(get),
    params(("course_id" = i64, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course with chapters, videos and completion flags", body = CourseDetail),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course_detail(
    State(database): State<SqlitePool>,
    session: Session,
    Path(course_id): Path<i64>,
) -> Result<Json<CourseDetail>, Error> {
    let user_id = require_user(&session).await?;
    let detail = catalog::get_course_detail(&database, course_id, user_id).await?;
    Ok(Json(detail))
}

pub fn get_catalog_scope() -> Router<SqlitePool> {
    Router::new().nest(
        "/catalog",
        Router::new()
            .route("/courses", get(get_courses))
            .route("/courses/{course_id}", get(get_course_detail)),
    )
}
