use axum::{
    Router,
    extract::{Json, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use utoipa::ToSchema;

use crate::{
    api::require_admin,
    catalog,
    error::Error,
    user::{self, UserInfo},
};

#[derive(Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
}

#[utoipa::path(
    context_path = "/api/admin",
    path = "/create_course",
    method(post),
    request_body = CreateCourseRequest,
    responses(
        (status = 200, description = "Course created", body = i64),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn create_course(
    State(database): State<SqlitePool>,
    session: Session,
    Json(req): Json<CreateCourseRequest>,
) -> Result<Json<i64>, Error> {
    require_admin(&database, &session).await?;
    let id = catalog::create_course(&database, req.title, req.description).await?;
    Ok(Json(id))
}

#[derive(Deserialize, ToSchema)]
pub struct CourseIdRequest {
    pub course_id: i64,
}

#[utoipa::path(
    context_path = "/api/admin",
    path = "/delete_course",
    method(post),
    params(("course_id" = i64, Query, description = "Course to delete")),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn delete_course(
    State(database): State<SqlitePool>,
    session: Session,
    Query(req): Query<CourseIdRequest>,
) -> Result<&'static str, Error> {
    require_admin(&database, &session).await?;
    catalog::delete_course(&database, req.course_id).await?;
    Ok("Course deleted")
}

#[derive(Deserialize, ToSchema)]
pub struct CreateChapterRequest {
    pub course_id: i64,
    pub title: String,
}

#[utoipa::path(
    context_path = "/api/admin",
    path = "/create_chapter",
    method(post),
    request_body = CreateChapterRequest,
    responses(
        (status = 200, description = "Chapter created", body = i64),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn create_chapter(
    State(database): State<SqlitePool>,
    session: Session,
    Json(req): Json<CreateChapterRequest>,
) -> Result<Json<i64>, Error> {
    require_admin(&database, &session).await?;
    let id = catalog::create_chapter(&database, req.course_id, req.title).await?;
    Ok(Json(id))
}

#[derive(Deserialize, ToSchema)]
pub struct CreateVideoRequest {
    pub chapter_id: i64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub position: i64,
}

#[utoipa::path(
    context_path = "/api/admin",
    path = "/create_video",
    method(post),
    request_body = CreateVideoRequest,
    responses(
        (status = 200, description = "Video created", body = i64),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Chapter not found")
    )
)]
pub async fn create_video(
    State(database): State<SqlitePool>,
    session: Session,
    Json(req): Json<CreateVideoRequest>,
) -> Result<Json<i64>, Error> {
    require_admin(&database, &session).await?;
    let id =
        catalog::create_video(&database, req.chapter_id, req.title, req.url, req.position).await?;
    Ok(Json(id))
}

#[derive(Deserialize, ToSchema)]
pub struct VideoIdRequest {
    pub video_id: i64,
}

#[utoipa::path(
    context_path = "/api/admin",
    path = "/delete_video",
    method(post),
    params(("video_id" = i64, Query, description = "Video to delete")),
    responses(
        (status = 200, description = "Video deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Video not found")
    )
)]
pub async fn delete_video(
    State(database): State<SqlitePool>,
    session: Session,
    Query(req): Query<VideoIdRequest>,
) -> Result<&'static str, Error> {
    require_admin(&database, &session).await?;
    catalog::delete_video(&database, req.video_id).await?;
    Ok("Video deleted")
}

#[utoipa::path(
    context_path = "/api/admin",
    path = "/list_users",
    method(get),
    responses(
        (status = 200, description = "All users", body = Vec<UserInfo>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_users(
    State(database): State<SqlitePool>,
    session: Session,
) -> Result<Json<Vec<UserInfo>>, Error> {
    require_admin(&database, &session).await?;
    let users = user::get_user_list(&database).await?;
    Ok(Json(users))
}

#[derive(Deserialize, ToSchema)]
pub struct UserIdRequest {
    pub user_id: i64,
}

#[utoipa::path(
    context_path = "/api/admin",
    path = "/delete_user",
    method(post),
    params(("user_id" = i64, Query, description = "User to delete")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(database): State<SqlitePool>,
    session: Session,
    Query(req): Query<UserIdRequest>,
) -> Result<&'static str, Error> {
    require_admin(&database, &session).await?;
    user::delete_user(&database, req.user_id).await?;
    Ok("User deleted")
}

pub fn get_admin_scope() -> Router<SqlitePool> {
    Router::new().nest(
        "/admin",
        Router::new()
            .route("/create_course", post(create_course))
            .route("/delete_course", post(delete_course))
            .route("/create_chapter", post(create_chapter))
            .route("/create_video", post(create_video))
            .route("/delete_video", post(delete_video))
            .route("/list_users", get(list_users))
            .route("/delete_user", post(delete_user)),
    )
}
