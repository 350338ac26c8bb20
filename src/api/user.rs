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
    api::{USER_ID_KEY, require_user},
    catalog::Course,
    error::Error,
    user::{self, UserInfo},
};

#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    context_path = "/api/user",
    path = "/register",
    method(post),
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = i64),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(database): State<SqlitePool>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<i64>, Error> {
    let id = user::create_user(&database, req.name, req.email, req.password).await?;
    Ok(Json(id))
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    context_path = "/api/user",
    path = "/login",
    method(post),
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(database): State<SqlitePool>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<&'static str, Error> {
    let id = user::login(&database, req.email, req.password).await?;
    session
        .insert(USER_ID_KEY, id)
        .await
        .map_err(|e| Error::Other(e.into()))?;
    Ok("Login successful")
}

#[utoipa::path(
    context_path = "/api/user",
    path = "/logout",
    method(post),
    responses((status = 200, description = "Logout successful"))
)]
pub async fn logout(session: Session) -> &'static str {
    let _ = session.delete().await;
    "Logout successful"
}

#[utoipa::path(
    context_path = "/api/user",
    path = "/user_info",
    method(get),
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn user_info(
    State(database): State<SqlitePool>,
    session: Session,
) -> Result<Json<UserInfo>, Error> {
    let user_id = require_user(&session).await?;
    let user = user::get_user_info(&database, user_id).await?;
    Ok(Json(user))
}

#[derive(Deserialize, ToSchema)]
pub struct EnrollRequest {
    pub course_id: i64,
}

#[utoipa::path(
    context_path = "/api/user",
    path = "/enroll",
    method(post),
    params(("course_id" = i64, Query, description = "Course to enroll into")),
    responses(
        (status = 200, description = "Enrolled"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn enroll(
    State(database): State<SqlitePool>,
    session: Session,
    Query(req): Query<EnrollRequest>,
) -> Result<&'static str, Error> {
    let user_id = require_user(&session).await?;
    user::enroll(&database, user_id, req.course_id).await?;
    Ok("Enrolled")
}

#[utoipa::path(
    context_path = "/api/user",
    path = "/my_courses",
    method(get),
    responses(
        (status = 200, description = "Enrolled courses", body = Vec<Course>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn my_courses(
    State(database): State<SqlitePool>,
    session: Session,
) -> Result<Json<Vec<Course>>, Error> {
    let user_id = require_user(&session).await?;
    let courses = user::get_enrolled_courses(&database, user_id).await?;
    Ok(Json(courses))
}

pub fn get_user_scope() -> Router<SqlitePool> {
    Router::new().nest(
        "/user",
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/logout", post(logout))
            .route("/user_info", get(user_info))
            .route("/enroll", post(enroll))
            .route("/my_courses", get(my_courses)),
    )
}
