pub mod admin;
pub mod catalog;
pub mod progress;
pub mod user;

use axum::Router;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    error::Error,
    user::{Role, UserInfo},
};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Resolve the current user id from the session, 401 when not logged in.
pub(crate) async fn require_user(session: &Session) -> Result<i64, Error> {
    session
        .get::<i64>(USER_ID_KEY)
        .await
        .map_err(|e| Error::Other(e.into()))?
        .ok_or(Error::Unauthorized)
}

pub(crate) async fn require_admin(
    database: &SqlitePool,
    session: &Session,
) -> Result<UserInfo, Error> {
    let user_id = require_user(session).await?;
    let user = crate::user::get_user_info(database, user_id).await?;
    if user.role != Role::Admin {
        return Err(Error::Forbidden);
    }
    Ok(user)
}

pub fn get_api_router() -> Router<SqlitePool> {
    Router::new()
        .merge(user::get_user_scope())
        .merge(catalog::get_catalog_scope())
        .merge(progress::get_progress_scope())
        .merge(admin::get_admin_scope())
}
