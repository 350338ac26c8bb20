use argon2::{
    Argon2, PasswordVerifier,
    password_hash::{PasswordHash, PasswordHasher, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::{catalog::Course, error::Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

pub async fn get_user_list(database: &SqlitePool) -> Result<Vec<UserInfo>, Error> {
    let users = sqlx::query_as::<_, UserInfo>("SELECT id, name, email, role FROM user ORDER BY id")
        .fetch_all(database)
        .await?;
    Ok(users)
}

pub async fn create_user(
    database: &SqlitePool,
    name: String,
    email: String,
    password: String,
) -> Result<i64, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();
    let now = time::OffsetDateTime::now_utc();
    let result = sqlx::query(
        "INSERT INTO user (name, email, password, role, created_at) VALUES (?, ?, ?, 'user', ?)",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(now)
    .execute(database)
    .await;
    match result {
        Ok(r) => Ok(r.last_insert_rowid()),
        Err(sqlx::Error::Database(db))
            if db.kind() == sqlx::error::ErrorKind::UniqueViolation =>
        {
            Err(Error::EmailTaken)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_user(database: &SqlitePool, id: i64) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM user WHERE id = ?")
        .bind(id)
        .execute(database)
        .await?;
    if result.rows_affected() == 0 {
        return Err(Error::NotFound("user"));
    }
    Ok(())
}

pub async fn get_user_info(database: &SqlitePool, id: i64) -> Result<UserInfo, Error> {
    let user =
        sqlx::query_as::<_, UserInfo>("SELECT id, name, email, role FROM user WHERE id = ?")
            .bind(id)
            .fetch_optional(database)
            .await?
            .ok_or(Error::NotFound("user"))?;
    Ok(user)
}

pub async fn login(
    database: &SqlitePool,
    email: String,
    password: String,
) -> Result<i64, Error> {
    let Some((id, password_hash)) = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, password FROM user WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(database)
    .await?
    else {
        return Err(Error::InvalidCredentials);
    };
    let parsed_hash = PasswordHash::new(&password_hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;
    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(Error::InvalidCredentials);
    }
    Ok(id)
}

/// Enroll a user into a course. Re-enrolling is a no-op, the
/// (user, course) pair is unique.
pub async fn enroll(database: &SqlitePool, user_id: i64, course_id: i64) -> Result<(), Error> {
    let now = time::OffsetDateTime::now_utc();
    sqlx::query(
        "INSERT INTO enrollment (user_id, course_id, created_at) VALUES (?, ?, ?) \
         ON CONFLICT (user_id, course_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(course_id)
    .bind(now)
    .execute(database)
    .await?;
    Ok(())
}

pub async fn get_enrolled_courses(
    database: &SqlitePool,
    user_id: i64,
) -> Result<Vec<Course>, Error> {
    let courses = sqlx::query_as::<_, Course>(
        "SELECT course.id, course.title, course.description FROM course \
         INNER JOIN enrollment ON course.id = enrollment.course_id \
         WHERE enrollment.user_id = ? ORDER BY course.id",
    )
    .bind(user_id)
    .fetch_all(database)
    .await?;
    Ok(courses)
}
