use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::{AppResult, DBError};

pub type UserId = i32;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub email: String,
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

const SELECT_PROFILE: &str = r#"
    SELECT
        users.email,
        users.id,
        users.username,
        users.first_name,
        users.last_name,
        EXISTS (
            SELECT 1
            FROM follows
            WHERE follows.user_id = $1
                AND follows.following_id = users.id
        ) AS is_subscribed
    FROM users
"#;

pub async fn list_users(pool: &PgPool, req_user_id: Option<UserId>) -> AppResult<Vec<UserProfile>> {
    let users = sqlx::query_as::<_, UserProfile>(&format!("{SELECT_PROFILE} ORDER BY users.id"))
        .bind(req_user_id)
        .fetch_all(pool)
        .await?;

    Ok(users)
}

pub async fn get_user_profile(
    pool: &PgPool,
    user_id: UserId,
    req_user_id: Option<UserId>,
) -> AppResult<UserProfile> {
    let user = sqlx::query_as::<_, UserProfile>(&format!("{SELECT_PROFILE} WHERE users.id = $2"))
        .bind(req_user_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    user.ok_or(DBError::NotFound.into())
}

pub async fn user_exists(pool: &PgPool, user_id: UserId) -> AppResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(exists)
}
