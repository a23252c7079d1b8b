use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::{
    auth::{optional_user, require_user, AuthHeader, JwtKeys},
    db::{self, UserId},
    error::{AppError, AppResult, DBError},
};

#[derive(Debug, Deserialize)]
pub struct RecipesLimit {
    #[serde(default)]
    recipes_limit: Option<usize>,
}

// GET /api/users/
pub async fn get_users(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    token: AuthHeader,
) -> AppResult<impl IntoResponse> {
    let user_id = optional_user(token, &keys)?;

    let users = db::list_users(&pool, user_id).await?;
    Ok(Json(users))
}

// GET /api/users/me/
pub async fn get_current_user(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    token: AuthHeader,
) -> AppResult<impl IntoResponse> {
    let user_id = require_user(token, &keys, &pool).await?;

    let user = db::get_user_profile(&pool, user_id, Some(user_id)).await?;
    Ok(Json(user))
}

// GET /api/users/:id/
pub async fn get_user(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    Path(user_id): Path<UserId>,
    token: AuthHeader,
) -> AppResult<impl IntoResponse> {
    let req_user_id = optional_user(token, &keys)?;

    let user = db::get_user_profile(&pool, user_id, req_user_id).await?;
    Ok(Json(user))
}

// GET /api/users/subscriptions/
pub async fn get_subscriptions(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    Query(params): Query<RecipesLimit>,
    token: AuthHeader,
) -> AppResult<impl IntoResponse> {
    let user_id = require_user(token, &keys, &pool).await?;

    let authors = db::subscriptions(&pool, user_id, params.recipes_limit).await?;
    Ok(Json(authors))
}

// POST /api/users/:id/subscribe/
pub async fn subscribe(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    Path(author_id): Path<UserId>,
    Query(params): Query<RecipesLimit>,
    token: AuthHeader,
) -> AppResult<impl IntoResponse> {
    let user_id = require_user(token, &keys, &pool).await?;

    if user_id == author_id {
        return Err(AppError::BadRequest("You cannot subscribe to yourself."));
    }
    if !db::user_exists(&pool, author_id).await? {
        return Err(DBError::InvalidReference(author_id).into());
    }

    db::follow(&pool, user_id, author_id).await?;
    tracing::debug!(user_id, author_id, "subscribed");

    let author = db::author(&pool, author_id, Some(user_id), params.recipes_limit).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

// DELETE /api/users/:id/subscribe/
pub async fn unsubscribe(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    Path(author_id): Path<UserId>,
    token: AuthHeader,
) -> AppResult<impl IntoResponse> {
    let user_id = require_user(token, &keys, &pool).await?;

    db::unfollow(&pool, user_id, author_id).await?;
    tracing::debug!(user_id, author_id, "unsubscribed");

    Ok(StatusCode::NO_CONTENT)
}
