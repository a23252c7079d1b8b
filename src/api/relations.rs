//! Favorite and shopping-cart toggles share these handlers; the relation kind is a type parameter.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;

use crate::{
    auth::{require_user, AuthHeader, JwtKeys},
    db::{add_relation, remove_relation, retrieve_short_recipe, RecipeRelation},
    error::{AppResult, DBError},
};

// POST /api/recipes/:id/favorite/
// POST /api/recipes/:id/shopping_cart/
pub async fn add_recipe<R: RecipeRelation>(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    Path(recipe_id): Path<i32>,
    token: AuthHeader,
) -> AppResult<impl IntoResponse> {
    let user_id = require_user(token, &keys, &pool).await?;

    let Some(recipe) = retrieve_short_recipe(&pool, recipe_id).await? else {
        return Err(DBError::InvalidReference(recipe_id).into());
    };

    add_relation::<R>(&pool, user_id, recipe_id).await?;
    tracing::debug!(user_id, recipe_id, relation = R::TABLE, "recipe added");

    Ok((StatusCode::CREATED, Json(recipe)))
}

// DELETE /api/recipes/:id/favorite/
// DELETE /api/recipes/:id/shopping_cart/
pub async fn remove_recipe<R: RecipeRelation>(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    Path(recipe_id): Path<i32>,
    token: AuthHeader,
) -> AppResult<impl IntoResponse> {
    let user_id = require_user(token, &keys, &pool).await?;

    if retrieve_short_recipe(&pool, recipe_id).await?.is_none() {
        return Err(DBError::InvalidReference(recipe_id).into());
    }

    remove_relation::<R>(&pool, user_id, recipe_id).await?;
    tracing::debug!(user_id, recipe_id, relation = R::TABLE, "recipe removed");

    Ok(StatusCode::NO_CONTENT)
}
