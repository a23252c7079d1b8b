use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::{db, error::AppResult};

#[derive(Debug, Deserialize)]
pub struct IngredientSearch {
    #[serde(default)]
    name: Option<String>,
}

// GET /api/ingredients/?name=<prefix>
pub async fn get_ingredients(
    State(pool): State<PgPool>,
    Query(params): Query<IngredientSearch>,
) -> AppResult<impl IntoResponse> {
    let ingredients = db::list_ingredients(&pool, params.name.as_deref()).await?;
    Ok(Json(ingredients))
}

// GET /api/ingredients/:id/
pub async fn get_ingredient(
    State(pool): State<PgPool>,
    Path(ingredient_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let ingredient = db::get_ingredient(&pool, ingredient_id).await?;
    Ok(Json(ingredient))
}
