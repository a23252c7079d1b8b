use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;

use crate::{db, error::AppResult};

// GET /api/tags/
pub async fn get_tags(State(pool): State<PgPool>) -> AppResult<impl IntoResponse> {
    let tags = db::list_tags(&pool).await?;
    Ok(Json(tags))
}

// GET /api/tags/:id/
pub async fn get_tag(
    State(pool): State<PgPool>,
    Path(tag_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let tag = db::get_tag(&pool, tag_id).await?;
    Ok(Json(tag))
}
