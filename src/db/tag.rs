use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::error::{AppResult, DBError};

use super::first_missing;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub slug: String,
}

pub async fn list_tags(pool: &PgPool) -> AppResult<Vec<Tag>> {
    let tags = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags ORDER BY name, id")
        .fetch_all(pool)
        .await?;

    Ok(tags)
}

pub async fn get_tag(pool: &PgPool, tag_id: i32) -> AppResult<Tag> {
    let tag = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags WHERE id = $1")
        .bind(tag_id)
        .fetch_optional(pool)
        .await?;

    tag.ok_or(DBError::NotFound.into())
}

/// Replaces the recipe's tag links with `tag_ids`.
pub(super) async fn set_recipe_tags(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i32,
    tag_ids: &[i32],
) -> AppResult<()> {
    let found = sqlx::query_scalar::<_, i32>("SELECT id FROM tags WHERE id = ANY($1)")
        .bind(tag_ids)
        .fetch_all(&mut **tx)
        .await?;

    if let Some(missing) = first_missing(tag_ids, &found) {
        return Err(DBError::InvalidReference(missing).into());
    }

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;

    sqlx::query(
        "
        INSERT INTO recipe_tags (recipe_id, tag_id)
        SELECT $1, tag_id FROM UNNEST($2::INTEGER[]) AS tag_id
        ",
    )
    .bind(recipe_id)
    .bind(tag_ids)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
