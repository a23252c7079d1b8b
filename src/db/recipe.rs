use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};

use crate::error::{AppResult, DBError};

use super::{
    ingredient::set_recipe_ingredients, tag::set_recipe_tags, IngredientAmount, Tag, UserId,
    UserProfile,
};

const SELECT_RECIPE: &str = include_str!("../sql/recipes/select_recipe.sql");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Serialize, FromRow)]
pub struct Recipe {
    pub id: i32,
    pub tags: Json<Vec<Tag>>,
    pub author: Json<UserProfile>,
    pub ingredients: Json<Vec<RecipeIngredient>>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
}

/// The short form used in favorite/basket responses and subscriptions.
#[derive(Debug, Serialize, FromRow)]
pub struct ShortRecipe {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

pub struct RecipeFields<'a> {
    pub name: &'a str,
    pub image: &'a str,
    pub text: &'a str,
    pub cooking_time: i32,
}

#[derive(Default)]
pub struct RecipeChanges<'a> {
    pub name: Option<&'a str>,
    pub image: Option<&'a str>,
    pub text: Option<&'a str>,
    pub cooking_time: Option<i32>,
}

#[derive(Debug, Default)]
pub struct RecipeFilter {
    pub author: Option<UserId>,
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

pub async fn retrieve_recipe(
    pool: &PgPool,
    recipe_id: i32,
    req_user_id: Option<UserId>,
) -> AppResult<Recipe> {
    let recipe = sqlx::query_as::<_, Recipe>(&format!("{SELECT_RECIPE} WHERE recipes.id = $2"))
        .bind(req_user_id)
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

    recipe.ok_or(DBError::NotFound.into())
}

pub async fn list_recipes(
    pool: &PgPool,
    filter: &RecipeFilter,
    req_user_id: Option<UserId>,
) -> AppResult<Vec<Recipe>> {
    let query = format!(
        "{SELECT_RECIPE}
        WHERE ($2::INTEGER IS NULL OR recipes.author_id = $2)
            AND (
                cardinality($3::TEXT[]) = 0
                OR EXISTS (
                    SELECT 1
                    FROM recipe_tags
                    INNER JOIN tags ON tags.id = recipe_tags.tag_id
                    WHERE recipe_tags.recipe_id = recipes.id
                        AND tags.slug = ANY($3)
                )
            )
            AND (
                NOT $4::BOOLEAN
                OR $1::INTEGER IS NULL
                OR EXISTS (
                    SELECT 1 FROM favorites
                    WHERE favorites.user_id = $1 AND favorites.recipe_id = recipes.id
                )
            )
            AND (
                NOT $5::BOOLEAN
                OR $1::INTEGER IS NULL
                OR EXISTS (
                    SELECT 1 FROM baskets
                    WHERE baskets.user_id = $1 AND baskets.recipe_id = recipes.id
                )
            )
        ORDER BY recipes.created_at DESC, recipes.id DESC"
    );

    let recipes = sqlx::query_as::<_, Recipe>(&query)
        .bind(req_user_id)
        .bind(filter.author)
        .bind(&filter.tags)
        .bind(filter.is_favorited)
        .bind(filter.is_in_shopping_cart)
        .fetch_all(pool)
        .await?;

    Ok(recipes)
}

pub async fn recipe_author(pool: &PgPool, recipe_id: i32) -> AppResult<UserId> {
    let author = sqlx::query_scalar::<_, UserId>("SELECT author_id FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

    author.ok_or(DBError::NotFound.into())
}

pub async fn retrieve_short_recipe(pool: &PgPool, recipe_id: i32) -> AppResult<Option<ShortRecipe>> {
    let recipe = sqlx::query_as::<_, ShortRecipe>(
        "SELECT id, name, image, cooking_time FROM recipes WHERE id = $1",
    )
    .bind(recipe_id)
    .fetch_optional(pool)
    .await?;

    Ok(recipe)
}

/// Inserts the recipe row and its tag/ingredient links in one transaction.
pub async fn create_recipe(
    pool: &PgPool,
    author_id: UserId,
    fields: RecipeFields<'_>,
    tag_ids: &[i32],
    ingredients: &[IngredientAmount],
) -> AppResult<i32> {
    let mut tx = pool.begin().await?;

    let recipe_id = sqlx::query_scalar::<_, i32>(
        "
        INSERT INTO recipes (author_id, name, image, text, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        ",
    )
    .bind(author_id)
    .bind(fields.name)
    .bind(fields.image)
    .bind(fields.text)
    .bind(fields.cooking_time)
    .fetch_one(&mut *tx)
    .await?;

    set_recipe_tags(&mut tx, recipe_id, tag_ids).await?;
    set_recipe_ingredients(&mut tx, recipe_id, ingredients).await?;

    tx.commit().await?;
    tracing::debug!(recipe_id, author_id, "recipe created");

    Ok(recipe_id)
}

/// Partial update. Supplied tag/ingredient lists replace the old ones wholesale.
pub async fn update_recipe(
    pool: &PgPool,
    recipe_id: i32,
    changes: RecipeChanges<'_>,
    tag_ids: Option<&[i32]>,
    ingredients: Option<&[IngredientAmount]>,
) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        "
        UPDATE recipes
            SET (name, image, text, cooking_time) =
                (
                    COALESCE($1, name),
                    COALESCE($2, image),
                    COALESCE($3, text),
                    COALESCE($4, cooking_time)
                )
            WHERE id = $5
        ",
    )
    .bind(changes.name)
    .bind(changes.image)
    .bind(changes.text)
    .bind(changes.cooking_time)
    .bind(recipe_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(DBError::NotFound.into());
    }

    if let Some(tag_ids) = tag_ids {
        set_recipe_tags(&mut tx, recipe_id, tag_ids).await?;
    }
    if let Some(ingredients) = ingredients {
        set_recipe_ingredients(&mut tx, recipe_id, ingredients).await?;
    }

    tx.commit().await?;
    tracing::debug!(recipe_id, "recipe updated");

    Ok(())
}

pub async fn delete_recipe(pool: &PgPool, recipe_id: i32) -> AppResult<()> {
    let deleted = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .execute(pool)
        .await?;

    match deleted.rows_affected() {
        0 => Err(DBError::NotFound.into()),
        _ => Ok(()),
    }
}
