use sqlx::{FromRow, PgPool};

use crate::error::{AppResult, DBError};

use super::UserId;

/// A `(user, recipe)` join table such as favorites or the shopping basket.
pub trait RecipeRelation: Send + Sync + 'static {
    const TABLE: &'static str;
    const ALREADY_ADDED: &'static str;
    const NOT_ADDED: &'static str;
}

pub struct Favorite;

impl RecipeRelation for Favorite {
    const TABLE: &'static str = "favorites";
    const ALREADY_ADDED: &'static str = "Recipe is already in favorites.";
    const NOT_ADDED: &'static str = "Recipe is not in favorites.";
}

pub struct Basket;

impl RecipeRelation for Basket {
    const TABLE: &'static str = "baskets";
    const ALREADY_ADDED: &'static str = "Recipe is already in the shopping cart.";
    const NOT_ADDED: &'static str = "Recipe is not in the shopping cart.";
}

pub async fn add_relation<R: RecipeRelation>(
    pool: &PgPool,
    user_id: UserId,
    recipe_id: i32,
) -> AppResult<()> {
    let inserted = sqlx::query_scalar::<_, i32>(&format!(
        "
        INSERT INTO {} (user_id, recipe_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        RETURNING id
        ",
        R::TABLE
    ))
    .bind(user_id)
    .bind(recipe_id)
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(_) => Ok(()),
        None => Err(DBError::Duplicate(R::ALREADY_ADDED).into()),
    }
}

pub async fn remove_relation<R: RecipeRelation>(
    pool: &PgPool,
    user_id: UserId,
    recipe_id: i32,
) -> AppResult<()> {
    let deleted = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
        R::TABLE
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await?;

    match deleted.rows_affected() {
        0 => Err(DBError::NotRelated(R::NOT_ADDED).into()),
        _ => Ok(()),
    }
}

pub async fn basket_size(pool: &PgPool, user_id: UserId) -> AppResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM baskets WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// One ingredient row of one basket recipe.
#[derive(Debug, FromRow)]
pub struct BasketLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Basket rows in basket order, then each recipe's ingredient order.
pub async fn basket_lines(pool: &PgPool, user_id: UserId) -> AppResult<Vec<BasketLine>> {
    let lines = sqlx::query_as::<_, BasketLine>(
        "
        SELECT
            ingredients.name,
            ingredients.measurement_unit,
            recipe_ingredients.amount
        FROM baskets
        INNER JOIN recipe_ingredients ON recipe_ingredients.recipe_id = baskets.recipe_id
        INNER JOIN ingredients ON ingredients.id = recipe_ingredients.ingredient_id
        WHERE baskets.user_id = $1
        ORDER BY baskets.id, recipe_ingredients.id
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(lines)
}
