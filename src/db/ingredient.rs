use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::error::{AppResult, DBError};

use super::first_missing;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

/// Ingredient reference inside a recipe payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    pub id: i32,
    pub amount: i32,
}

/// Escapes LIKE wildcards so user input only matches as a literal prefix.
pub fn like_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn list_ingredients(pool: &PgPool, name_prefix: Option<&str>) -> AppResult<Vec<Ingredient>> {
    let ingredients = match name_prefix.filter(|prefix| !prefix.is_empty()) {
        Some(prefix) => {
            sqlx::query_as::<_, Ingredient>(
                r#"
                SELECT id, name, measurement_unit
                FROM ingredients
                WHERE lower(name) LIKE lower($1) ESCAPE '\'
                ORDER BY name
                "#,
            )
            .bind(like_prefix_pattern(prefix))
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Ingredient>(
                "SELECT id, name, measurement_unit FROM ingredients ORDER BY name",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(ingredients)
}

pub async fn get_ingredient(pool: &PgPool, ingredient_id: i32) -> AppResult<Ingredient> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
    )
    .bind(ingredient_id)
    .fetch_optional(pool)
    .await?;

    ingredient.ok_or(DBError::NotFound.into())
}

/// Replaces the recipe's ingredient rows, keeping the given order.
pub(super) async fn set_recipe_ingredients(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: i32,
    ingredients: &[IngredientAmount],
) -> AppResult<()> {
    let ids: Vec<i32> = ingredients.iter().map(|ingredient| ingredient.id).collect();

    let found = sqlx::query_scalar::<_, i32>("SELECT id FROM ingredients WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_all(&mut **tx)
        .await?;

    if let Some(missing) = first_missing(&ids, &found) {
        return Err(DBError::InvalidReference(missing).into());
    }

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;

    for ingredient in ingredients {
        sqlx::query(
            "
            INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(recipe_id)
        .bind(ingredient.id)
        .bind(ingredient.amount)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::like_prefix_pattern;

    #[test]
    fn prefix_pattern_appends_wildcard() {
        assert_eq!(like_prefix_pattern("Fl"), "Fl%");
        assert_eq!(like_prefix_pattern(""), "%");
    }

    #[test]
    fn prefix_pattern_escapes_wildcards() {
        assert_eq!(like_prefix_pattern("50%_"), "50\\%\\_%");
        assert_eq!(like_prefix_pattern("a\\b"), "a\\\\b%");
    }
}
