use std::{borrow::Cow, collections::HashSet};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::Query;
use serde::Deserialize;
use sqlx::PgPool;
use validator::{Validate, ValidationError};

use super::parse_body;
use crate::{
    auth::{optional_user, require_user, AuthHeader, JwtKeys},
    db::{self, retrieve_recipe, IngredientAmount, RecipeChanges, RecipeFields, RecipeFilter, UserId},
    error::{AppError, AppResult},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipe {
    #[validate(
        length(min = 1, message = "tags can't be empty"),
        custom(function = "unique_tags")
    )]
    pub tags: Vec<i32>,
    #[validate(
        length(min = 1, message = "add at least one ingredient"),
        custom(function = "valid_ingredients")
    )]
    pub ingredients: Vec<IngredientAmount>,
    #[validate(length(min = 1, max = 256, message = "name must be 1 to 256 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "image can't be blank"))]
    pub image: String,
    #[validate(length(min = 1, message = "text can't be blank"))]
    pub text: String,
    #[validate(range(min = 1, message = "cooking time must be at least 1 minute"))]
    pub cooking_time: i32,
}

/// PATCH body. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateRecipe {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "tags can't be empty"),
        custom(function = "unique_tags")
    )]
    pub tags: Option<Vec<i32>>,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "add at least one ingredient"),
        custom(function = "valid_ingredients")
    )]
    pub ingredients: Option<Vec<IngredientAmount>>,
    #[serde(default)]
    #[validate(length(min = 1, max = 256, message = "name must be 1 to 256 characters"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "image can't be blank"))]
    pub image: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "text can't be blank"))]
    pub text: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "cooking time must be at least 1 minute"))]
    pub cooking_time: Option<i32>,
}

fn unique_tags(tags: &[i32]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    match tags.iter().find(|tag| !seen.insert(**tag)) {
        Some(tag) => Err(ValidationError::new("unique")
            .with_message(Cow::Owned(format!("tag id = {tag} is selected twice")))),
        None => Ok(()),
    }
}

fn valid_ingredients(ingredients: &[IngredientAmount]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for ingredient in ingredients {
        if ingredient.amount < 1 {
            return Err(ValidationError::new("range")
                .with_message(Cow::Borrowed("ingredient amount must be at least 1")));
        }
        if !seen.insert(ingredient.id) {
            return Err(ValidationError::new("unique").with_message(Cow::Owned(format!(
                "ingredient id = {} is already in the list",
                ingredient.id
            ))));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct ListRecipesQuery {
    #[serde(default)]
    author: Option<UserId>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    is_favorited: Option<String>,
    #[serde(default)]
    is_in_shopping_cart: Option<String>,
}

fn flag(value: &Option<String>) -> bool {
    value
        .as_deref()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl From<ListRecipesQuery> for RecipeFilter {
    fn from(params: ListRecipesQuery) -> Self {
        RecipeFilter {
            is_favorited: flag(&params.is_favorited),
            is_in_shopping_cart: flag(&params.is_in_shopping_cart),
            author: params.author,
            tags: params.tags,
        }
    }
}

async fn ensure_author(pool: &PgPool, recipe_id: i32, user_id: UserId) -> AppResult<()> {
    if db::recipe_author(pool, recipe_id).await? != user_id {
        return Err(AppError::Forbidden("only the author can change a recipe"));
    }
    Ok(())
}

// GET /api/recipes/
pub async fn get_recipes(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    Query(params): Query<ListRecipesQuery>,
    token: AuthHeader,
) -> AppResult<impl IntoResponse> {
    let user_id = optional_user(token, &keys)?;

    let recipes = db::list_recipes(&pool, &params.into(), user_id).await?;
    Ok(Json(recipes))
}

// POST /api/recipes/
pub async fn create_recipe(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    token: AuthHeader,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let user_id = require_user(token, &keys, &pool).await?;

    let recipe: CreateRecipe = parse_body(&body)?;
    recipe.validate()?;

    let fields = RecipeFields {
        name: &recipe.name,
        image: &recipe.image,
        text: &recipe.text,
        cooking_time: recipe.cooking_time,
    };
    let recipe_id =
        db::create_recipe(&pool, user_id, fields, &recipe.tags, &recipe.ingredients).await?;

    let recipe = retrieve_recipe(&pool, recipe_id, Some(user_id)).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

// GET /api/recipes/:id/
pub async fn get_recipe(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    Path(recipe_id): Path<i32>,
    token: AuthHeader,
) -> AppResult<impl IntoResponse> {
    let user_id = optional_user(token, &keys)?;

    let recipe = retrieve_recipe(&pool, recipe_id, user_id).await?;
    Ok(Json(recipe))
}

// PATCH /api/recipes/:id/
pub async fn update_recipe(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    Path(recipe_id): Path<i32>,
    token: AuthHeader,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let user_id = require_user(token, &keys, &pool).await?;
    ensure_author(&pool, recipe_id, user_id).await?;

    let changes: UpdateRecipe = parse_body(&body)?;
    changes.validate()?;

    let scalars = RecipeChanges {
        name: changes.name.as_deref(),
        image: changes.image.as_deref(),
        text: changes.text.as_deref(),
        cooking_time: changes.cooking_time,
    };
    db::update_recipe(
        &pool,
        recipe_id,
        scalars,
        changes.tags.as_deref(),
        changes.ingredients.as_deref(),
    )
    .await?;

    let recipe = retrieve_recipe(&pool, recipe_id, Some(user_id)).await?;
    Ok(Json(recipe))
}

// DELETE /api/recipes/:id/
pub async fn delete_recipe(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    Path(recipe_id): Path<i32>,
    token: AuthHeader,
) -> AppResult<impl IntoResponse> {
    let user_id = require_user(token, &keys, &pool).await?;
    ensure_author(&pool, recipe_id, user_id).await?;

    db::delete_recipe(&pool, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(id: i32, amount: i32) -> IngredientAmount {
        IngredientAmount { id, amount }
    }

    fn recipe() -> CreateRecipe {
        CreateRecipe {
            tags: vec![1, 2],
            ingredients: vec![ingredient(1, 200), ingredient(2, 50)],
            name: "Pancakes".to_string(),
            image: "data:image/png;base64,AAAA".to_string(),
            text: "Mix and fry.".to_string(),
            cooking_time: 15,
        }
    }

    #[test]
    fn accepts_a_well_formed_recipe() {
        assert!(recipe().validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_ingredients_regardless_of_amounts() {
        for (first, second) in [(1, 1), (5, 300), (1, 2)] {
            let mut payload = recipe();
            payload.ingredients = vec![ingredient(3, first), ingredient(3, second)];
            let errors = payload.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("ingredients"));
        }
    }

    #[test]
    fn amount_boundary_is_one() {
        let mut payload = recipe();
        payload.ingredients = vec![ingredient(1, 0)];
        assert!(payload.validate().is_err());

        payload.ingredients = vec![ingredient(1, 1)];
        assert!(payload.validate().is_ok());

        payload.ingredients = vec![ingredient(1, -4)];
        assert!(payload.validate().is_err());
    }

    #[test]
    fn rejects_empty_or_repeated_tags() {
        let mut payload = recipe();
        payload.tags = vec![];
        assert!(payload.validate().unwrap_err().field_errors().contains_key("tags"));

        payload.tags = vec![4, 4];
        assert!(payload.validate().unwrap_err().field_errors().contains_key("tags"));
    }

    #[test]
    fn rejects_empty_ingredients_and_bad_scalars() {
        let mut payload = recipe();
        payload.ingredients = vec![];
        assert!(payload.validate().is_err());

        let mut payload = recipe();
        payload.cooking_time = 0;
        assert!(payload.validate().unwrap_err().field_errors().contains_key("cooking_time"));

        let mut payload = recipe();
        payload.name = String::new();
        assert!(payload.validate().unwrap_err().field_errors().contains_key("name"));
    }

    #[test]
    fn partial_update_only_checks_supplied_fields() {
        assert!(UpdateRecipe::default().validate().is_ok());

        let update = UpdateRecipe {
            cooking_time: Some(5),
            ..Default::default()
        };
        assert!(update.validate().is_ok());

        let update = UpdateRecipe {
            tags: Some(vec![]),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = UpdateRecipe {
            ingredients: Some(vec![ingredient(2, 1), ingredient(2, 1)]),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn update_payload_distinguishes_missing_lists() {
        let update: UpdateRecipe = serde_json::from_str(r#"{"name": "Soup"}"#).unwrap();
        assert!(update.tags.is_none());
        assert!(update.ingredients.is_none());
        assert_eq!(update.name.as_deref(), Some("Soup"));
    }

    #[test]
    fn list_flags_accept_one_and_true() {
        assert!(flag(&Some("1".to_string())));
        assert!(flag(&Some("True".to_string())));
        assert!(!flag(&Some("0".to_string())));
        assert!(!flag(&None));
    }
}
