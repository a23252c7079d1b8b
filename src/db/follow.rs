use std::collections::HashMap;

use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::{AppResult, DBError};

use super::{get_user_profile, ShortRecipe, UserId, UserProfile};

/// A followed author together with their recipes.
#[derive(Debug, Serialize)]
pub struct Author {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub recipes: Vec<ShortRecipe>,
    pub recipes_count: i64,
}

#[derive(FromRow)]
struct AuthoredRecipe {
    author_id: UserId,
    #[sqlx(flatten)]
    recipe: ShortRecipe,
}

pub async fn follow(pool: &PgPool, user_id: UserId, following_id: UserId) -> AppResult<()> {
    let inserted = sqlx::query_scalar::<_, i32>(
        "
        INSERT INTO follows (user_id, following_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        RETURNING id
        ",
    )
    .bind(user_id)
    .bind(following_id)
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(_) => Ok(()),
        None => Err(DBError::Duplicate("You are already subscribed to this author.").into()),
    }
}

pub async fn unfollow(pool: &PgPool, user_id: UserId, following_id: UserId) -> AppResult<()> {
    let deleted = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND following_id = $2")
        .bind(user_id)
        .bind(following_id)
        .execute(pool)
        .await?;

    match deleted.rows_affected() {
        0 => Err(DBError::NotRelated("You are not subscribed to this author.").into()),
        _ => Ok(()),
    }
}

pub async fn subscriptions(
    pool: &PgPool,
    user_id: UserId,
    recipes_limit: Option<usize>,
) -> AppResult<Vec<Author>> {
    let profiles = sqlx::query_as::<_, UserProfile>(
        "
        SELECT
            users.email,
            users.id,
            users.username,
            users.first_name,
            users.last_name,
            TRUE AS is_subscribed
        FROM follows
        INNER JOIN users ON users.id = follows.following_id
        WHERE follows.user_id = $1
        ORDER BY follows.id
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    with_recipes(pool, profiles, recipes_limit).await
}

pub async fn author(
    pool: &PgPool,
    author_id: UserId,
    req_user_id: Option<UserId>,
    recipes_limit: Option<usize>,
) -> AppResult<Author> {
    let profile = get_user_profile(pool, author_id, req_user_id).await?;
    let mut authors = with_recipes(pool, vec![profile], recipes_limit).await?;
    authors.pop().ok_or(DBError::NotFound.into())
}

async fn with_recipes(
    pool: &PgPool,
    profiles: Vec<UserProfile>,
    recipes_limit: Option<usize>,
) -> AppResult<Vec<Author>> {
    let author_ids: Vec<UserId> = profiles.iter().map(|profile| profile.id).collect();

    let rows = sqlx::query_as::<_, AuthoredRecipe>(
        "
        SELECT author_id, id, name, image, cooking_time
        FROM recipes
        WHERE author_id = ANY($1)
        ORDER BY created_at DESC, id DESC
        ",
    )
    .bind(&author_ids)
    .fetch_all(pool)
    .await?;

    let mut by_author: HashMap<UserId, Vec<ShortRecipe>> = HashMap::new();
    for row in rows {
        by_author.entry(row.author_id).or_default().push(row.recipe);
    }

    Ok(profiles
        .into_iter()
        .map(|profile| {
            let mut recipes = by_author.remove(&profile.id).unwrap_or_default();
            let recipes_count = recipes.len() as i64;
            if let Some(limit) = recipes_limit {
                recipes.truncate(limit);
            }
            Author {
                profile,
                recipes,
                recipes_count,
            }
        })
        .collect())
}
