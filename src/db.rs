mod user;
pub use user::*;
mod tag;
pub use tag::*;
mod ingredient;
pub use ingredient::*;
mod recipe;
pub use recipe::*;
mod relation;
pub use relation::*;
mod follow;
pub use follow::*;


use sqlx::{Executor, PgPool};

pub async fn prepare_db(pool: &PgPool) -> Result<(), sqlx::Error> {
    pool.execute(include_str!("sql/schema.sql")).await?;
    Ok(())
}

/// Returns the first id of `wanted` that is not in `found`.
fn first_missing(wanted: &[i32], found: &[i32]) -> Option<i32> {
    wanted.iter().copied().find(|id| !found.contains(id))
}
