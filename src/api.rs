pub mod ingredients;
pub mod recipes;
pub mod relations;
pub mod shopping_cart;
pub mod tags;
pub mod users;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::AppResult;

/// Request bodies are decoded inside the handler so that auth failures win over malformed JSON.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    Ok(serde_json::from_slice(body)?)
}
