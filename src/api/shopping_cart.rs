use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::{
    auth::{require_user, AuthHeader, JwtKeys},
    db::{basket_lines, basket_size},
    error::AppResult,
    shopping_list::ShoppingList,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    #[default]
    Labelled,
    Compact,
    #[serde(rename = "json")]
    Structured,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    format: ListFormat,
}

// GET /api/recipes/download_shopping_cart/
pub async fn download_shopping_cart(
    State(pool): State<PgPool>,
    State(keys): State<JwtKeys>,
    Query(params): Query<DownloadQuery>,
    token: AuthHeader,
) -> AppResult<Response> {
    let user_id = require_user(token, &keys, &pool).await?;

    if basket_size(&pool, user_id).await? == 0 {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let list: ShoppingList = basket_lines(&pool, user_id).await?.into_iter().collect();
    if list.is_empty() {
        tracing::debug!(user_id, "basket recipes have no ingredients");
    } else {
        tracing::debug!(user_id, items = list.items().len(), "shopping list built");
    }

    Ok(render(list, params.format))
}

fn render(list: ShoppingList, format: ListFormat) -> Response {
    match format {
        ListFormat::Structured => Json(list.into_items()).into_response(),
        ListFormat::Labelled => text_attachment(list.to_labelled_text()),
        ListFormat::Compact => text_attachment(list.to_compact_text()),
    }
}

fn text_attachment(body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_list.txt\"",
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn list() -> ShoppingList {
        let mut list = ShoppingList::new();
        list.add("Flour", "g", 300);
        list.add("Sugar", "g", 50);
        list
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn format_defaults_to_labelled() {
        let query: DownloadQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.format, ListFormat::Labelled);

        let query: DownloadQuery = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(query.format, ListFormat::Structured);
    }

    #[tokio::test]
    async fn renders_plain_text_attachment() {
        let response = render(list(), ListFormat::Compact);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_text(response).await, "Flour (g) - 300\nSugar (g) - 50\n");
    }

    #[tokio::test]
    async fn renders_structured_items() {
        let response = render(list(), ListFormat::Structured);
        let items: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            items,
            serde_json::json!([
                {"name": "Flour", "measurement_unit": "g", "amount": 300},
                {"name": "Sugar", "measurement_unit": "g", "amount": 50},
            ])
        );
    }
}
