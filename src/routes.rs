use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    BoxError, Router,
};
use sqlx::PgPool;
use std::time::Duration;
use tower::{buffer::BufferLayer, limit::RateLimitLayer, ServiceBuilder};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{
    api,
    auth::JwtKeys,
    db::{Basket, Favorite},
    AppState,
};

pub fn generate_routes(pool: PgPool, keys: JwtKeys, rate_limit_per_second: u64) -> Router {
    let state = AppState { pool, keys };

    Router::new()
        // ==== USERS ==== //
        .route("/api/users/", get(api::users::get_users))
        .route("/api/users/me/", get(api::users::get_current_user))
        .route(
            "/api/users/subscriptions/",
            get(api::users::get_subscriptions),
        )
        .route("/api/users/:id/", get(api::users::get_user))
        .route(
            "/api/users/:id/subscribe/",
            post(api::users::subscribe).delete(api::users::unsubscribe),
        )
        // ==== TAGS ==== //
        .route("/api/tags/", get(api::tags::get_tags))
        .route("/api/tags/:id/", get(api::tags::get_tag))
        // ==== INGREDIENTS ==== //
        .route("/api/ingredients/", get(api::ingredients::get_ingredients))
        .route("/api/ingredients/:id/", get(api::ingredients::get_ingredient))
        // ==== RECIPES ==== //
        .route(
            "/api/recipes/",
            get(api::recipes::get_recipes).post(api::recipes::create_recipe),
        )
        .route(
            "/api/recipes/download_shopping_cart/",
            get(api::shopping_cart::download_shopping_cart),
        )
        .route(
            "/api/recipes/:id/",
            get(api::recipes::get_recipe)
                .patch(api::recipes::update_recipe)
                .delete(api::recipes::delete_recipe),
        )
        .route(
            "/api/recipes/:id/favorite/",
            post(api::relations::add_recipe::<Favorite>)
                .delete(api::relations::remove_recipe::<Favorite>),
        )
        .route(
            "/api/recipes/:id/shopping_cart/",
            post(api::relations::add_recipe::<Basket>)
                .delete(api::relations::remove_recipe::<Basket>),
        )
        .fallback(handler_404)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(|err: BoxError| async move {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Unhandled error: {}", err),
                    )
                }))
                .layer(BufferLayer::new(1024))
                .layer(RateLimitLayer::new(
                    rate_limit_per_second,
                    Duration::from_secs(1),
                )),
        )
}

async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}
