use crate::AppState;
use axum::{Router, routing::get};

pub mod api;

async fn root() -> &'static str {
    "DBD News API is running. Try /api/news"
}

async fn health() -> &'static str {
    "OK"
}

pub fn create_router<S: AppState>() -> Router<S> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api::create_api_router())
}
