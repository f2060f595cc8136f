pub mod health;

use axum::{
    response::Html,
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::quality::handlers::handle_quality;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET /
/// Single-page form: topic, length and language in, plain-text post out.
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health::health_handler))
        .route("/api/v1/tags", get(handlers::handle_list_tags))
        .route("/api/v1/posts/generate", post(handlers::handle_generate))
        .route("/api/v1/posts/quality", post(handle_quality))
        .with_state(state)
}
