//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::generation::generator::{GeneratedPost, PostRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<String>,
}

/// POST /api/v1/posts/generate
///
/// Selects few-shot examples for the requested length and tag, then asks the
/// LLM for a new post. LLM failures are returned to the caller, never retried.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<PostRequest>,
) -> Result<Json<GeneratedPost>, AppError> {
    let post = state.generator.generate(&request).await?;
    Ok(Json(post))
}

/// GET /api/v1/tags
///
/// Topic vocabulary for the UI: dataset categories plus every unified tag.
pub async fn handle_list_tags(State(state): State<AppState>) -> Json<TagsResponse> {
    Json(TagsResponse {
        tags: state.generator.posts().tags(),
    })
}
