use axum::Json;
use serde::Deserialize;

use crate::dataset::{Post, PostMetadata};
use crate::errors::AppError;
use crate::quality::{assess, assess_post, QualityReport};

#[derive(Debug, Deserialize)]
pub struct QualityRequest {
    pub text: String,
    /// Optional stored metadata; when present its rules are checked too.
    #[serde(default)]
    pub metadata: Option<PostMetadata>,
}

/// POST /api/v1/posts/quality
pub async fn handle_quality(
    Json(request): Json<QualityRequest>,
) -> Result<Json<QualityReport>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    let report = match request.metadata {
        Some(metadata) => {
            let mut post = Post::new("draft", request.text);
            post.metadata = metadata;
            assess_post(&post)
        }
        None => assess(&request.text),
    };
    Ok(Json(report))
}
