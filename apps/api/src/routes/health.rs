use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version, model name and the size of the loaded dataset.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "postgen",
        "model": state.generator.model(),
        "dataset": {
            "path": state.config.dataset_path.display().to_string(),
            "posts": state.generator.posts().len()
        }
    }))
}
