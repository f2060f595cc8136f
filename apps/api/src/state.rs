use crate::config::Config;
use crate::generation::generator::PostGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Few-shot pipeline. Owns the read-only dataset handle and the LLM client.
    pub generator: PostGenerator,
    pub config: Config,
}
