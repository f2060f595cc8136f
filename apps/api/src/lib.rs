//! Few-shot LinkedIn post generator.
//!
//! raw dataset → `preprocess` → enriched dataset → `few_shot` selector →
//! `generation` prompt → `llm_client` → HTTP UI / CLI.

pub mod config;
pub mod dataset;
pub mod errors;
pub mod few_shot;
pub mod generation;
pub mod llm_client;
pub mod preprocess;
pub mod quality;
pub mod routes;
pub mod state;
