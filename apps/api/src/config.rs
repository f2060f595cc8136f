use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_DATASET_PATH: &str = "data/processed_posts.json";
pub const DEFAULT_RAW_DATASET_PATH: &str = "data/raw_post.json";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub groq_model: String,
    pub groq_api_url: String,
    pub dataset_path: PathBuf,
    pub raw_dataset_path: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            groq_api_key: get("GROQ_API_KEY").context(
                "Required environment variable 'GROQ_API_KEY' is not set. \
                 Set it in your environment or .env file",
            )?,
            groq_model: or_default("GROQ_MODEL", DEFAULT_MODEL),
            groq_api_url: or_default("GROQ_API_URL", DEFAULT_API_URL),
            dataset_path: or_default("DATASET_PATH", DEFAULT_DATASET_PATH).into(),
            raw_dataset_path: or_default("RAW_DATASET_PATH", DEFAULT_RAW_DATASET_PATH).into(),
            port: or_default("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_fails_fast() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        assert!(Config::from_lookup(lookup(&[("GROQ_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup(&[("GROQ_API_KEY", "gsk_test")])).unwrap();
        assert_eq!(config.groq_model, DEFAULT_MODEL);
        assert_eq!(config.groq_api_url, DEFAULT_API_URL);
        assert_eq!(config.dataset_path, PathBuf::from(DEFAULT_DATASET_PATH));
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_overrides_and_invalid_port() {
        let config = Config::from_lookup(lookup(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("GROQ_MODEL", "llama-3.1-8b-instant"),
            ("PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(config.groq_model, "llama-3.1-8b-instant");
        assert_eq!(config.port, 9000);

        let bad = Config::from_lookup(lookup(&[("GROQ_API_KEY", "k"), ("PORT", "http")]));
        assert!(bad.is_err());
    }
}
