//! Post Generation — orchestrates the few-shot pipeline.
//!
//! Flow: validate request → select examples → build prompt →
//!       single LLM completion → trim → return.
//!
//! One best-effort call per request. No retries, no streaming and no quality
//! gating; failures surface to the caller as `GenerationError`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dataset::{Language, LengthBucket, Post};
use crate::few_shot::{FewShotPosts, MatchLevel};
use crate::generation::prompts::{
    ENGLISH_INSTRUCTION, EXAMPLES_INTRO, GENERATION_HEADER, HINGLISH_INSTRUCTION,
    NO_EXAMPLES_NOTE,
};
use crate::llm_client::prompts::NO_PREAMBLE_INSTRUCTION;
use crate::llm_client::{CompletionClient, LlmError};

/// Maximum number of example posts embedded in a prompt.
pub const MAX_EXAMPLES: usize = 2;
/// Maximum accepted tag length, in characters.
pub const MAX_TAG_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("LLM returned an empty post")]
    EmptyCompletion,
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// What to generate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRequest {
    #[serde(alias = "length_category")]
    pub length: LengthBucket,
    #[serde(default)]
    pub language: Language,
    pub tag: String,
}

impl PostRequest {
    pub fn new(length: LengthBucket, language: Language, tag: impl Into<String>) -> Self {
        Self {
            length,
            language,
            tag: tag.into(),
        }
    }

    /// Rejects blank or oversized tags. Length and language are already typed.
    pub fn validate(&self) -> Result<(), GenerationError> {
        let tag = self.tag.trim();
        if tag.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "tag cannot be empty".to_string(),
            ));
        }
        if tag.chars().count() > MAX_TAG_CHARS {
            return Err(GenerationError::InvalidRequest(format!(
                "tag cannot exceed {MAX_TAG_CHARS} characters"
            )));
        }
        Ok(())
    }
}

/// A generated post plus the parameters and examples that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPost {
    pub id: Uuid,
    pub text: String,
    pub length: LengthBucket,
    pub language: Language,
    pub tag: String,
    pub example_ids: Vec<String>,
    pub model: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

/// Holds the dataset handle and the LLM client. Cheap to clone.
#[derive(Clone)]
pub struct PostGenerator {
    posts: Arc<FewShotPosts>,
    llm: Arc<dyn CompletionClient>,
}

impl PostGenerator {
    pub fn new(posts: Arc<FewShotPosts>, llm: Arc<dyn CompletionClient>) -> Self {
        Self { posts, llm }
    }

    pub fn posts(&self) -> &FewShotPosts {
        &self.posts
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// Selects up to `MAX_EXAMPLES` posts for the request. Posts in the
    /// requested language come first; selection order is kept otherwise.
    pub fn examples_for(&self, request: &PostRequest) -> Vec<&Post> {
        let selection = self.posts.select(request.length, request.tag.trim());
        if selection.level != MatchLevel::Exact {
            info!(
                "No exact examples for {} / '{}', degraded to {:?}",
                request.length, request.tag, selection.level
            );
        }

        let mut examples = selection.posts;
        examples.sort_by_key(|p| p.language() != request.language);
        examples.truncate(MAX_EXAMPLES);
        examples
    }

    /// Runs the pipeline and returns the generated post.
    pub async fn generate(&self, request: &PostRequest) -> Result<GeneratedPost, GenerationError> {
        request.validate()?;

        let examples = self.examples_for(request);
        let prompt = build_prompt(request, &examples);
        info!(
            "Generating {} {} post on '{}' with {} examples",
            request.length,
            request.language,
            request.tag.trim(),
            examples.len()
        );

        let completion = self.llm.complete(&prompt).await.map_err(|e| {
            warn!("Post generation failed: {e}");
            GenerationError::Llm(e)
        })?;

        let text = completion.trim();
        if text.is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }

        Ok(GeneratedPost {
            id: Uuid::new_v4(),
            text: text.to_string(),
            length: request.length,
            language: request.language,
            tag: request.tag.trim().to_string(),
            example_ids: examples.iter().map(|p| p.id.clone()).collect(),
            model: self.llm.model().to_string(),
        })
    }

    /// Programmatic entry point: parameters in, post text out.
    pub async fn generate_text(
        &self,
        length: LengthBucket,
        language: Language,
        tag: &str,
    ) -> Result<String, GenerationError> {
        let request = PostRequest::new(length, language, tag);
        self.generate(&request).await.map(|post| post.text)
    }
}

/// Assembles the generation prompt: header, numbered instructions, the
/// examples verbatim, then a closing instruction restating length and language.
pub fn build_prompt(request: &PostRequest, examples: &[&Post]) -> String {
    let tag = request.tag.trim();
    let language_instruction = match request.language {
        Language::English => ENGLISH_INSTRUCTION,
        Language::Hinglish => HINGLISH_INSTRUCTION,
    };

    let mut parts = vec![
        format!("{GENERATION_HEADER} {NO_PREAMBLE_INSTRUCTION}"),
        format!("1) Topic: The core subject of the post should be '{tag}'."),
        format!(
            "2) Length: The post should be approximately {}.",
            request.length.instruction()
        ),
        format!("3) Language: {language_instruction}"),
    ];

    if examples.is_empty() {
        parts.push(NO_EXAMPLES_NOTE.to_string());
    } else {
        parts.push(EXAMPLES_INTRO.to_string());
        for (i, post) in examples.iter().enumerate() {
            parts.push(format!("--- Example {} ---\n{}", i + 1, post.text));
        }
    }

    parts.push(format!(
        "Now write one new post about '{tag}'. It must be approximately {} long and written in {}.",
        request.length.instruction(),
        request.language
    ));

    parts.join("\n\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, DatasetInfo};
    use crate::few_shot::tests::{post, sample_posts};
    use crate::llm_client::mock::MockCompletionClient;

    fn generator_with(mock: &Arc<MockCompletionClient>) -> PostGenerator {
        PostGenerator::new(Arc::new(sample_posts()), mock.clone())
    }

    #[test]
    fn test_request_validation() {
        let ok = PostRequest::new(LengthBucket::Short, Language::English, "Career");
        assert!(ok.validate().is_ok());

        let blank = PostRequest::new(LengthBucket::Short, Language::English, "   ");
        assert!(matches!(
            blank.validate(),
            Err(GenerationError::InvalidRequest(_))
        ));

        let long = PostRequest::new(LengthBucket::Short, Language::English, "x".repeat(101));
        assert!(long.validate().is_err());
    }

    #[test]
    fn test_request_accepts_length_category_alias() {
        let request: PostRequest = serde_json::from_value(serde_json::json!({
            "length_category": "Long",
            "language": "Hinglish",
            "tag": "Startup"
        }))
        .unwrap();
        assert_eq!(request.length, LengthBucket::Long);
        assert_eq!(request.language, Language::Hinglish);
    }

    #[test]
    fn test_request_language_defaults_to_english() {
        let request: PostRequest =
            serde_json::from_value(serde_json::json!({"length": "Short", "tag": "Career"}))
                .unwrap();
        assert_eq!(request.language, Language::English);
    }

    #[test]
    fn test_prompt_contains_examples_and_instructions() {
        let a = post("a", 7, &["AI & Tech"]);
        let request = PostRequest::new(LengthBucket::Medium, Language::English, "AI & Tech");
        let prompt = build_prompt(&request, &[&a]);

        assert!(prompt.starts_with(GENERATION_HEADER));
        assert!(prompt.contains("'AI & Tech'"));
        assert!(prompt.contains("6 to 10 lines"));
        assert!(prompt.contains(ENGLISH_INSTRUCTION));
        assert!(prompt.contains(&format!("--- Example 1 ---\n{}", a.text)));
        assert!(prompt.trim_end().ends_with("written in English."));
    }

    #[test]
    fn test_prompt_without_examples_says_so() {
        let request = PostRequest::new(LengthBucket::Long, Language::Hinglish, "Career");
        let prompt = build_prompt(&request, &[]);
        assert!(prompt.contains(NO_EXAMPLES_NOTE));
        assert!(prompt.contains(HINGLISH_INSTRUCTION));
        assert!(!prompt.contains("--- Example"));
    }

    #[test]
    fn test_examples_capped_and_language_preferred() {
        let mut hinglish = post("h1", 8, &["AI & Tech"]);
        hinglish.metadata.language = Some(Language::Hinglish);
        let posts = FewShotPosts::from_dataset(Dataset::new(
            DatasetInfo::default(),
            vec![
                post("e1", 7, &["AI & Tech"]),
                post("e2", 9, &["AI & Tech"]),
                hinglish,
            ],
        ));
        let generator = PostGenerator::new(Arc::new(posts), Arc::new(MockCompletionClient::new()));

        let request = PostRequest::new(LengthBucket::Medium, Language::Hinglish, "AI & Tech");
        let ids: Vec<_> = generator
            .examples_for(&request)
            .iter()
            .map(|p| p.id.clone())
            .collect();
        assert_eq!(ids, vec!["h1", "e1"]);
    }

    #[tokio::test]
    async fn test_generate_sends_matching_example_to_llm() {
        let mock = Arc::new(MockCompletionClient::with_replies(["  A fresh post.\n\n"]));
        let generator = generator_with(&mock);

        let text = generator
            .generate_text(LengthBucket::Medium, Language::English, "AI & Tech")
            .await
            .unwrap();

        assert_eq!(text, "A fresh post.");
        let prompts = mock.prompts();
        assert_eq!(prompts.len(), 1);
        let expected = generator.posts().posts()[2].text.clone(); // m2
        assert!(prompts[0].contains(&expected));
    }

    #[tokio::test]
    async fn test_generate_reports_examples_and_model() {
        let mock = Arc::new(MockCompletionClient::with_replies(["Post body"]));
        let generator = generator_with(&mock);
        let request = PostRequest::new(LengthBucket::Short, Language::English, " Startup ");

        let generated = generator.generate(&request).await.unwrap();

        assert_eq!(generated.tag, "Startup");
        assert_eq!(generated.example_ids, vec!["s2"]);
        assert_eq!(generated.model, "mock-model");
    }

    #[tokio::test]
    async fn test_generate_propagates_llm_failure_without_retry() {
        let mock = Arc::new(MockCompletionClient::failing(429, "rate limited"));
        let generator = generator_with(&mock);

        let err = generator
            .generate_text(LengthBucket::Short, Language::English, "Startup")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Llm(LlmError::Api { status: 429, .. })));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_completion_is_an_error() {
        let mock = Arc::new(MockCompletionClient::with_replies(["   \n"]));
        let generator = generator_with(&mock);
        let err = generator
            .generate_text(LengthBucket::Short, Language::English, "Startup")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyCompletion));
    }

    #[tokio::test]
    async fn test_invalid_request_never_reaches_llm() {
        let mock = Arc::new(MockCompletionClient::with_replies(["unused"]));
        let generator = generator_with(&mock);
        let request = PostRequest::new(LengthBucket::Short, Language::English, "");
        assert!(generator.generate(&request).await.is_err());
        assert_eq!(mock.call_count(), 0);
    }
}
