//! Tag unification — maps free-text topics and hashtags onto a small canonical vocabulary.
//!
//! The LLM call sits behind `TagUnifier` so tests can stub it. `TagMapping::Identity`
//! is the explicit fallback: when unification fails every tag maps to itself.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{complete_json, CompletionClient, LlmError};
use crate::preprocess::prompts::TAG_UNIFICATION_PROMPT_TEMPLATE;

/// Produces a raw tag → unified tag mapping for a set of raw tags.
#[async_trait]
pub trait TagUnifier: Send + Sync {
    async fn unify(&self, tags: &[String]) -> Result<BTreeMap<String, String>, LlmError>;
}

/// Asks the LLM to cluster synonyms in a single call.
pub struct LlmTagUnifier {
    llm: Arc<dyn CompletionClient>,
}

impl LlmTagUnifier {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TagUnifier for LlmTagUnifier {
    async fn unify(&self, tags: &[String]) -> Result<BTreeMap<String, String>, LlmError> {
        let prompt = TAG_UNIFICATION_PROMPT_TEMPLATE
            .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
            .replace("{tags}", &tags.join(","));
        complete_json(self.llm.as_ref(), &prompt).await
    }
}

/// The mapping applied to every record during enrichment.
#[derive(Debug, Clone, PartialEq)]
pub enum TagMapping {
    Unified(BTreeMap<String, String>),
    /// Unification skipped or failed: tags are kept as they are.
    Identity,
}

impl TagMapping {
    /// Unified tag for `tag`, or `tag` itself when the mapping omits it.
    /// An exact key wins over a case-insensitive one; among case-insensitive
    /// keys the first in sorted order is used.
    pub fn resolve(&self, tag: &str) -> String {
        let map = match self {
            TagMapping::Unified(map) => map,
            TagMapping::Identity => return tag.to_string(),
        };
        map.get(tag)
            .or_else(|| {
                map.iter()
                    .find(|(raw, _)| raw.eq_ignore_ascii_case(tag))
                    .map(|(_, unified)| unified)
            })
            .map(|unified| unified.trim())
            .filter(|unified| !unified.is_empty())
            .unwrap_or(tag)
            .to_string()
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, TagMapping::Identity)
    }
}

/// Runs the unifier once. Any failure degrades to `TagMapping::Identity`.
pub async fn resolve_mapping(unifier: &dyn TagUnifier, tags: &[String]) -> TagMapping {
    if tags.is_empty() {
        info!("No tags to unify, skipping LLM call");
        return TagMapping::Identity;
    }

    info!("Requesting tag unification for {} distinct tags", tags.len());
    match unifier.unify(tags).await {
        Ok(map) => {
            info!("Tag unification returned {} mappings", map.len());
            TagMapping::Unified(map)
        }
        Err(e) => {
            warn!("Tag unification failed, keeping original tags: {e}");
            TagMapping::Identity
        }
    }
}

/// Appends `tag` unless it is blank or already present ignoring ASCII case.
pub fn push_distinct(tags: &mut Vec<String>, tag: String) {
    if !tag.is_empty() && !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
        tags.push(tag);
    }
}

/// Normalizes a raw topic or hashtag before unification.
///
/// Strips `#`, splits camel case ("TechStrategy" → "Tech Strategy"), collapses
/// whitespace and title-cases each letter run. All-caps runs such as "AI" are kept.
pub fn normalize_tag(raw: &str) -> String {
    let stripped = raw.trim().trim_start_matches('#');

    let mut spaced = String::with_capacity(stripped.len() + 4);
    let mut prev: Option<char> = None;
    for c in stripped.chars() {
        if prev.is_some_and(|p| p.is_lowercase()) && c.is_uppercase() {
            spaced.push(' ');
        }
        spaced.push(c);
        prev = Some(c);
    }

    spaced
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut run = String::new();
    for c in word.chars() {
        if c.is_alphabetic() || c == '\'' {
            run.push(c);
        } else {
            flush_run(&mut run, &mut out);
            out.push(c);
        }
    }
    flush_run(&mut run, &mut out);
    out
}

fn flush_run(run: &mut String, out: &mut String) {
    let letter_count = run.chars().filter(|c| c.is_alphabetic()).count();
    let is_acronym = letter_count >= 2
        && run
            .chars()
            .filter(|c| c.is_alphabetic())
            .all(char::is_uppercase);

    if is_acronym {
        out.push_str(run);
    } else {
        let mut chars = run.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(&chars.as_str().to_lowercase());
        }
    }
    run.clear();
}
