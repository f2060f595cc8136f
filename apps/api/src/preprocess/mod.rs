//! Preprocessor — turns the raw post export into the enriched dataset.
//!
//! Flow: load raw file → collect distinct tags → one unification call →
//!       derive line_count / language / unified tags per post → write file.
//!
//! Unification failure is a local degradation: enrichment still completes
//! with the original (normalized) tags.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::dataset::{self, count_lines, Dataset, DatasetError, Engagement, Post};

pub mod language;
pub mod prompts;
pub mod tags;

use language::detect_language;
use tags::{normalize_tag, push_distinct, resolve_mapping, TagMapping, TagUnifier};

use crate::quality::validate_post_metadata;

/// How tag unification went for a preprocessing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Unification {
    Unified { raw_tags: usize, vocabulary: usize },
    Skipped { raw_tags: usize },
}

#[derive(Debug, Clone)]
pub struct PreprocessOutcome {
    pub dataset: Dataset,
    pub unification: Unification,
}

/// Sorted set of normalized topics, hashtags and dataset categories. Tags that
/// differ only in case ("AI", "Ai") appear once, as the first in sorted order.
pub fn collect_raw_tags(dataset: &Dataset) -> Vec<String> {
    let mut sorted: BTreeSet<String> = dataset
        .info
        .categories
        .iter()
        .map(|c| normalize_tag(c))
        .collect();
    for post in &dataset.posts {
        sorted.extend(post_raw_tags(post));
    }

    let mut tags = Vec::with_capacity(sorted.len());
    for tag in sorted {
        push_distinct(&mut tags, tag);
    }
    tags
}

/// Normalized topic first, then hashtags, without case-insensitive duplicates.
fn post_raw_tags(post: &Post) -> Vec<String> {
    let topic = post.metadata.topic.iter();
    let hashtags = post.metadata.hashtags.iter();

    let mut tags: Vec<String> = Vec::new();
    for tag in topic.chain(hashtags).map(|t| normalize_tag(t)) {
        push_distinct(&mut tags, tag);
    }
    tags
}

/// Derives the enriched fields of a single post. Pure: the same post and
/// mapping always produce the same output.
pub fn enrich_post(post: &Post, mapping: &TagMapping) -> Post {
    let mut enriched = post.clone();

    enriched.metadata.line_count = Some(count_lines(&post.text));
    enriched.metadata.language = Some(detect_language(&post.text));

    let mut unified_tags: Vec<String> = Vec::new();
    for raw in post_raw_tags(post) {
        push_distinct(&mut unified_tags, mapping.resolve(&raw));
    }
    enriched.metadata.unified_tags = unified_tags;

    enriched.metadata.topic = post
        .metadata
        .topic
        .as_deref()
        .map(normalize_tag)
        .filter(|t| !t.is_empty())
        .map(|t| mapping.resolve(&t));

    if enriched.engagement.is_none() {
        enriched.engagement = Some(Engagement::default());
    }

    enriched
}

/// Enriches every post of `raw`. Issues at most one unification call.
pub async fn preprocess(raw: Dataset, unifier: &dyn TagUnifier) -> PreprocessOutcome {
    let raw_tags = collect_raw_tags(&raw);
    let mapping = resolve_mapping(unifier, &raw_tags).await;

    let mut flagged = 0usize;
    for post in &raw.posts {
        if let Err(problem) = validate_post_metadata(&post.metadata) {
            warn!("Post {} has questionable metadata: {problem}", post.id);
            flagged += 1;
        }
    }

    let posts: Vec<Post> = raw.posts.iter().map(|p| enrich_post(p, &mapping)).collect();

    let mut categories: Vec<String> = Vec::new();
    for category in raw.info.categories.iter().map(|c| normalize_tag(c)) {
        push_distinct(&mut categories, mapping.resolve(&category));
    }

    let unification = match &mapping {
        TagMapping::Unified(_) => {
            let vocabulary: BTreeSet<&str> = posts
                .iter()
                .flat_map(|p| p.metadata.unified_tags.iter().map(String::as_str))
                .chain(categories.iter().map(String::as_str))
                .collect();
            Unification::Unified {
                raw_tags: raw_tags.len(),
                vocabulary: vocabulary.len(),
            }
        }
        TagMapping::Identity => Unification::Skipped {
            raw_tags: raw_tags.len(),
        },
    };

    let mut dataset = raw;
    dataset.posts = posts;
    dataset.info.categories = categories;
    dataset.info.processed_at = Some(Utc::now());

    info!(
        "Preprocessed {} posts ({:?}), {} with questionable metadata",
        dataset.posts.len(),
        unification,
        flagged
    );

    PreprocessOutcome {
        dataset,
        unification,
    }
}

/// Loads `input`, preprocesses it and writes the enriched dataset to `output`.
pub async fn preprocess_file(
    input: &Path,
    output: &Path,
    unifier: &dyn TagUnifier,
) -> Result<PreprocessOutcome, DatasetError> {
    let raw = dataset::load(input)?;
    let outcome = preprocess(raw, unifier).await;
    dataset::save(output, &outcome.dataset)?;
    Ok(outcome)
}
