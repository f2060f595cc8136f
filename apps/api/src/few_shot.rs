//! Few-shot selector — read-only lookups over the enriched dataset.
//!
//! Constructed once at startup and shared behind an `Arc`. Matching is exact
//! (length bucket + case-insensitive unified tag) and preserves stored order.
//! No ranking.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use tracing::debug;

use crate::dataset::{self, Dataset, DatasetError, LengthBucket, Post};

/// Which rule produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchLevel {
    /// Length bucket and tag both matched.
    Exact,
    /// No post carried the tag, so every post of the bucket was returned.
    LengthOnly,
    /// The bucket itself was empty, so every post was returned.
    Any,
}

#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub posts: Vec<&'a Post>,
    pub level: MatchLevel,
}

/// Immutable handle over the enriched dataset.
#[derive(Debug, Clone, Default)]
pub struct FewShotPosts {
    dataset: Dataset,
}

impl FewShotPosts {
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self { dataset }
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        dataset::load(path).map(Self::from_dataset)
    }

    pub fn posts(&self) -> &[Post] {
        &self.dataset.posts
    }

    pub fn len(&self) -> usize {
        self.dataset.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.posts.is_empty()
    }

    /// Posts matching `bucket` and `tag`, in stored order.
    ///
    /// Degrades to the whole bucket when no post carries the tag, and to the
    /// whole dataset when the bucket is empty. Empty only for an empty dataset.
    pub fn select(&self, bucket: LengthBucket, tag: &str) -> Selection<'_> {
        let in_bucket: Vec<&Post> = self
            .dataset
            .posts
            .iter()
            .filter(|p| p.length_bucket() == bucket)
            .collect();

        let exact: Vec<&Post> = in_bucket.iter().copied().filter(|p| p.has_tag(tag)).collect();
        if !exact.is_empty() {
            return Selection {
                posts: exact,
                level: MatchLevel::Exact,
            };
        }

        if !in_bucket.is_empty() {
            debug!("No {bucket} posts tagged '{tag}', using all {bucket} posts");
            return Selection {
                posts: in_bucket,
                level: MatchLevel::LengthOnly,
            };
        }

        debug!("No {bucket} posts at all, using the whole dataset");
        Selection {
            posts: self.dataset.posts.iter().collect(),
            level: MatchLevel::Any,
        }
    }

    /// Sorted union of dataset categories and unified tags. Spellings that
    /// differ only in case are listed once.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: BTreeSet<&str> = self
            .dataset
            .info
            .categories
            .iter()
            .map(String::as_str)
            .collect();
        for post in &self.dataset.posts {
            if post.metadata.unified_tags.is_empty() {
                tags.extend(post.metadata.topic.as_deref());
            } else {
                tags.extend(post.metadata.unified_tags.iter().map(String::as_str));
            }
        }
        let sorted: BTreeSet<&str> = tags.into_iter().map(str::trim).collect();

        let mut seen = HashSet::new();
        sorted
            .into_iter()
            .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
            .map(str::to_string)
            .collect()
    }
}
