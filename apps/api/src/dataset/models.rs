use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Upper line bound (inclusive) of the Short bucket.
pub const SHORT_MAX_LINES: usize = 5;
/// Upper line bound (inclusive) of the Medium bucket. Anything above is Long.
pub const MEDIUM_MAX_LINES: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Enumerations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// Coarse size class of a post, derived from its line count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
pub enum LengthBucket {
    Short,
    Medium,
    Long,
}

impl LengthBucket {
    pub const ALL: [LengthBucket; 3] = [Self::Short, Self::Medium, Self::Long];

    pub fn from_line_count(lines: usize) -> Self {
        if lines <= SHORT_MAX_LINES {
            Self::Short
        } else if lines <= MEDIUM_MAX_LINES {
            Self::Medium
        } else {
            Self::Long
        }
    }

    /// Target size phrase used in the generation prompt.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Short => "1 to 5 lines",
            Self::Medium => "6 to 10 lines",
            Self::Long => "11 to 15 lines",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "Short",
            Self::Medium => "Medium",
            Self::Long => "Long",
        }
    }
}

impl fmt::Display for LengthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthBucket {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "length category",
                value: s.to_string(),
            })
    }
}

impl<'de> Deserialize<'de> for LengthBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

/// Output language. Hinglish is Hindi and English mixed, written in Latin script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
pub enum Language {
    #[default]
    English,
    Hinglish,
}

impl Language {
    pub const ALL: [Language; 2] = [Self::English, Self::Hinglish];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hinglish => "Hinglish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant {
                kind: "language",
                value: s.to_string(),
            })
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Records
// ────────────────────────────────────────────────────────────────────────────

/// Engagement counters. Added with zero values by the preprocessor when a raw
/// record carries none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    #[serde(default, deserialize_with = "lenient::counter")]
    pub likes: u64,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub comments: u64,
    #[serde(default, deserialize_with = "lenient::counter")]
    pub shares: u64,
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub views: Option<u64>,
}

/// Per-post metadata. Fields this crate does not interpret (post_type,
/// word_count, quality_score, ...) are kept in `extra` and written back as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub hashtags: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient::line_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub line_count: Option<usize>,
    #[serde(
        default,
        deserialize_with = "lenient::language",
        skip_serializing_if = "Option::is_none"
    )]
    pub language: Option<Language>,
    #[serde(
        default,
        deserialize_with = "lenient::strings",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub unified_tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: PostMetadata,
    #[serde(
        default,
        deserialize_with = "lenient::engagement",
        skip_serializing_if = "Option::is_none"
    )]
    pub engagement: Option<Engagement>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Post {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: PostMetadata::default(),
            engagement: None,
            extra: Map::new(),
        }
    }

    /// Stored line count, or the count derived from `text` for raw records.
    pub fn line_count(&self) -> usize {
        self.metadata
            .line_count
            .unwrap_or_else(|| count_lines(&self.text))
    }

    pub fn length_bucket(&self) -> LengthBucket {
        LengthBucket::from_line_count(self.line_count())
    }

    /// Stored language; records without one are treated as English.
    pub fn language(&self) -> Language {
        self.metadata.language.unwrap_or_default()
    }

    /// Case-insensitive match against the unified tags. Records that were never
    /// preprocessed have no unified tags, so their topic is checked instead.
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim();
        if self.metadata.unified_tags.is_empty() {
            return self
                .metadata
                .topic
                .as_deref()
                .is_some_and(|t| t.trim().eq_ignore_ascii_case(tag));
        }
        self.metadata
            .unified_tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Number of `\n`-separated lines. Empty text counts as one line.
pub fn count_lines(text: &str) -> usize {
    text.split('\n').count()
}

/// Dataset header describing provenance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// On-disk shape the dataset was read from. Written back in the same shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatasetLayout {
    #[default]
    Structured,
    BareList,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub info: DatasetInfo,
    pub posts: Vec<Post>,
    /// Other top-level keys of a structured file (e.g. training labels).
    pub extra: Map<String, Value>,
    pub layout: DatasetLayout,
}

impl Dataset {
    pub fn new(info: DatasetInfo, posts: Vec<Post>) -> Self {
        Self {
            info,
            posts,
            extra: Map::new(),
            layout: DatasetLayout::Structured,
        }
    }
}

/// Readers for the fields the preprocessor derives or only reads loosely.
/// Raw exports carry all sorts of values there (`"language": "en"`,
/// `"hashtags": null`, counts as strings); none of them may fail a load.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{Engagement, Language};

    /// Strings of an array, or a single string. Anything else is empty.
    pub fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            Value::String(s) => vec![s],
            _ => Vec::new(),
        })
    }

    /// Known language names only; anything else reads as unset.
    pub fn language<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Language>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        Ok(as_count(&Value::deserialize(deserializer)?))
    }

    pub fn counter<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        Ok(count(deserializer)?.unwrap_or(0))
    }

    pub fn line_count<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<usize>, D::Error> {
        Ok(count(deserializer)?.and_then(|n| usize::try_from(n).ok()))
    }

    /// An engagement object; other values (strings, arrays) read as absent.
    pub fn engagement<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Engagement>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }

    /// Non-negative integer, also when written as a string ("1,204" included).
    fn as_count(value: &Value) -> Option<u64> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bucket_thresholds() {
        assert_eq!(LengthBucket::from_line_count(1), LengthBucket::Short);
        assert_eq!(LengthBucket::from_line_count(5), LengthBucket::Short);
        assert_eq!(LengthBucket::from_line_count(6), LengthBucket::Medium);
        assert_eq!(LengthBucket::from_line_count(10), LengthBucket::Medium);
        assert_eq!(LengthBucket::from_line_count(11), LengthBucket::Long);
        assert_eq!(LengthBucket::from_line_count(40), LengthBucket::Long);
    }

    #[test]
    fn test_bucket_and_language_parse_case_insensitively() {
        assert_eq!("medium".parse::<LengthBucket>().unwrap(), LengthBucket::Medium);
        assert_eq!(" LONG ".parse::<LengthBucket>().unwrap(), LengthBucket::Long);
        assert_eq!("hinglish".parse::<Language>().unwrap(), Language::Hinglish);
        assert!("Huge".parse::<LengthBucket>().is_err());
        assert!("French".parse::<Language>().is_err());
    }

    #[test]
    fn test_count_lines_counts_blank_lines() {
        assert_eq!(count_lines(""), 1);
        assert_eq!(count_lines("Line1\nLine2\nLine3"), 3);
        assert_eq!(count_lines("Hook\n\nBody"), 3);
    }

    #[test]
    fn test_post_preserves_unknown_fields() {
        let raw = json!({
            "id": "post_001",
            "text": "Line1\nLine2",
            "metadata": {
                "topic": "AI/Tech",
                "hashtags": ["#AI"],
                "quality_score": 8.5
            },
            "created_at": "2024-06-01"
        });
        let post: Post = serde_json::from_value(raw).unwrap();
        assert_eq!(post.metadata.extra["quality_score"], json!(8.5));
        assert_eq!(post.extra["created_at"], json!("2024-06-01"));

        let back = serde_json::to_value(&post).unwrap();
        assert_eq!(back["metadata"]["quality_score"], json!(8.5));
        assert_eq!(back["created_at"], json!("2024-06-01"));
        assert!(back.get("engagement").is_none());
    }

    #[test]
    fn test_has_tag_falls_back_to_topic_for_raw_records() {
        let mut post = Post::new("p1", "text");
        post.metadata.topic = Some("Startup".to_string());
        assert!(post.has_tag("startup"));

        post.metadata.unified_tags = vec!["AI & Tech".to_string()];
        assert!(post.has_tag("ai & tech"));
        assert!(!post.has_tag("Startup"));
    }

    #[test]
    fn test_enum_deserialization_goes_through_from_str() {
        let bucket: LengthBucket = serde_json::from_value(json!("MEDIUM")).unwrap();
        assert_eq!(bucket, LengthBucket::Medium);
        let language: Language = serde_json::from_value(json!("hinglish")).unwrap();
        assert_eq!(language, Language::Hinglish);

        let err = serde_json::from_value::<LengthBucket>(json!("Huge")).unwrap_err();
        assert!(err.to_string().contains("unknown length category 'Huge'"));
    }

    #[test]
    fn test_raw_record_with_odd_derived_fields_still_parses() {
        let raw = json!({
            "id": "post_009",
            "text": "one\ntwo",
            "metadata": {
                "topic": "Career",
                "hashtags": null,
                "language": "en",
                "line_count": "7",
                "unified_tags": "Career"
            },
            "engagement": {"likes": "1,204", "comments": null, "shares": 3.0, "views": "n/a"}
        });
        let post: Post = serde_json::from_value(raw).unwrap();

        assert!(post.metadata.hashtags.is_empty());
        assert_eq!(post.metadata.language, None);
        assert_eq!(post.metadata.line_count, Some(7));
        assert_eq!(post.metadata.unified_tags, vec!["Career"]);
        let engagement = post.engagement.unwrap();
        assert_eq!(engagement.likes, 1204);
        assert_eq!(engagement.comments, 0);
        assert_eq!(engagement.shares, 3);
        assert_eq!(engagement.views, None);
    }

    #[test]
    fn test_non_object_engagement_reads_as_absent() {
        let post: Post =
            serde_json::from_value(json!({"id": "p", "text": "t", "engagement": "viral"}))
                .unwrap();
        assert!(post.engagement.is_none());
    }

    #[test]
    fn test_line_count_prefers_stored_value() {
        let mut post = Post::new("p1", "one\ntwo");
        assert_eq!(post.line_count(), 2);
        post.metadata.line_count = Some(7);
        assert_eq!(post.length_bucket(), LengthBucket::Medium);
    }
}
