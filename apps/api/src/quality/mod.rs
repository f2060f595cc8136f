//! Post quality report — deterministic checks and a heuristic 0–10 score.
//!
//! Separate from generation: the generator never scores or rejects its own
//! output. The UI calls this on demand for a draft.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::{count_lines, LengthBucket, Post, PostMetadata};

pub mod handlers;

const MIN_TEXT_CHARS: usize = 10;
const MAX_TEXT_CHARS: usize = 3000;
const MAX_HASHTAGS: usize = 10;
const MAX_HASHTAG_CHARS: usize = 50;
const MAX_SCORE: f64 = 10.0;
const MAX_TOPIC_CHARS: usize = 100;

const KNOWN_TONES: &[&str] = &[
    "professional",
    "casual",
    "formal",
    "friendly",
    "authoritative",
    "conversational",
    "inspirational",
    "educational",
    "analytical",
];
const ENGAGEMENT_LEVELS: &[&str] = &["low", "medium", "high", "very_high"];

const CONNECTIVE_WORDS: &[&str] = &["because", "however", "therefore", "meanwhile"];
const INSIGHT_WORDS: &[&str] = &["think", "believe", "suggest", "recommend"];
const EXPERIENCE_WORDS: &[&str] = &["experience", "learned", "discovered", "found"];
const ADVICE_WORDS: &[&str] = &["tips", "advice", "strategies", "methods"];
const PROFESSIONAL_WORDS: &[&str] = &[
    "professional",
    "industry",
    "business",
    "career",
    "leadership",
    "strategy",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMetrics {
    pub word_count: usize,
    pub line_count: usize,
    pub hashtag_count: usize,
    pub has_question: bool,
    pub has_exclamation: bool,
    pub length_category: LengthBucket,
}

impl PostMetrics {
    pub fn measure(text: &str) -> Self {
        let line_count = count_lines(text);
        Self {
            word_count: text.split_whitespace().count(),
            line_count,
            hashtag_count: extract_hashtags(text).len(),
            has_question: text.contains('?'),
            has_exclamation: text.contains('!'),
            length_category: LengthBucket::from_line_count(line_count),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub score: f64,
    pub metrics: PostMetrics,
}

/// Whitespace-separated tokens starting with `#`, trailing punctuation removed.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|w| w.starts_with('#'))
        .map(|w| w.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_'))
        .filter(|w| w.len() > 1)
        .map(str::to_string)
        .collect()
}

/// Basic text limits. Returns the first violated rule.
pub fn validate_post_text(text: &str) -> Result<(), String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("Post text cannot be empty".to_string());
    }
    if trimmed.chars().count() < MIN_TEXT_CHARS {
        return Err(format!(
            "Post text must be at least {MIN_TEXT_CHARS} characters long"
        ));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(format!("Post text cannot exceed {MAX_TEXT_CHARS} characters"));
    }
    if text.matches('#').count() > MAX_HASHTAGS {
        return Err(format!("Post cannot have more than {MAX_HASHTAGS} hashtags"));
    }
    Ok(())
}

/// Each hashtag must be `#` followed by 1–49 ASCII letters, digits or underscores.
pub fn validate_hashtags(hashtags: &[String]) -> Result<(), String> {
    for hashtag in hashtags {
        let Some(body) = hashtag.strip_prefix('#') else {
            return Err(format!("Hashtag '{hashtag}' must start with #"));
        };
        if body.is_empty() {
            return Err(format!("Hashtag '{hashtag}' is too short"));
        }
        if hashtag.chars().count() > MAX_HASHTAG_CHARS {
            return Err(format!("Hashtag '{hashtag}' is too long"));
        }
        if !body.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!("Hashtag '{hashtag}' contains invalid characters"));
        }
    }
    Ok(())
}

/// Rules for stored metadata: topic length, known tone, engagement level and
/// a `quality_score` within the score range.
pub fn validate_post_metadata(metadata: &PostMetadata) -> Result<(), String> {
    if let Some(topic) = &metadata.topic {
        if topic.chars().count() > MAX_TOPIC_CHARS {
            return Err(format!("Topic cannot exceed {MAX_TOPIC_CHARS} characters"));
        }
    }
    if let Some(tone) = metadata.tone.as_deref().filter(|t| !t.is_empty()) {
        if !KNOWN_TONES.contains(&tone) {
            return Err(format!("Invalid tone: {tone}"));
        }
    }
    match metadata.extra.get("estimated_engagement") {
        None | Some(Value::Null) => {}
        Some(Value::String(level)) if ENGAGEMENT_LEVELS.contains(&level.as_str()) => {}
        Some(other) => return Err(format!("Invalid engagement level: {other}")),
    }
    match metadata.extra.get("quality_score") {
        None | Some(Value::Null) => {}
        Some(value) => match value.as_f64() {
            Some(score) if (0.0..=MAX_SCORE).contains(&score) => {}
            _ => {
                return Err(format!(
                    "Quality score must be between 0 and {MAX_SCORE}, got {value}"
                ))
            }
        },
    }
    Ok(())
}

/// Heuristic score in [0, 10].
///
/// length (0–2) + engagement markers (0–2) + hashtag count (0–1) +
/// paragraph structure (0–2) + content cues (0–2) + professional tone (0–1)
pub fn score_post(text: &str, metrics: &PostMetrics) -> f64 {
    let lower = text.to_lowercase();
    let mentions_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));
    let mut score = 0.0;

    score += match metrics.word_count {
        50..=300 => 2.0,
        30..=49 | 301..=500 => 1.0,
        _ => 0.0,
    };

    if metrics.has_question {
        score += 1.0;
    }
    if metrics.has_exclamation {
        score += 0.5;
    }
    if metrics.hashtag_count > 0 {
        score += 0.5;
    }

    score += match metrics.hashtag_count {
        0 => 0.0,
        1..=5 => 1.0,
        _ => 0.5,
    };

    if metrics.line_count >= 3 {
        score += 1.0;
    }
    if text.contains("\n\n") {
        score += 1.0;
    }

    for words in [CONNECTIVE_WORDS, INSIGHT_WORDS, EXPERIENCE_WORDS, ADVICE_WORDS] {
        if mentions_any(words) {
            score += 0.5;
        }
    }

    if mentions_any(PROFESSIONAL_WORDS) {
        score += 1.0;
    }

    f64::min(score, MAX_SCORE)
}

/// Validates and scores a post. Invalid posts get errors and a zero score.
pub fn assess(text: &str) -> QualityReport {
    let metrics = PostMetrics::measure(text);
    let hashtags = extract_hashtags(text);

    let validation = validate_post_text(text).and_then(|_| validate_hashtags(&hashtags));
    if let Err(error) = validation {
        return QualityReport {
            is_valid: false,
            errors: vec![error],
            warnings: Vec::new(),
            score: 0.0,
            metrics,
        };
    }

    let mut warnings = Vec::new();
    if metrics.word_count < 50 {
        warnings.push("Post is quite short - consider adding more content".to_string());
    }
    if metrics.word_count > 500 {
        warnings.push("Post is quite long - consider breaking it into multiple posts".to_string());
    }
    if metrics.hashtag_count == 0 {
        warnings.push("No hashtags found - consider adding relevant hashtags".to_string());
    }
    if !metrics.has_question && !metrics.has_exclamation {
        warnings.push(
            "Post lacks engagement elements - consider adding questions or exclamations"
                .to_string(),
        );
    }

    QualityReport {
        is_valid: true,
        errors: Vec::new(),
        warnings,
        score: score_post(text, &metrics),
        metrics,
    }
}

/// `assess` for a stored post: the text report plus its metadata hashtags
/// and metadata rules. Any violation makes the post invalid.
pub fn assess_post(post: &Post) -> QualityReport {
    let mut report = assess(&post.text);
    let checks = validate_hashtags(&post.metadata.hashtags)
        .and_then(|_| validate_post_metadata(&post.metadata));
    if let Err(error) = checks {
        report.is_valid = false;
        report.errors.push(error);
        report.score = 0.0;
    }
    report
}
