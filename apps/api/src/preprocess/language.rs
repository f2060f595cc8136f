//! Language detection — deterministic English / Hinglish classifier.
//!
//! No LLM call: a post is Hinglish when it contains Devanagari script or when
//! romanized Hindi function words make up a noticeable share of its tokens.

use crate::dataset::Language;

/// Minimum number of Hindi marker tokens before a post can be Hinglish.
const MIN_MARKER_TOKENS: usize = 3;
/// Minimum share of marker tokens among all word tokens, in percent.
const MIN_MARKER_PERCENT: usize = 10;

/// Common romanized Hindi words. Words that are also frequent English
/// tokens ("main", "to", "hi") are left out.
const HINDI_MARKERS: &[&str] = &[
    "aap", "abhi", "accha", "acha", "aur", "bahut", "bhai", "bhi", "dost", "hai", "hain", "hota",
    "hum", "jab", "kaam", "kaise", "kar", "karna", "karo", "karte", "kuch", "kya", "kyun",
    "lekin", "log", "matlab", "mera", "mere", "meri", "mujhe", "nahi", "nahin", "paisa", "raha",
    "rahe", "rahi", "sab", "samajh", "tha", "thi", "toh", "tum", "wala", "wali", "yaar",
    "zindagi",
];

pub fn detect_language(text: &str) -> Language {
    if text.chars().any(is_devanagari) {
        return Language::Hinglish;
    }

    let mut total = 0usize;
    let mut markers = 0usize;
    for token in text
        .split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
    {
        total += 1;
        if HINDI_MARKERS.contains(&token.to_lowercase().as_str()) {
            markers += 1;
        }
    }

    if markers >= MIN_MARKER_TOKENS && markers * 100 >= total * MIN_MARKER_PERCENT {
        Language::Hinglish
    } else {
        Language::English
    }
}

fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}
