// Prompt constants for post generation.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Opening line of every generation prompt.
pub const GENERATION_HEADER: &str = "Generate a LinkedIn post using the below information.";

/// Introduces the few-shot examples.
pub const EXAMPLES_INTRO: &str = "4) Adopt the writing style, tone, and structure from the \
    following examples. These examples are real LinkedIn posts related to the topic and \
    length you requested.";

/// Used when the dataset offered no examples at all.
pub const NO_EXAMPLES_NOTE: &str = "4) No specific examples were provided. \
    Generate the post in a professional LinkedIn style.";

pub const ENGLISH_INSTRUCTION: &str = "The post should be entirely in English.";

pub const HINGLISH_INSTRUCTION: &str = "The post should be in Hinglish (a mix of Hindi and \
    English words), but the primary script used must be English characters.";
