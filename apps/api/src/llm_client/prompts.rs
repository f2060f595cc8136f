// Shared prompt fragments.
// Each module that needs LLM calls defines its own prompts.rs alongside it;
// this file holds the pieces they have in common.

/// Appended to prompts whose reply is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Output should be a valid JSON object only, \
    with no preamble, no explanations and no markdown code fences.";

/// Keeps generated content free of chatty wrapping text.
pub const NO_PREAMBLE_INSTRUCTION: &str = "Follow all instructions carefully. \
    Do not include any preamble, conversational text, or extraneous information, \
    just the post content.";
