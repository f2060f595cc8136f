// Post generation: few-shot example selection, prompt assembly, one LLM call.
// All LLM calls go through llm_client — no direct HTTP calls here.

pub mod generator;
pub mod handlers;
pub mod prompts;
