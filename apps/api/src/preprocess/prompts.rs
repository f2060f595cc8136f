// Prompt constants for the preprocessing pipeline.

/// Tag unification prompt. Replace `{tags}` and `{json_instruction}` before sending.
pub const TAG_UNIFICATION_PROMPT_TEMPLATE: &str = r#"I will give you a list of tags taken from LinkedIn posts. Unify them with the following requirements:

1. Merge near-duplicate and synonymous tags so the final vocabulary is as short as possible.
   - "Jobseekers", "Job Hunting" -> "Job Search"
   - "Motivation", "Inspiration", "Drive" -> "Motivation"
   - "Personal Growth", "Personal Development", "Self Improvement", "Resilience" -> "Personal Growth"
   - "Scam Alert", "Job Scam" -> "Scams"
   - "Ai", "AI/Tech", "Tech Strategy", "Meta" -> "AI & Tech"
   - "Startup Journey", "Ycombinator", "Startup Ecosystem", "Entrepreneurship" -> "Startup"
   - "Management", "Leadership" -> "Leadership"
   - "Time Management", "Energy Management", "Mindfulness" -> "Productivity"
   - "Content Strategy", "Content Creation", "Personal Branding" -> "Marketing"
   - "Relationship Building" -> "Networking"
   - "Work Life Balance" -> "Work-Life Balance"
   - "Future Of Work", "Work Culture", "Talent Retention" -> "Future Of Work"
2. Every unified tag must use title case, e.g. "Motivation", "Job Search".
3. Every input tag must appear exactly once as a key, mapped to its unified tag.
   Example: {"Jobseekers": "Job Search", "Job Hunting": "Job Search", "Motivation": "Motivation"}
4. {json_instruction}

Here is the list of tags:
{tags}"#;
