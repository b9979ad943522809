// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Locale instruction: all end-user content is written in French.
pub const FRENCH_CONTENT_INSTRUCTION: &str = "\
    All human-readable content (titles, lessons, questions, tips) MUST be written in French, \
    in a professional yet friendly register suited to small business owners.";
