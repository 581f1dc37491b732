// Shared prompt fragments. Each insight kind builds its own prompt in
// `crate::insight::prompts` on top of these.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to prompts that ask for a numeric judgment.
pub const SCORE_RANGE_INSTRUCTION: &str = "\
    Every numeric score MUST be an integer between 0 and 100 inclusive. \
    If you cannot judge a score, omit the field instead of guessing.";
