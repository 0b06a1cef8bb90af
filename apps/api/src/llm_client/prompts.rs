// Prompt fragments shared by every caller of the LLM client.
// Feature-specific prompts live next to the feature (see resume/prompts.rs).

/// System prompt that pins the reply to a single JSON object.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
