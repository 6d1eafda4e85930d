// Cross-cutting prompt fragments. Stage-specific prompts live next to the
// stage that sends them.

/// System message fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with a single valid JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";
