// Insight and quote prompt templates.
// All prompts for the insights module are defined here.

use serde_json::{json, Value};

pub const QUOTES_PROMPT: &str = "Give me 3 short, punchy motivational quotes from famous \
athletes about discipline, water, health, or consistency. \
Return them as a JSON array of strings.";

/// `{daily_goal}` and `{logs_json}` are substituted before sending.
pub const INSIGHT_PROMPT_TEMPLATE: &str = r#"Analyze these water logs for a user with a daily goal of {daily_goal}ml.
Logs: {logs_json}

Provide a smart analysis including:
1. Pattern Analysis (when do they drink most?)
2. A hydration score (0-100 based on consistency)
3. A suggestion for their goal (keep, increase, or decrease)
4. A brief specific recommendation."#;

pub fn insight_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "patternAnalysis": { "type": "STRING" },
            "hydrationScore": { "type": "INTEGER" },
            "goalSuggestion": { "type": "STRING" },
            "recommendation": { "type": "STRING" }
        },
        "required": ["patternAnalysis", "hydrationScore", "recommendation"]
    })
}
