// Shared response schemas for Gemini structured output.
// Prompts themselves live next to the service that sends them.

use serde_json::{json, Value};

/// `responseSchema` for a JSON array of strings.
pub fn string_array_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" }
    })
}
