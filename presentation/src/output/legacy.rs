//! Legacy JSON output

use dbrain_domain::LlmResponseEnvelope;
use serde_json::Value;

/// Pretty JSON of [`LlmResponseEnvelope::to_legacy_map`]
pub fn format_json(envelope: &LlmResponseEnvelope) -> String {
    let map = Value::Object(envelope.to_legacy_map());
    serde_json::to_string_pretty(&map).unwrap_or_else(|_| map.to_string())
}
