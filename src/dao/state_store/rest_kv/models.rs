use serde::Deserialize;
use serde_json::Value;

/// Envelope every REST command answers with: `{"result": ...}` or `{"error": "..."}`.
#[derive(Debug, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Turn a stored string back into the JSON document it encodes.
///
/// Values written by other clients may be plain strings; they are handed back verbatim so the
/// caller can decide what to do with them.
pub fn decode_stored(result: Value) -> Option<Value> {
    match result {
        Value::Null => None,
        Value::String(raw) => {
            Some(serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw)))
        }
        other => Some(other),
    }
}
