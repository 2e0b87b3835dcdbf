//! Error-message extraction from provider response bodies

use reqwest::StatusCode;
use serde_json::Value;

/// Message used when a non-OK response carries no usable error message
pub fn http_status_message(status: StatusCode) -> String {
    format!("Erro HTTP {}", status.as_u16())
}

/// Whether a JSON `error` field is present in the truthy sense: anything
/// other than `null`, `false` or an empty string.
pub fn error_present(error: Option<&Value>) -> bool {
    match error {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Extract a human-readable message from an `error` field.
///
/// Handles the `{ "error": { "message": "..." } }` shape used by Gemini,
/// OpenAI and Groq as well as a bare string.
pub fn error_message(error: &Value) -> Option<String> {
    match error {
        Value::String(message) if !message.is_empty() => Some(message.clone()),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Message for a non-OK status: `error.message` when the body has one,
/// otherwise [`http_status_message`].
pub fn status_failure_message(status: StatusCode, body: Option<&Value>) -> String {
    body.and_then(|b| b.get("error"))
        .and_then(error_message)
        .unwrap_or_else(|| http_status_message(status))
}
