use serde_json::Value;

/// Convert a JSON value into a single displayable line.
pub fn value_to_string(value: Value) -> String {
    let raw = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    };
    sanitize(raw)
}

/// Turn a raw response body into message text.
///
/// JSON bodies are re-serialized compactly (a bare JSON string is unwrapped),
/// anything else is used verbatim. Returns `None` for blank bodies.
pub fn body_to_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let text = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value_to_string(value),
        Err(_) => sanitize(trimmed.to_string()),
    };
    Some(text)
}

fn sanitize(s: String) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}
