use serde::de::DeserializeOwned;
use serde_json::Value;

/// How a collection endpoint lays out its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEnvelope {
    /// Hypermedia style: `{"_embedded": {"<key>": [...]}, "_links": ...}`.
    Embedded(&'static str),
    /// A bare JSON array.
    Flat,
}

impl ListEnvelope {
    /// Pull the items out of a response body.
    ///
    /// An embedded envelope without the key (or with `null`) is an empty
    /// list, which is how the server reports "no rows".
    pub fn decode<T: DeserializeOwned>(self, body: Value) -> Result<Vec<T>, String> {
        let items = match self {
            ListEnvelope::Embedded(key) => match body {
                Value::Object(mut root) => match root.remove("_embedded") {
                    Some(Value::Object(mut embedded)) => {
                        embedded.remove(key).unwrap_or(Value::Null)
                    }
                    Some(Value::Null) | None => Value::Null,
                    Some(other) => {
                        return Err(format!("'_embedded' is not an object: {}", other))
                    }
                },
                other => return Err(format!("expected an object envelope, got {}", kind(&other))),
            },
            ListEnvelope::Flat => body,
        };

        match items {
            Value::Null => Ok(Vec::new()),
            Value::Array(_) => serde_json::from_value(items).map_err(|e| e.to_string()),
            other => Err(format!("expected a list, got {}", kind(&other))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
