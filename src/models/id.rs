use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A server-assigned record identifier.
///
/// Zero, `null`, `NaN`, `"undefined"` and anything non-numeric are not ids,
/// so a `ResourceId` in hand is always safe to put in a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceId(NonZeroU64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid id '{0}'")]
pub struct InvalidId(pub String);

impl ResourceId {
    pub fn new(value: u64) -> Option<Self> {
        NonZeroU64::new(value).map(ResourceId)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    /// Best-effort conversion of whatever the server put in an `id` field.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => match n.as_u64() {
                Some(v) => Self::new(v),
                None => n
                    .as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0 && *f >= 1.0)
                    .and_then(|f| Self::new(f as u64)),
            },
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromStr for ResourceId {
    type Err = InvalidId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim()
            .parse::<u64>()
            .ok()
            .and_then(ResourceId::new)
            .ok_or_else(|| InvalidId(raw.to_string()))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deserialize an optional id without failing the whole record on a bad value.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<Option<ResourceId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(ResourceId::from_json))
}
