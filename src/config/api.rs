use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the resource API gateway lives and how long a single call may take.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_in_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "http://localhost:8888".to_string(),
            timeout_in_ms: 10_000,
        }
    }
}
