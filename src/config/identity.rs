use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// What the session provider does when the application starts.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub enum OnLoad {
    /// Log in immediately; startup fails if that is not possible.
    #[serde(rename = "login-required")]
    LoginRequired,
    /// Only report whether a session already exists.
    #[serde(rename = "check-sso")]
    CheckSso,
}

/// Connection settings for the Keycloak realm that issues our tokens.
#[derive(Deserialize, Serialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct IdentityConfig {
    pub url: String,
    pub realm: String,
    pub client_id: String,
    /// Only needed for confidential clients.
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub on_load: OnLoad,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Applies to every call to the realm, like `api.timeout_in_ms`.
    pub timeout_in_ms: u64,
}

impl IdentityConfig {
    pub fn realm_url(&self) -> String {
        format!("{}/realms/{}", self.url.trim_end_matches('/'), self.realm)
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/protocol/openid-connect/token", self.realm_url())
    }

    pub fn logout_endpoint(&self) -> String {
        format!("{}/protocol/openid-connect/logout", self.realm_url())
    }

    pub fn registration_endpoint(&self) -> String {
        format!("{}/protocol/openid-connect/registrations", self.realm_url())
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        IdentityConfig {
            url: "http://localhost:8081".to_string(),
            realm: "microservices-realm".to_string(),
            client_id: "frontend-client".to_string(),
            client_secret: None,
            redirect_uri: "http://localhost:3000/".to_string(),
            on_load: OnLoad::LoginRequired,
            username: None,
            password: None,
            timeout_in_ms: 10_000,
        }
    }
}

// Hand-written so credentials never end up in logs.
impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("redirect_uri", &self.redirect_uri)
            .field("on_load", &self.on_load)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout_in_ms", &self.timeout_in_ms)
            .finish()
    }
}
