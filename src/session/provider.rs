use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use super::keycloak::KeycloakProvider;
use crate::config::{IdentityConfig, OnLoad};

/// Tokens handed out by the identity provider.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSet")
            .field("access_token", &"***")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "***"))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("no credentials configured; set identity.username and identity.password")]
    MissingCredentials,
    #[error("identity provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid identity provider URL: {0}")]
    Url(#[from] url::ParseError),
}

/// The external identity provider. Each call is a single attempt.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// A descriptive name for the provider (for logs/debug).
    fn get_name(&self) -> &str;

    /// Establish a session at startup, or report that there is none.
    async fn init(&self, on_load: OnLoad) -> Result<Option<TokenSet>, IdentityError>;

    async fn login(&self) -> Result<TokenSet, IdentityError>;

    /// End the provider-side session. `None` means there is nothing to revoke.
    async fn logout(&self, refresh_token: Option<&str>) -> Result<(), IdentityError>;

    /// Where a new user signs up.
    fn registration_url(&self) -> Result<String, IdentityError>;
}

/// Create the identity provider described by the configuration.
pub fn create_identity_provider(
    config: &IdentityConfig,
) -> Result<Arc<dyn IdentityProvider>, IdentityError> {
    Ok(Arc::new(KeycloakProvider::new(config)?))
}
