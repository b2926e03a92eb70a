use std::time::Duration;

use reqwest::Response;
use tracing::{debug, info, warn};
use url::Url;

use super::provider::{IdentityError, IdentityProvider, TokenSet};
use crate::config::{IdentityConfig, OnLoad};
use crate::utils::value::body_to_message;

/// Talks to a Keycloak realm over its OpenID Connect endpoints.
pub struct KeycloakProvider {
    config: IdentityConfig,
    http: reqwest::Client,
    name: String,
}

impl KeycloakProvider {
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        info!(
            "Creating Keycloak provider for realm '{}', client='{}'",
            config.realm, config.client_id
        );
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .build()?;
        Ok(Self {
            config: config.clone(),
            http,
            name: format!("keycloak:{}", config.realm),
        })
    }

    /// Client identification fields shared by every form post.
    fn client_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("client_id", self.config.client_id.clone())];
        if let Some(secret) = &self.config.client_secret {
            fields.push(("client_secret", secret.clone()));
        }
        fields
    }

    async fn rejected(response: Response) -> IdentityError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        IdentityError::Rejected {
            status,
            message: body_to_message(&body).unwrap_or_else(|| "no details".to_string()),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for KeycloakProvider {
    fn get_name(&self) -> &str {
        &self.name
    }

    async fn init(&self, on_load: OnLoad) -> Result<Option<TokenSet>, IdentityError> {
        match on_load {
            OnLoad::LoginRequired => self.login().await.map(Some),
            OnLoad::CheckSso => {
                debug!("check-sso: no existing session for '{}'", self.name);
                Ok(None)
            }
        }
    }

    /// Resource-owner password grant against the realm's token endpoint.
    async fn login(&self) -> Result<TokenSet, IdentityError> {
        let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        else {
            return Err(IdentityError::MissingCredentials);
        };
        debug!("Requesting token for '{}' at realm='{}'", username, self.config.realm);

        let mut form = self.client_fields();
        form.push(("grant_type", "password".to_string()));
        form.push(("scope", "openid".to_string()));
        form.push(("username", username.clone()));
        form.push(("password", password.clone()));

        let response = self
            .http
            .post(self.config.token_endpoint())
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = Self::rejected(response).await;
            warn!("Login for '{}' failed: {}", username, err);
            return Err(err);
        }

        let tokens = response.json::<TokenSet>().await?;
        info!("Obtained access token for '{}'", username);
        Ok(tokens)
    }

    async fn logout(&self, refresh_token: Option<&str>) -> Result<(), IdentityError> {
        let Some(refresh_token) = refresh_token else {
            debug!("No refresh token held; nothing to revoke");
            return Ok(());
        };

        let mut form = self.client_fields();
        form.push(("refresh_token", refresh_token.to_string()));

        let response = self
            .http
            .post(self.config.logout_endpoint())
            .form(&form)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejected(response).await)
        }
    }

    fn registration_url(&self) -> Result<String, IdentityError> {
        let url = Url::parse_with_params(
            &self.config.registration_endpoint(),
            &[
                ("client_id", self.config.client_id.as_str()),
                ("response_type", "code"),
                ("scope", "openid"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ],
        )?;
        Ok(url.to_string())
    }
}
