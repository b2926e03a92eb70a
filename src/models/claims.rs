use std::collections::{BTreeSet, HashSet};
use std::fmt;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A realm role as carried in `realm_access.roles`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Client,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::Client => "CLIENT",
            Role::Other(name) => name,
        }
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        match name {
            "ADMIN" => Role::Admin,
            "CLIENT" => Role::Client,
            other => Role::Other(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Role::from(name.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of realm roles held by a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roles(BTreeSet<Role>);

impl Roles {
    pub fn contains(&self, role: &Role) -> bool {
        self.0.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.contains(&Role::Admin)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }

    /// Comma separated role names, or `None` when there are none.
    pub fn joined(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.iter()
                .map(Role::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

impl<R: Into<Role>> FromIterator<R> for Roles {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Roles(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("access token is not a readable JWT: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
    #[error("access token claims have an unexpected shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// What the application knows about the signed-in user, read from the access token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claims {
    pub subject: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub roles: Roles,
    /// `exp`, seconds since the epoch.
    pub expires_at: Option<i64>,
    /// The complete decoded payload, for the admin view.
    pub raw: Value,
}

/// The fields we read from a Keycloak access token.
#[derive(Debug, Deserialize)]
struct AccessTokenClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    realm_access: Option<RolesContainer>,
    #[serde(default)]
    exp: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RolesContainer {
    #[serde(default)]
    roles: Vec<String>,
}

impl Claims {
    /// Read the claims of an access token.
    ///
    /// The signature is not checked here: the token came straight from the
    /// identity provider and the resource API verifies it on every call.
    pub fn from_access_token(token: &str) -> Result<Claims, ClaimsError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        let raw = decode::<Value>(token, &DecodingKey::from_secret(&[]), &validation)?.claims;
        let parsed: AccessTokenClaims = serde_json::from_value(raw.clone())?;

        Ok(Claims {
            subject: parsed.sub.unwrap_or_default(),
            username: parsed.preferred_username,
            email: parsed.email,
            roles: parsed
                .realm_access
                .map(|ra| ra.roles.into_iter().collect())
                .unwrap_or_default(),
            expires_at: parsed.exp,
            raw,
        })
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    /// `preferred_username`, falling back to the subject.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.subject)
    }
}
