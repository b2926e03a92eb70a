use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::provider::{IdentityError, IdentityProvider, TokenSet};
use crate::config::OnLoad;
use crate::models::{Claims, ClaimsError, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Initialization has not completed (or failed, which is terminal).
    Loading,
    Ready,
}

/// A snapshot of the authentication state.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub status: SessionStatus,
    pub authenticated: bool,
    pub token: Option<String>,
    pub claims: Claims,
    refresh_token: Option<String>,
}

impl Session {
    fn loading() -> Self {
        Session {
            status: SessionStatus::Loading,
            authenticated: false,
            token: None,
            claims: Claims::default(),
            refresh_token: None,
        }
    }

    /// A ready session with nobody signed in.
    pub fn anonymous() -> Self {
        Session {
            status: SessionStatus::Ready,
            ..Session::loading()
        }
    }

    /// A ready, signed-in session.
    pub fn signed_in(token: impl Into<String>, claims: Claims) -> Self {
        Session {
            status: SessionStatus::Ready,
            authenticated: true,
            token: Some(token.into()),
            claims,
            refresh_token: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == SessionStatus::Ready
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.authenticated && self.claims.has_role(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(&Role::Admin)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session initialization failed: {0}")]
    Init(#[source] IdentityError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Claims(#[from] ClaimsError),
}

struct Inner {
    provider: Arc<dyn IdentityProvider>,
    on_load: OnLoad,
    state: watch::Sender<Session>,
}

/// Shared handle on the session; clone it into every component that needs it.
///
/// Changes are published on a watch channel, see [`SessionContext::subscribe`].
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

impl SessionContext {
    pub fn new(provider: Arc<dyn IdentityProvider>, on_load: OnLoad) -> Self {
        let (state, _) = watch::channel(Session::loading());
        SessionContext {
            inner: Arc::new(Inner {
                provider,
                on_load,
                state,
            }),
        }
    }

    /// Run the provider's startup handshake once.
    ///
    /// On failure the session stays `Loading` for good; nothing retries.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        if self.snapshot().is_ready() {
            return Ok(());
        }

        match self.inner.provider.init(self.inner.on_load).await {
            Ok(Some(tokens)) => self.establish(tokens),
            Ok(None) => {
                info!("No session established by '{}'", self.inner.provider.get_name());
                self.inner.state.send_replace(Session::anonymous());
                Ok(())
            }
            Err(e) => {
                error!(
                    "Identity provider '{}' failed to initialize: {}",
                    self.inner.provider.get_name(),
                    e
                );
                Err(SessionError::Init(e))
            }
        }
    }

    pub async fn login(&self) -> Result<(), SessionError> {
        let tokens = self.inner.provider.login().await?;
        self.establish(tokens)
    }

    /// Drop the local token first, then ask the provider to end its session.
    pub async fn logout(&self) {
        let previous = self.inner.state.send_replace(Session::anonymous());
        if previous.authenticated {
            info!("Logging out '{}'", previous.claims.display_name());
        }
        if let Err(e) = self
            .inner
            .provider
            .logout(previous.refresh_token.as_deref())
            .await
        {
            warn!("Provider-side logout failed: {}", e);
        }
    }

    pub fn register(&self) -> Result<String, SessionError> {
        Ok(self.inner.provider.registration_url()?)
    }

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().authenticated
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.inner.state.borrow().has_role(role)
    }

    /// The token to send right now, if any. An expired token ends the session.
    pub fn current_token(&self) -> Option<String> {
        let (token, expired) = {
            let session = self.inner.state.borrow();
            if !session.authenticated {
                return None;
            }
            (
                session.token.clone(),
                session.claims.is_expired_at(Utc::now().timestamp()),
            )
        };

        if expired {
            info!("Access token expired; session ended");
            self.inner.state.send_replace(Session::anonymous());
            return None;
        }
        token
    }

    fn establish(&self, tokens: TokenSet) -> Result<(), SessionError> {
        let claims = Claims::from_access_token(&tokens.access_token)?;
        info!(
            "Session established for '{}' with roles [{}]",
            claims.display_name(),
            claims.roles.joined().unwrap_or_default()
        );
        self.inner.state.send_replace(Session {
            status: SessionStatus::Ready,
            authenticated: true,
            token: Some(tokens.access_token),
            claims,
            refresh_token: tokens.refresh_token,
        });
        Ok(())
    }
}
