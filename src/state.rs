//! Everything a run shares between screens.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::config::ConfigV1;
use crate::session::{IdentityProvider, SessionContext};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigV1>,
    pub session: SessionContext,
    /// Shares `session`, so a 401 seen here signs every screen out.
    pub api: ApiClient,
}

impl AppState {
    /// Wire the session and the API client. The session is not initialized yet.
    pub fn new(config: ConfigV1, provider: Arc<dyn IdentityProvider>) -> Result<Self, ApiError> {
        let session = SessionContext::new(provider, config.identity.on_load);
        let api = ApiClient::new(&config.api, session.clone())?;
        Ok(AppState {
            config: Arc::new(config),
            session,
            api,
        })
    }
}
