use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::ApiError;
use crate::config::ApiConfig;
use crate::session::SessionContext;

/// HTTP client for the resource API.
///
/// Every request carries the session's current bearer token (when there is
/// one). A 401 answer logs the session out before the error is returned.
/// Nothing is queued or retried.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: SessionContext) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_in_ms))
            .build()
            .map_err(ApiError::Client)?;
        Ok(ApiClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.execute::<()>(Method::GET, path, None).await?;
        response.json::<Value>().await.map_err(|e| ApiError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.execute(Method::POST, path, Some(body)).await.map(drop)
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.execute(Method::PUT, path, Some(body)).await.map(drop)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute::<()>(Method::DELETE, path, None)
            .await
            .map(drop)
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);

        // Read the token at send time; a logout in between is honoured.
        match self.session.current_token() {
            Some(token) => request = request.bearer_auth(token),
            None => debug!("Sending {} {} without credentials", method, path),
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!("{} {}", method, url);
        let response = request.send().await.map_err(|source| ApiError::Transport {
            method: method.to_string(),
            path: path.to_string(),
            source,
        })?;

        let status = response.status();
        if status.is_success() {
            debug!("{} {} -> {}", method, path, status);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            warn!("{} {} was rejected as unauthorized; logging out", method, path);
            self.session.logout().await;
        } else {
            warn!("{} {} -> {}", method, path, status);
        }

        Err(ApiError::Status {
            method: method.to_string(),
            path: path.to_string(),
            status,
            body,
        })
    }
}
