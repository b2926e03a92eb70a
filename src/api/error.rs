use reqwest::StatusCode;
use thiserror::Error;

use crate::utils::value::body_to_message;

/// Why a call to the resource API did not produce a usable response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not build the HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("{method} {path} failed: {source}")]
    Transport {
        method: String,
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {path} returned {status}")]
    Status {
        method: String,
        path: String,
        status: StatusCode,
        body: String,
    },
    #[error("unexpected response from {path}: {message}")]
    Decode { path: String, message: String },
}

impl ApiError {
    /// The HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// The server's explanation, as display text.
    pub fn server_detail(&self) -> Option<String> {
        match self {
            ApiError::Status { body, .. } => body_to_message(body),
            _ => None,
        }
    }
}
