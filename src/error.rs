use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::guard::NavigationError;
use crate::session::{IdentityError, SessionError};

/// Run-level failures, each mapped to a process exit code.
///
/// A screen ending in an error state is not one of these; see
/// [`crate::startup::Outcome`].
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Navigation(_) => 2,
            Self::Session(_) | Self::Identity(_) => 3,
            Self::Api(_) | Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
