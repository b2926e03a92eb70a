//! Session provider: who is signed in, with which token and roles.

pub mod context;
pub mod keycloak;
pub mod provider;

pub use context::{Session, SessionContext, SessionError, SessionStatus};
pub use keycloak::KeycloakProvider;
pub use provider::{create_identity_provider, IdentityError, IdentityProvider, TokenSet};
