//! Authenticated access to the resource API gateway.

pub mod client;
pub mod envelope;
pub mod error;

pub use client::ApiClient;
pub use envelope::ListEnvelope;
pub use error::ApiError;
