//! Crate-wide error types.

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    /// The configured credential id resolved to nothing. Fatal for the whole
    /// send; no per-recipient attempt is made.
    #[error("Credentials not found: {0}")]
    CredentialsNotFound(String),

    #[error("Malformed endpoint URL: {0}")]
    MalformedEndpoint(#[from] url::ParseError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Escalated aggregate delivery failure (explicit sends with
    /// `fail_on_error` only).
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("{0}")]
    Other(String),
}
