//! Error types for gateway access and pipeline runs.
//!
//! Only one failure ever leaves the engine as an `Err`: a failed candidate
//! fetch ([`DocsweepError::Fetch`]). Per-document
//! delete failures are reported as [`crate::dedup::types::Outcome::Failed`]
//! and never abort a run.

use thiserror::Error;

/// Result alias for engine-level operations.
pub type DocsweepResult<T> = Result<T, DocsweepError>;

/// Failure talking to a document store.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The requested document does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The store answered but the payload could not be understood.
    #[error("malformed response: {0}")]
    Decode(String),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The gateway was constructed with settings it cannot use.
    #[error("invalid gateway configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Pipeline-fatal errors.
#[derive(Error, Debug)]
pub enum DocsweepError {
    /// The candidate set could not be fetched; no plan is produced.
    #[error("could not fetch candidate documents: {0}")]
    Fetch(#[source] GatewayError),
}
