//! Error types for authority round trips.

use thiserror::Error;

/// Failures while asking a remote authority for a decision.
///
/// These represent the inability to obtain an answer. A remote denial is
/// not an error: it is `Ok(false)` from [`crate::DecisionAuthority`].
/// Every variant is treated as an indeterminate, non-cacheable outcome.
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// No authority URL is configured for the requested decision.
    #[error("{0} authority is not configured")]
    NotConfigured(&'static str),

    /// The outgoing request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Serialization(String),

    /// The authority did not answer within the client timeout.
    #[error("authority request timed out")]
    Timeout,

    /// Connection, TLS or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),
}
