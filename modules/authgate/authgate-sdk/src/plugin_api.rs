//! Authority trait for remote decision sources.
//!
//! The HTTP client in `authgate` implements this trait. Tests and
//! alternative transports can provide their own implementation.

use async_trait::async_trait;

use crate::error::AuthorityError;
use crate::models::{AuthenticateRequest, AuthorizeRequest};

/// Remote source of truth for authentication and authorization.
///
/// `Ok(true)` means the authority allowed the request and `Ok(false)` that
/// it answered with a denial. `Err` means no answer could be obtained.
#[async_trait]
pub trait DecisionAuthority: Send + Sync {
    /// Ask whether a client may connect.
    ///
    /// # Errors
    ///
    /// - `NotConfigured` if no authentication authority is wired up
    /// - `Serialization` if the request body cannot be encoded
    /// - `Timeout` / `Transport` if the authority cannot be reached
    async fn authenticate(&self, request: &AuthenticateRequest) -> Result<bool, AuthorityError>;

    /// Ask whether a client may read or write a topic.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`DecisionAuthority::authenticate`].
    async fn authorize(&self, request: &AuthorizeRequest) -> Result<bool, AuthorityError>;
}
