//! Host-facing hook contract.
//!
//! The broker owns connections, topic matching and delivery. It only needs
//! to ask a hook two questions and receive a boolean back.

use async_trait::async_trait;

use crate::capability::HookCapability;
use crate::models::{AuthenticateRequest, AuthorizeRequest};

/// Callback trait a broker hook implements.
///
/// Both decision callbacks always resolve to a boolean. Internal failures
/// degrade to `false`; they are never surfaced to the host as errors or
/// panics.
///
/// ```ignore
/// let allowed = hook.on_acl_check(&AuthorizeRequest::new("c1", "alice", "sensors/1", true)).await;
/// ```
#[async_trait]
pub trait AuthHook: Send + Sync {
    /// Stable identifier of the hook.
    fn id(&self) -> &'static str;

    /// Whether this hook handles the given capability.
    fn provides(&self, capability: HookCapability) -> bool;

    /// Decide whether a connecting client may connect.
    async fn on_connect_authenticate(&self, request: &AuthenticateRequest) -> bool;

    /// Decide whether a client may read (`write == false`) or write a topic.
    async fn on_acl_check(&self, request: &AuthorizeRequest) -> bool;
}
