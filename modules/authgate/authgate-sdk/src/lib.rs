//! authgate SDK
//!
//! This crate provides the public contract of the authgate hook:
//!
//! - [`AuthHook`] - Callback trait the host broker invokes
//! - [`DecisionAuthority`] - Trait for the remote source of truth
//! - [`AuthenticateRequest`] / [`AuthorizeRequest`] - Decision request models
//! - [`Decision`] - Three-way internal decision (allow / deny / indeterminate)
//! - [`HookCapability`] - Capabilities a hook can announce to the host
//! - [`AuthorityError`] - Error types for authority round trips
//!
//! ## Usage
//!
//! The host registers a hook and calls it for every connect and every
//! topic access:
//!
//! ```ignore
//! use authgate_sdk::{AuthHook, AuthenticateRequest, HookCapability};
//!
//! if hook.provides(HookCapability::OnConnectAuthenticate) {
//!     let req = AuthenticateRequest::new("client-1", "alice", b"secret".to_vec());
//!     let allowed = hook.on_connect_authenticate(&req).await;
//! }
//! ```

pub mod api;
pub mod capability;
pub mod error;
pub mod models;
pub mod plugin_api;

// Re-export main types at crate root
pub use api::AuthHook;
pub use capability::{CapabilitySet, HookCapability};
pub use error::AuthorityError;
pub use models::{AuthenticateRequest, AuthorizeRequest, Decision, DecisionRequest};
pub use plugin_api::DecisionAuthority;
