//! authgate
//!
//! Caching authentication and ACL hook for message brokers. Connect and
//! topic-access decisions are delegated to HTTP authorities and memoized
//! per pipeline for a configurable TTL.
//!
//! ## Decision flow
//!
//! ```text
//! host -> HttpAuthHook -> FingerprintScheme -> DecisionCache (hit)
//!                                           -> HttpAuthority (miss) -> DecisionCache
//! ```
//!
//! - An empty authority URL disables its pipeline; the callback allows.
//! - Status `200` allows and any other status denies; both are cached.
//! - Transport failures and timeouts deny without being cached.
//!
//! ## Configuration
//!
//! ```yaml
//! auth:
//!   url: "http://authority.local/mqtt/auth"
//!   cache_seconds: 600
//! acl:
//!   url: "http://authority.local/mqtt/acl"
//!   cache_seconds: 30
//! client_timeout_seconds: 5
//! sweep_interval_seconds: 60
//! max_entries: 0
//! fingerprint: concatenated
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod hook;
pub mod infra;
pub mod telemetry;

pub use config::{HttpAuthHookConfig, PipelineConfig};
pub use domain::{CacheMetrics, DecisionCache, Fingerprint, FingerprintScheme, HookError};
pub use hook::{HOOK_ID, HttpAuthHook};
pub use infra::HttpAuthority;
