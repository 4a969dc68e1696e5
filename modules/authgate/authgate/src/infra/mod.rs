//! Adapters to external systems.

pub mod http_authority;

pub use http_authority::HttpAuthority;
