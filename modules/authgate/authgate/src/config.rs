//! Configuration for the HTTP auth hook.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::fingerprint::FingerprintScheme;

/// Cache lifetime of connect decisions when none is configured.
pub const DEFAULT_AUTH_CACHE_SECONDS: u64 = 600;

/// Cache lifetime of ACL decisions when none is configured.
pub const DEFAULT_ACL_CACHE_SECONDS: u64 = 30;

/// Hook configuration.
///
/// An empty authority URL disables that pipeline: every request is allowed
/// without consulting a cache or an authority.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HttpAuthHookConfig {
    /// Connect authentication pipeline.
    pub auth: PipelineConfig,

    /// Topic ACL pipeline.
    pub acl: PipelineConfig,

    /// Whole-request timeout for authority calls, in seconds.
    pub client_timeout_seconds: u64,

    /// Period of the background expiry sweep, in seconds. Must be non-zero.
    pub sweep_interval_seconds: u64,

    /// Per-cache entry bound. `0` keeps every entry until it expires.
    pub max_entries: usize,

    /// How request fields are combined before hashing.
    pub fingerprint: FingerprintScheme,
}

impl Default for HttpAuthHookConfig {
    fn default() -> Self {
        Self {
            auth: PipelineConfig::default(),
            acl: PipelineConfig::default(),
            client_timeout_seconds: 5,
            sweep_interval_seconds: 60,
            max_entries: 0,
            fingerprint: FingerprintScheme::default(),
        }
    }
}

impl HttpAuthHookConfig {
    #[must_use]
    pub const fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_seconds)
    }

    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    #[must_use]
    pub fn auth_ttl(&self) -> Duration {
        self.auth.ttl_or(DEFAULT_AUTH_CACHE_SECONDS)
    }

    #[must_use]
    pub fn acl_ttl(&self) -> Duration {
        self.acl.ttl_or(DEFAULT_ACL_CACHE_SECONDS)
    }
}

/// Settings of one decision pipeline.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Authority endpoint receiving the JSON POST. Empty = disabled.
    pub url: String,

    /// How long a decision stays cached, in seconds. `0` never expires;
    /// unset falls back to the pipeline default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_seconds: Option<u64>,
}

impl PipelineConfig {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cache_seconds: None,
        }
    }

    #[must_use]
    pub fn with_cache_seconds(mut self, seconds: u64) -> Self {
        self.cache_seconds = Some(seconds);
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }

    fn ttl_or(&self, default_seconds: u64) -> Duration {
        Duration::from_secs(self.cache_seconds.unwrap_or(default_seconds))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_defaults() {
        let cfg = HttpAuthHookConfig::default();
        assert!(!cfg.auth.is_enabled());
        assert!(!cfg.acl.is_enabled());
        assert_eq!(cfg.auth_ttl(), Duration::from_secs(600));
        assert_eq!(cfg.acl_ttl(), Duration::from_secs(30));
        assert_eq!(cfg.client_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.sweep_interval(), Duration::from_secs(60));
        assert_eq!(cfg.fingerprint, FingerprintScheme::Concatenated);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg: HttpAuthHookConfig = serde_json::from_value(serde_json::json!({
            "auth": { "url": "http://authority.local/auth" },
            "acl": { "cache_seconds": 5 },
            "fingerprint": "length_prefixed"
        }))
        .unwrap();

        assert!(cfg.auth.is_enabled());
        assert_eq!(cfg.auth_ttl(), Duration::from_secs(600));
        assert!(!cfg.acl.is_enabled());
        assert_eq!(cfg.acl_ttl(), Duration::from_secs(5));
        assert_eq!(cfg.client_timeout_seconds, 5);
        assert_eq!(cfg.fingerprint, FingerprintScheme::LengthPrefixed);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<HttpAuthHookConfig, _> = serde_json::from_value(serde_json::json!({
            "auth": { "url": "", "ttl": 5 }
        }));
        assert!(res.is_err());
    }

    #[test]
    fn whitespace_url_counts_as_disabled() {
        let pipeline = PipelineConfig::new("   ").with_cache_seconds(10);
        assert!(!pipeline.is_enabled());
    }

    #[test]
    fn zero_cache_seconds_is_kept() {
        let cfg = HttpAuthHookConfig {
            auth: PipelineConfig::new("http://a").with_cache_seconds(0),
            ..HttpAuthHookConfig::default()
        };
        assert_eq!(cfg.auth_ttl(), Duration::ZERO);
    }
}
