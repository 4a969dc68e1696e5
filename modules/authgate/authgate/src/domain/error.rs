//! Errors raised while configuring the hook.
//!
//! Per-request failures never surface as errors; see
//! [`authgate_sdk::AuthorityError`] and [`authgate_sdk::Decision`].

/// Configure-time failures.
#[derive(thiserror::Error, Debug)]
pub enum HookError {
    #[error("invalid {pipeline} authority url '{url}': {reason}")]
    InvalidUrl {
        pipeline: &'static str,
        url: String,
        reason: String,
    },

    #[error("cache sweep interval must be greater than zero")]
    ZeroSweepInterval,

    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

impl From<reqwest::Error> for HookError {
    fn from(e: reqwest::Error) -> Self {
        Self::HttpClient(e.to_string())
    }
}
