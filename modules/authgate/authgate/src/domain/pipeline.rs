//! One decision pipeline: cache probe, authority call on miss, memoize.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use authgate_sdk::{AuthorityError, Decision};
use tracing::{debug, warn};

use super::cache::DecisionCache;
use super::fingerprint::Fingerprint;
use crate::telemetry::ThrottledLog;

/// Throttle interval for unreachable authority warnings.
const UNAVAILABLE_LOG_THROTTLE: Duration = Duration::from_secs(10);

/// Cache-in-front-of-authority decision flow for a single pipeline.
///
/// Answers from the authority (allow or deny) are cached for the cache TTL.
/// Indeterminate outcomes deny the current request and leave the cache
/// untouched, so the next identical request asks again.
#[derive(Debug)]
pub struct DecisionPipeline {
    name: &'static str,
    cache: Arc<DecisionCache>,
    unavailable_log_throttle: ThrottledLog,
}

impl DecisionPipeline {
    #[must_use]
    pub fn new(cache: Arc<DecisionCache>) -> Self {
        Self {
            name: cache.name(),
            cache,
            unavailable_log_throttle: ThrottledLog::new(UNAVAILABLE_LOG_THROTTLE),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn cache(&self) -> &Arc<DecisionCache> {
        &self.cache
    }

    /// Decide `key`, calling `ask` only on a cache miss.
    #[tracing::instrument(skip_all, fields(pipeline = self.name, fingerprint = %key))]
    pub async fn decide<F, Fut>(&self, key: Fingerprint, ask: F) -> Decision
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<bool, AuthorityError>>,
    {
        if let Some(allowed) = self.cache.get(key) {
            debug!(allowed, "Decision cache hit");
            return if allowed {
                Decision::Allow
            } else {
                Decision::Deny
            };
        }

        debug!("Decision cache miss");
        let result = ask().await;

        if let Err(e) = &result
            && self.unavailable_log_throttle.should_log()
        {
            warn!(error = %e, "Authority unavailable, denying without caching");
        }

        let decision = Decision::from_remote(&result);
        if let Some(allowed) = decision.cacheable() {
            self.cache.set(key, allowed);
        }
        decision
    }
}
