//! Logging helpers.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Rate limiter for repetitive log lines.
///
/// `should_log` returns `true` at most once per interval. Callers keep the
/// log statement itself so fields stay at the call site:
///
/// ```ignore
/// if self.throttle.should_log() {
///     tracing::warn!(error = %e, "authority unreachable");
/// }
/// ```
#[derive(Debug)]
pub struct ThrottledLog {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl ThrottledLog {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn should_log(&self) -> bool {
        let now = Instant::now();
        let mut last = self.last.lock();
        match *last {
            Some(at) if now.saturating_duration_since(at) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}
