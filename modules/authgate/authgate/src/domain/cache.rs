//! TTL-bounded decision cache.
//!
//! Maps a [`Fingerprint`] to a previously obtained allow/deny answer. Reads
//! check expiry themselves, so the background sweeper only bounds memory and
//! never affects which answers are served.
//!
//! The map is a sharded `DashMap`; `get` and `set` lock a single shard for
//! the duration of one lookup or insert. The sweeper retains shard by shard.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::fingerprint::Fingerprint;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    value: bool,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// `None` for entries that never expire: a zero TTL, or a deadline
    /// beyond what `Instant` can represent.
    fn expires_at(&self) -> Option<Instant> {
        if self.ttl.is_zero() {
            return None;
        }
        self.inserted_at.checked_add(self.ttl)
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at().is_some_and(|deadline| now >= deadline)
    }
}

/// Point-in-time counters of a [`DecisionCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    /// Entries removed by expiry (lazy or swept) or by the capacity bound.
    pub evictions: u64,
    pub entries: usize,
}

/// Concurrent fingerprint -> decision map with per-entry expiry.
#[derive(Debug)]
pub struct DecisionCache {
    name: &'static str,
    ttl: Duration,
    max_entries: usize,
    entries: DashMap<Fingerprint, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
    evictions: AtomicU64,
}

impl DecisionCache {
    /// Create a cache whose insertions live for `ttl`.
    ///
    /// A zero `ttl` keeps entries until they are overwritten or evicted by
    /// the capacity bound. `max_entries` of `0` leaves the cache unbounded;
    /// otherwise the bound is enforced on insert and may be briefly exceeded
    /// by concurrent writers.
    #[must_use]
    pub fn new(name: &'static str, ttl: Duration, max_entries: usize) -> Self {
        Self {
            name,
            ttl,
            max_entries,
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            insertions: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached decision for `key`, if present and not expired.
    #[must_use]
    pub fn get(&self, key: Fingerprint) -> Option<bool> {
        let now = Instant::now();
        let found = self
            .entries
            .get(&key)
            .map(|entry| (entry.value, entry.is_expired(now)));

        match found {
            Some((value, false)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Some((_, true)) => {
                // Only drop the entry we saw expire, not a fresh overwrite.
                if self
                    .entries
                    .remove_if(&key, |_, entry| entry.is_expired(now))
                    .is_some()
                {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                }
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or overwrite `key` with the cache-wide TTL.
    pub fn set(&self, key: Fingerprint, value: bool) {
        self.set_with_ttl(key, value, self.ttl);
    }

    /// Insert or overwrite `key`; the expiry clock starts now. A zero `ttl`
    /// never expires.
    pub fn set_with_ttl(&self, key: Fingerprint, value: bool, ttl: Duration) {
        if self.max_entries > 0
            && self.entries.len() >= self.max_entries
            && !self.entries.contains_key(&key)
        {
            self.make_room();
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
        self.insertions.fetch_add(1, Ordering::Relaxed);
    }

    /// Drop every expired entry and return how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut purged = 0usize;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                purged += 1;
            }
            keep
        });
        self.evictions
            .fetch_add(u64::try_from(purged).unwrap_or(u64::MAX), Ordering::Relaxed);
        purged
    }

    /// Number of stored entries, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            insertions: self.insertions.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }

    /// Spawn the periodic expiry sweep on the current tokio runtime.
    ///
    /// The task stops when `cancel` fires or once the cache itself has been
    /// dropped. Must be called from within a runtime.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        every: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        let name = self.name;
        let every = every.max(MIN_SWEEP_INTERVAL);

        tokio::spawn(async move {
            let start = Instant::now().checked_add(every).unwrap_or_else(Instant::now);
            let mut ticker = tokio::time::interval_at(start, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(cache) = cache.upgrade() else { break };
                        let purged = cache.purge_expired();
                        if purged > 0 {
                            debug!(
                                cache = name,
                                purged,
                                remaining = cache.len(),
                                "Purged expired decisions"
                            );
                        }
                    }
                }
            }

            debug!(cache = name, "Decision cache sweeper stopped");
        })
    }

    fn make_room(&self) {
        if self.purge_expired() > 0 && self.entries.len() < self.max_entries {
            return;
        }

        // Evict whichever entry would expire first.
        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| {
                let deadline = entry.value().expires_at();
                (deadline.is_none(), deadline)
            })
            .map(|entry| *entry.key());

        if let Some(key) = victim
            && self.entries.remove(&key).is_some()
        {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }
}
