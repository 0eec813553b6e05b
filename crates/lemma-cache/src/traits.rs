use std::sync::Arc;
use std::time::Duration;

use crate::memory::{NoCache, TtlCache};

/// Key/value cache with per-entry expiry.
///
/// Implementations must be safe to share across request tasks. Lookups never
/// fail; an unusable cache behaves as if empty.
pub trait ResponseCache<V>: Send + Sync {
    /// Return the live entry under `key`, if any.
    fn get(&self, key: &str) -> Option<V>;

    /// Store `value` under `key` for `ttl`.
    fn set(&self, key: String, value: V, ttl: Duration);

    /// TTL applied by [`put`](ResponseCache::put).
    fn default_ttl(&self) -> Duration;

    fn put(&self, key: String, value: V) {
        self.set(key, value, self.default_ttl());
    }

    /// Drop expired entries, returning how many were removed.
    fn purge_expired(&self) -> usize {
        0
    }

    /// Returns `false` for the pass-through cache.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Build the cache selected by configuration: a [`TtlCache`] with `ttl` as
/// its default, or [`NoCache`] when `ttl` is zero.
pub fn build_cache<V>(ttl: Duration) -> Arc<dyn ResponseCache<V>>
where
    V: Clone + Send + Sync + 'static,
{
    if ttl.is_zero() {
        tracing::debug!("response cache disabled");
        Arc::new(NoCache)
    } else {
        Arc::new(TtlCache::new(ttl))
    }
}
