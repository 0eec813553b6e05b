//! In-process cache implementations.
//!
//! [`TtlCache`] keeps entries in a `HashMap` behind a `RwLock`, each with
//! its own deadline. Expired entries read as misses and are reclaimed by
//! [`purge_expired`](crate::ResponseCache::purge_expired), which the server
//! runs on a fixed interval.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use crate::traits::ResponseCache;

#[derive(Debug)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, (V, Option<Instant>)>>,
    ttl: Duration,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Poisoned locks are recovered.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, (V, Option<Instant>)>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, (V, Option<Instant>)>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<V> ResponseCache<V> for TtlCache<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> Option<V> {
        let entries = self.read();
        match entries.get(key) {
            Some((value, deadline)) if live(*deadline, Instant::now()) => Some(value.clone()),
            _ => None,
        }
    }

    fn set(&self, key: String, value: V, ttl: Duration) {
        // A lifetime past the end of the clock never expires.
        let deadline = Instant::now().checked_add(ttl);
        self.write().insert(key, (value, deadline));
    }

    fn default_ttl(&self) -> Duration {
        self.ttl
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, (_, deadline)| live(*deadline, now));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, "purged expired cache entries");
        }
        removed
    }
}

fn live(deadline: Option<Instant>, now: Instant) -> bool {
    deadline.map_or(true, |deadline| now < deadline)
}

/// Pass-through cache used when caching is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl<V> ResponseCache<V> for NoCache {
    fn get(&self, _key: &str) -> Option<V> {
        None
    }

    fn set(&self, _key: String, _value: V, _ttl: Duration) {}

    fn default_ttl(&self) -> Duration {
        Duration::ZERO
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("chain-abc".into(), 7u32);
        assert_eq!(cache.get("chain-abc"), Some(7));
        assert_eq!(cache.get("chain-def"), None);
    }

    #[test]
    fn later_set_overwrites() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.put("k".into(), 1u32);
        cache.put("k".into(), 2u32);
        assert_eq!(cache.get("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("k".into(), 1u32, Duration::ZERO);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn purge_removes_only_expired() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.set("old".into(), 1u32, Duration::ZERO);
        cache.put("fresh".into(), 2u32);
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh"), Some(2));
    }

    #[test]
    fn unbounded_ttl_never_expires() {
        let cache = TtlCache::new(Duration::MAX);
        cache.put("k".into(), 1u32);
        assert_eq!(cache.get("k"), Some(1));
        assert_eq!(cache.purge_expired(), 0);
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.put("k".into(), "v".to_string());
        assert!(cache.get("k").is_some());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn no_cache_never_stores() {
        let cache = NoCache;
        ResponseCache::<u32>::put(&cache, "k".into(), 1);
        assert_eq!(ResponseCache::<u32>::get(&cache, "k"), None);
        assert_eq!(ResponseCache::<u32>::purge_expired(&cache), 0);
    }
}
