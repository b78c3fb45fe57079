// In-memory TTL cache using DashMap
use crate::domain::traits::Clock;
use crate::infrastructure::clock::SystemClock;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default lifetime of a cached response (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    written_at: i64,
}

/// Thread-safe response cache with time-to-live on read.
///
/// Expired entries are ignored by `get` but stay in the map until a matching
/// `invalidate` or `remove`. There is no size bound.
pub struct TtlCache<V> {
    map: DashMap<String, Entry<V>>,
    ttl_millis: i64,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            map: DashMap::new(),
            ttl_millis: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_millis.max(0) as u64)
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.map
            .get(key)
            .map(|entry| self.fresh(entry.written_at))
            .unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.map.get(key)?;
        if self.fresh(entry.written_at) {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        let written_at = self.clock.now_millis();
        self.map.insert(key.into(), Entry { value, written_at });
    }

    pub fn remove(&self, key: &str) -> bool {
        self.map.remove(key).is_some()
    }

    /// Drop every entry whose key contains `pattern`. Returns how many were dropped.
    pub fn invalidate(&self, pattern: &str) -> usize {
        self.invalidate_any(&[pattern])
    }

    /// Drop every entry whose key contains any of `patterns`.
    pub fn invalidate_any(&self, patterns: &[&str]) -> usize {
        let before = self.map.len();
        self.map
            .retain(|key, _| !patterns.iter().any(|p| key.contains(p)));
        let removed = before.saturating_sub(self.map.len());
        if removed > 0 {
            tracing::debug!(?patterns, removed, "cache invalidated");
        }
        removed
    }

    pub fn clear(&self) {
        self.map.clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.map.iter().map(|entry| entry.key().clone()).collect()
    }

    fn fresh(&self, written_at: i64) -> bool {
        self.clock.now_millis().saturating_sub(written_at) < self.ttl_millis
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ManualClock;
    use serde_json::json;

    fn cache_at(ttl_ms: u64) -> (TtlCache<serde_json::Value>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let cache = TtlCache::with_clock(Duration::from_millis(ttl_ms), clock.clone());
        (cache, clock)
    }

    #[test]
    fn hit_until_ttl_then_miss() {
        let (cache, clock) = cache_at(5000);
        cache.set("k", json!({"a": 1}));

        clock.set(4000);
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));

        clock.set(6000);
        assert_eq!(cache.get("k"), None);
        assert!(!cache.is_valid("k"));
        // expired entries are ignored, not evicted
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn boundary_is_exclusive() {
        let (cache, clock) = cache_at(1000);
        cache.set("k", json!(1));
        clock.set(999);
        assert!(cache.is_valid("k"));
        clock.set(1000);
        assert!(!cache.is_valid("k"));
    }

    #[test]
    fn zero_ttl_never_hits() {
        let (cache, _clock) = cache_at(0);
        cache.set("k", json!(1));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn set_overwrites_and_restamps() {
        let (cache, clock) = cache_at(1000);
        cache.set("k", json!(1));
        clock.set(900);
        cache.set("k", json!(2));
        clock.set(1500);
        assert_eq!(cache.get("k"), Some(json!(2)));
    }

    #[test]
    fn missing_key_is_invalid() {
        let (cache, _) = cache_at(1000);
        assert!(!cache.is_valid("nope"));
        assert_eq!(cache.get("nope"), None);
    }

    #[test]
    fn invalidate_by_substring() {
        let (cache, _) = cache_at(60_000);
        for key in [
            "all_products_{}",
            "pending_products_{}",
            "product_7",
            "all_orders_{}",
            "all_products_suppliers",
        ] {
            cache.set(key, json!(null));
        }

        assert_eq!(cache.invalidate("products"), 3);
        assert!(cache.keys().iter().all(|k| !k.contains("products")));
        assert!(cache.is_valid("product_7"));
        assert!(cache.is_valid("all_orders_{}"));
    }

    #[test]
    fn invalidate_any_matches_each_pattern() {
        let (cache, _) = cache_at(60_000);
        cache.set("supplier_docs_1", json!(1));
        cache.set("dashboard_stats", json!(2));
        cache.set("all_orders_{}", json!(3));

        assert_eq!(cache.invalidate_any(&["supplier", "dashboard_stats"]), 2);
        assert_eq!(cache.keys(), vec!["all_orders_{}".to_string()]);
        assert_eq!(cache.invalidate("nothing"), 0);
    }

    #[test]
    fn remove_and_clear() {
        let (cache, _) = cache_at(60_000);
        cache.set("a", json!(1));
        cache.set("b", json!(2));
        assert!(cache.remove("a"));
        assert!(!cache.remove("a"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
