//! Fetched-at bookkeeping for query keys.
//!
//! Results younger than `stale_time` are served as-is; older ones, or keys
//! that were invalidated, are refetched on the next refresh.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const NETWORK_KEY: &str = "/api/network";
pub const CLUSTERS_KEY: &str = "/api/clusters";

#[derive(Debug, Clone)]
pub struct QueryCache {
    stale_time: Duration,
    fetched_at: HashMap<String, Instant>,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            stale_time,
            fetched_at: HashMap::new(),
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    pub fn is_stale(&self, key: &str) -> bool {
        self.is_stale_at(key, Instant::now())
    }

    /// Never fetched, invalidated, or older than `stale_time` at `now`.
    pub fn is_stale_at(&self, key: &str, now: Instant) -> bool {
        match self.fetched_at.get(key) {
            Some(at) => now.saturating_duration_since(*at) >= self.stale_time,
            None => true,
        }
    }

    pub fn mark_fresh(&mut self, key: &str) {
        self.mark_fresh_at(key, Instant::now());
    }

    pub fn mark_fresh_at(&mut self, key: &str, at: Instant) {
        self.fetched_at.insert(key.to_string(), at);
    }

    pub fn invalidate(&mut self, key: &str) {
        self.fetched_at.remove(key);
    }

    pub fn invalidate_all(&mut self) {
        self.fetched_at.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staleness() {
        let mut cache = QueryCache::new(Duration::from_secs(8));
        let t0 = Instant::now();
        assert!(cache.is_stale_at(NETWORK_KEY, t0));

        cache.mark_fresh_at(NETWORK_KEY, t0);
        assert!(!cache.is_stale_at(NETWORK_KEY, t0 + Duration::from_secs(7)));
        assert!(cache.is_stale_at(NETWORK_KEY, t0 + Duration::from_secs(8)));
        assert!(cache.is_stale_at(CLUSTERS_KEY, t0));
    }

    #[test]
    fn test_invalidate() {
        let mut cache = QueryCache::new(Duration::from_secs(8));
        let t0 = Instant::now();
        cache.mark_fresh_at(NETWORK_KEY, t0);
        cache.mark_fresh_at(CLUSTERS_KEY, t0);
        cache.invalidate(NETWORK_KEY);
        assert!(cache.is_stale_at(NETWORK_KEY, t0));
        assert!(!cache.is_stale_at(CLUSTERS_KEY, t0));
        cache.invalidate_all();
        assert!(cache.is_stale_at(CLUSTERS_KEY, t0));
    }
}
