//! Short-lived response cache for topic queries.

use super::types::RawMarket;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Cache key: one entry per `(topic, limit)` query.
pub type CacheKey = (u64, usize);

#[derive(Debug, Clone)]
struct CacheEntry {
    records: Vec<RawMarket>,
    stored_at: Instant,
}

/// TTL cache of successful upstream responses.
///
/// Expired entries are not evicted eagerly; they are ignored on lookup and
/// overwritten by the next successful fetch.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: HashMap<CacheKey, CacheEntry>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Cached records for `key` if they are younger than the TTL at `now`.
    pub fn get(&self, key: &CacheKey, now: Instant) -> Option<&[RawMarket]> {
        self.entries
            .get(key)
            .filter(|entry| now.saturating_duration_since(entry.stored_at) < self.ttl)
            .map(|entry| entry.records.as_slice())
    }

    pub fn insert(&mut self, key: CacheKey, records: Vec<RawMarket>, now: Instant) {
        self.entries.insert(
            key,
            CacheEntry {
                records,
                stored_at: now,
            },
        );
    }

    /// Drop every entry and timestamp.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> RawMarket {
        RawMarket {
            id: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_hit_within_ttl() {
        let mut cache = ResponseCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.insert((21, 20), vec![record("a")], t0);

        let hit = cache.get(&(21, 20), t0 + Duration::from_secs(299)).unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].id, "a");
    }

    #[test]
    fn test_miss_after_ttl() {
        let mut cache = ResponseCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.insert((21, 20), vec![record("a")], t0);

        assert!(cache.get(&(21, 20), t0 + Duration::from_secs(300)).is_none());
    }

    #[test]
    fn test_keyed_by_topic_and_limit() {
        let mut cache = ResponseCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.insert((21, 20), vec![record("a")], t0);

        assert!(cache.get(&(21, 50), t0).is_none());
        assert!(cache.get(&(22, 20), t0).is_none());
    }

    #[test]
    fn test_clear() {
        let mut cache = ResponseCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.insert((1, 20), vec![], t0);
        cache.insert((2, 20), vec![], t0);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
