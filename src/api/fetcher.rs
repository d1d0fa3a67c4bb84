//! Cached, failure-tolerant topic fetching.

use super::cache::ResponseCache;
use super::client::MarketSource;
use super::types::RawMarket;
use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// Market fetch client: a [`MarketSource`] fronted by a TTL cache.
pub struct MarketFetchClient {
    source: Arc<dyn MarketSource>,
    cache: Mutex<ResponseCache>,
}

impl MarketFetchClient {
    pub fn new(source: Arc<dyn MarketSource>, cache_ttl: Duration) -> Self {
        Self {
            source,
            cache: Mutex::new(ResponseCache::new(cache_ttl)),
        }
    }

    /// Fetch one topic, serving from cache within the TTL.
    ///
    /// Failures are returned and leave the cache untouched for that key.
    pub async fn try_fetch_by_topic(&self, topic_id: u64, limit: usize) -> Result<Vec<RawMarket>> {
        let key = (topic_id, limit);

        if let Some(cached) = self.cache.lock().await.get(&key, Instant::now()) {
            debug!(topic_id, "Using cached data for topic");
            return Ok(cached.to_vec());
        }

        let records = self
            .source
            .markets_by_tag(topic_id, limit)
            .await
            .map_err(|e| Error::topic_fetch(topic_id, e))?;

        self.cache
            .lock()
            .await
            .insert(key, records.clone(), Instant::now());

        Ok(records)
    }

    /// Fetch one topic; any failure is logged and yields an empty list.
    pub async fn fetch_by_topic(&self, topic_id: u64, limit: usize) -> Vec<RawMarket> {
        match self.try_fetch_by_topic(topic_id, limit).await {
            Ok(records) => records,
            Err(e) if e.is_recoverable() => {
                warn!(topic_id, error = %e, "Skipping topic");
                Vec::new()
            }
            Err(e) => {
                error!(topic_id, error = %e, "Topic rejected by upstream, skipping");
                Vec::new()
            }
        }
    }

    /// Evict all cached responses.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
        debug!("Market cache cleared");
    }

    #[cfg(test)]
    pub(crate) async fn cached_entries(&self) -> usize {
        self.cache.lock().await.len()
    }
}
