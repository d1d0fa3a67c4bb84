//! Multi-topic aggregation: fetch, filter, rank, dedupe and merge.

use super::categories::{self, Category};
use crate::api::{MarketFetchClient, MarketNormalizer, RawMarket};
use crate::config::FeedConfig;
use crate::state::{Market, quality_score};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One upstream query in an aggregation plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicQuery {
    pub label: &'static str,
    pub topic_id: u64,
}

/// Builds a ranked, deduplicated candidate list from several categories.
pub struct FeedAggregator {
    fetcher: Arc<MarketFetchClient>,
    topic_fetch_limit: usize,
    min_liquidity: f64,
    min_volume: f64,
}

impl FeedAggregator {
    pub fn new(fetcher: Arc<MarketFetchClient>, config: &FeedConfig, topic_fetch_limit: usize) -> Self {
        Self {
            fetcher,
            topic_fetch_limit,
            min_liquidity: config.min_liquidity,
            min_volume: config.min_volume,
        }
    }

    pub fn fetcher(&self) -> &MarketFetchClient {
        &self.fetcher
    }

    /// Build up to `target_count` markets, none of which are in `seen_ids`.
    pub async fn build_feed(
        &self,
        category_ids: &[String],
        seen_ids: &HashSet<String>,
        target_count: usize,
    ) -> Vec<Market> {
        let mut rng = StdRng::from_entropy();
        self.build_feed_with_rng(category_ids, seen_ids, target_count, &mut rng)
            .await
    }

    /// [`build_feed`](Self::build_feed) with a caller-supplied shuffle source.
    pub async fn build_feed_with_rng<R>(
        &self,
        category_ids: &[String],
        seen_ids: &HashSet<String>,
        target_count: usize,
        rng: &mut R,
    ) -> Vec<Market>
    where
        R: Rng + Send + ?Sized,
    {
        let resolved = categories::resolve(category_ids);
        if resolved.is_empty() {
            warn!(?category_ids, "No valid categories found");
            return Vec::new();
        }

        let plan = plan_queries(&resolved, rng);
        let per_topic = target_count.div_ceil(resolved.len()).max(3);
        let mut seen = seen_ids.clone();
        let mut markets: Vec<Market> = Vec::with_capacity(target_count);

        debug!(
            topics = plan.len(),
            per_topic, target_count, "Starting aggregation"
        );

        for query in plan {
            if markets.len() >= target_count {
                break;
            }

            let mut candidates: Vec<RawMarket> = self
                .fetcher
                .fetch_by_topic(query.topic_id, self.topic_fetch_limit)
                .await
                .into_iter()
                .filter(|raw| self.accepts(raw, &seen))
                .collect();

            candidates.sort_by(|a, b| raw_score(b).total_cmp(&raw_score(a)));

            let kept: Vec<Market> = candidates
                .iter()
                .filter(|raw| seen.insert(raw.id.clone()))
                .take(per_topic)
                .map(|raw| MarketNormalizer::normalize(raw, query.label))
                .collect();

            debug!(
                topic_id = query.topic_id,
                label = query.label,
                kept = kept.len(),
                "Topic processed"
            );
            markets.extend(kept);
        }

        markets.sort_by(|a, b| b.score().total_cmp(&a.score()));
        markets.truncate(target_count);

        info!(count = markets.len(), target_count, "Aggregated feed");
        markets
    }

    /// Open, active, liquid enough, traded enough, and not seen yet.
    fn accepts(&self, raw: &RawMarket, seen: &HashSet<String>) -> bool {
        raw.active
            && !raw.closed
            && raw.liquidity() >= self.min_liquidity
            && raw.volume() >= self.min_volume
            && !seen.contains(&raw.id)
    }
}

fn raw_score(raw: &RawMarket) -> f64 {
    quality_score(raw.liquidity(), raw.volume())
}

/// Flatten categories into topic queries and shuffle them uniformly.
pub fn plan_queries<R: Rng + ?Sized>(resolved: &[&'static Category], rng: &mut R) -> Vec<TopicQuery> {
    let mut plan: Vec<TopicQuery> = resolved
        .iter()
        .flat_map(|category| {
            category.tag_ids.iter().map(move |&topic_id| TopicQuery {
                label: category.label,
                topic_id,
            })
        })
        .collect();
    plan.shuffle(rng);
    plan
}
