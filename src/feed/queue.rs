//! The feed queue: ordered cards, seen ids and fetch bookkeeping.
//!
//! Every fetch is split in two. `begin_*` runs synchronously, applies the
//! guards and hands out a [`FetchTicket`]. The async build happens
//! elsewhere, and [`FeedQueue::apply`] folds the result back in. Replacing
//! fetches (initialize/refresh) bump a generation counter; results carrying
//! an older generation are dropped so a refresh is never overwritten by a
//! refill that started before it.

use super::seen::SeenSet;
use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::state::Market;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info};

/// Why a fetch was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// First load after resolving the user's categories; replaces the queue.
    Initial,
    /// Background top-up; appends to the queue.
    Refill,
    /// User-initiated reload; replaces the queue.
    Refresh,
}

impl FetchKind {
    pub fn replaces(self) -> bool {
        !matches!(self, Self::Refill)
    }
}

/// Everything an async build needs, captured at `begin_*` time.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub kind: FetchKind,
    pub generation: u64,
    pub target_count: usize,
    /// Empty for [`FetchKind::Initial`] until the preferences lookup fills it.
    pub categories: Vec<String>,
    /// Ids the aggregator must not return.
    pub exclude: HashSet<String>,
    /// Set for [`FetchKind::Initial`].
    pub user_id: Option<String>,
}

/// What [`FeedQueue::apply`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Replaced(usize),
    Appended(usize),
    /// A newer replacing fetch started after this one; result dropped.
    Stale,
}

/// Ordered queue of unseen markets plus the session's seen set.
#[derive(Debug, Clone)]
pub struct FeedQueue {
    markets: Vec<Market>,
    seen: SeenSet,
    categories: Vec<String>,
    initial_fetch_count: usize,
    refetch_count: usize,
    refetch_threshold: usize,
    generation: u64,
    refill_in_flight: bool,
    replace_in_flight: Option<u64>,
    error: Option<FeedError>,
    last_updated: Option<DateTime<Utc>>,
}

impl FeedQueue {
    pub fn new(config: &FeedConfig) -> Self {
        Self {
            markets: Vec::new(),
            seen: SeenSet::new(config.max_seen_ids),
            categories: Vec::new(),
            initial_fetch_count: config.initial_fetch_count,
            refetch_count: config.refetch_count,
            refetch_threshold: config.refetch_threshold,
            generation: 0,
            refill_in_flight: false,
            replace_in_flight: None,
            error: None,
            last_updated: None,
        }
    }

    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    /// The card currently on top of the stack.
    pub fn head(&self) -> Option<&Market> {
        self.markets.first()
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn set_categories(&mut self, categories: Vec<String>) {
        self.categories = categories;
    }

    pub fn error(&self) -> Option<&FeedError> {
        self.error.as_ref()
    }

    pub fn set_error(&mut self, error: FeedError) {
        self.error = Some(error);
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// A replacing fetch (initialize/refresh) is in flight.
    pub fn is_loading(&self) -> bool {
        self.replace_in_flight.is_some()
    }

    /// A refill is in flight.
    pub fn is_fetching(&self) -> bool {
        self.refill_in_flight
    }

    pub fn needs_refill(&self) -> bool {
        self.markets.len() <= self.refetch_threshold
    }

    /// Remove `market_id` from the queue (if present) and mark it seen.
    ///
    /// Does not trigger a refill; callers follow up with [`begin_refill`](Self::begin_refill).
    pub fn consume(&mut self, market_id: &str) -> Option<Market> {
        let removed = self
            .markets
            .iter()
            .position(|m| m.id == market_id)
            .map(|index| self.markets.remove(index));

        self.seen.insert(market_id);
        removed
    }

    /// Start the initial load for `user_id`.
    pub fn begin_initialize(&mut self, user_id: Option<&str>) -> Result<FetchTicket, FeedError> {
        let Some(user_id) = user_id.filter(|id| !id.is_empty()) else {
            self.error = Some(FeedError::Unauthenticated);
            return Err(FeedError::Unauthenticated);
        };

        let mut ticket = self.begin_replace(FetchKind::Initial);
        ticket.user_id = Some(user_id.to_string());
        Ok(ticket)
    }

    /// Start a refresh: clears the seen set and replaces the queue on completion.
    ///
    /// Returns `None` when no categories are known yet.
    pub fn begin_refresh(&mut self) -> Option<FetchTicket> {
        if self.categories.is_empty() {
            return None;
        }
        self.seen.clear();
        Some(self.begin_replace(FetchKind::Refresh))
    }

    /// Start a refill if the queue is low and nothing else is fetching.
    pub fn begin_refill(&mut self) -> Option<FetchTicket> {
        if !self.needs_refill()
            || self.refill_in_flight
            || self.replace_in_flight.is_some()
            || self.categories.is_empty()
        {
            return None;
        }

        self.refill_in_flight = true;
        let exclude = self
            .seen
            .as_set()
            .iter()
            .cloned()
            .chain(self.markets.iter().map(|m| m.id.clone()))
            .collect();

        debug!(queued = self.markets.len(), "Fetching more markets");
        Some(FetchTicket {
            kind: FetchKind::Refill,
            generation: self.generation,
            target_count: self.refetch_count,
            categories: self.categories.clone(),
            exclude,
            user_id: None,
        })
    }

    fn begin_replace(&mut self, kind: FetchKind) -> FetchTicket {
        self.generation += 1;
        self.replace_in_flight = Some(self.generation);

        FetchTicket {
            kind,
            generation: self.generation,
            target_count: self.initial_fetch_count,
            categories: self.categories.clone(),
            exclude: self.seen.as_set().clone(),
            user_id: None,
        }
    }

    /// Fold a finished fetch back into the queue.
    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Market>, FeedError>,
    ) -> Result<ApplyOutcome, FeedError> {
        if ticket.kind.replaces() {
            if self.replace_in_flight == Some(ticket.generation) {
                self.replace_in_flight = None;
            }
        } else {
            self.refill_in_flight = false;
        }

        if ticket.generation != self.generation {
            debug!(
                kind = ?ticket.kind,
                ticket = ticket.generation,
                current = self.generation,
                "Dropping stale feed result"
            );
            return Ok(ApplyOutcome::Stale);
        }

        if ticket.kind == FetchKind::Initial {
            self.categories = ticket.categories;
        }

        let incoming = match result {
            Ok(markets) if markets.is_empty() => Err(FeedError::NoMarketsAvailable),
            other => other,
        };
        let incoming = match incoming {
            Ok(markets) => markets,
            Err(e) => {
                self.error = Some(e.clone());
                return Err(e);
            }
        };

        let outcome = if ticket.kind.replaces() {
            self.markets.clear();
            ApplyOutcome::Replaced(self.merge(incoming))
        } else {
            ApplyOutcome::Appended(self.merge(incoming))
        };

        self.error = None;
        self.last_updated = Some(Utc::now());
        info!(?outcome, queued = self.markets.len(), "Feed updated");
        Ok(outcome)
    }

    /// Append `incoming`, keeping first occurrences and skipping seen ids.
    fn merge(&mut self, incoming: Vec<Market>) -> usize {
        let mut present: HashSet<String> = self.markets.iter().map(|m| m.id.clone()).collect();
        let before = self.markets.len();

        for market in incoming {
            if self.seen.contains(&market.id) || !present.insert(market.id.clone()) {
                continue;
            }
            self.markets.push(market);
        }

        self.markets.len() - before
    }
}
