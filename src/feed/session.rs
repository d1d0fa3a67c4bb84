//! A user's feed session: the queue plus the collaborators that fill it.

use super::aggregator::FeedAggregator;
use super::queue::{ApplyOutcome, FeedQueue, FetchKind, FetchTicket};
use crate::api::PreferencesStore;
use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::state::{Action, Market};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// A finished fetch on its way back to the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub result: Result<Vec<Market>, FeedError>,
}

/// Owns the feed queue and drives fetches against injected collaborators.
pub struct FeedSession {
    id: Uuid,
    queue: FeedQueue,
    aggregator: Arc<FeedAggregator>,
    preferences: Arc<dyn PreferencesStore>,
    default_categories: Vec<String>,
}

impl fmt::Debug for FeedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedSession")
            .field("id", &self.id)
            .field("queue", &self.queue)
            .field("default_categories", &self.default_categories)
            .finish_non_exhaustive()
    }
}

impl FeedSession {
    pub fn new(
        config: &FeedConfig,
        aggregator: Arc<FeedAggregator>,
        preferences: Arc<dyn PreferencesStore>,
    ) -> Self {
        let id = Uuid::new_v4();
        debug!(session = %id, "Feed session created");
        Self {
            id,
            queue: FeedQueue::new(config),
            aggregator,
            preferences,
            default_categories: config.default_categories.clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn queue(&self) -> &FeedQueue {
        &self.queue
    }

    /// The card on top of the stack.
    pub fn head(&self) -> Option<&Market> {
        self.queue.head()
    }

    /// Mark `market_id` as decided and drop it from the queue.
    pub fn consume(&mut self, market_id: &str) -> Option<Market> {
        debug!(session = %self.id, market_id, "Consuming market");
        self.queue.consume(market_id)
    }

    /// Replace the chosen categories. Takes effect on the next refresh.
    pub fn set_categories(&mut self, categories: Vec<String>) {
        self.queue.set_categories(categories);
    }

    pub fn apply(&mut self, completion: FetchCompletion) -> Result<ApplyOutcome, FeedError> {
        let FetchCompletion { ticket, result } = completion;
        let outcome = self.queue.apply(ticket, result);
        if let Err(e) = &outcome {
            warn!(session = %self.id, error = %e, "Feed fetch did not produce markets");
        }
        outcome
    }

    /// Resolve the user's categories and load the first batch.
    pub async fn initialize(&mut self, user_id: Option<&str>) -> Result<ApplyOutcome, FeedError> {
        let ticket = self.queue.begin_initialize(user_id)?;
        let completion = self.fetch(ticket).await;
        self.apply(completion)
    }

    /// Top up the queue if it is low. `None` when the guards block the fetch.
    pub async fn check_and_refill(&mut self) -> Option<Result<ApplyOutcome, FeedError>> {
        let ticket = self.queue.begin_refill()?;
        let completion = self.fetch(ticket).await;
        Some(self.apply(completion))
    }

    /// Drop the cache and seen ids and load a fresh batch.
    pub async fn refresh(&mut self) -> Option<Result<ApplyOutcome, FeedError>> {
        let ticket = self.queue.begin_refresh()?;
        let completion = self.fetch(ticket).await;
        Some(self.apply(completion))
    }

    /// [`initialize`](Self::initialize) on a background task.
    pub fn spawn_initialize(
        &mut self,
        user_id: Option<&str>,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<(), FeedError> {
        let ticket = self.queue.begin_initialize(user_id)?;
        self.spawn(ticket, tx.clone());
        Ok(())
    }

    /// [`check_and_refill`](Self::check_and_refill) on a background task.
    pub fn spawn_refill(&mut self, tx: &mpsc::UnboundedSender<Action>) -> bool {
        match self.queue.begin_refill() {
            Some(ticket) => {
                self.spawn(ticket, tx.clone());
                true
            }
            None => false,
        }
    }

    /// [`refresh`](Self::refresh) on a background task.
    pub fn spawn_refresh(&mut self, tx: &mpsc::UnboundedSender<Action>) -> bool {
        match self.queue.begin_refresh() {
            Some(ticket) => {
                self.spawn(ticket, tx.clone());
                true
            }
            None => false,
        }
    }

    /// Persist a new selection and adopt it for subsequent fetches.
    pub async fn save_categories(
        &mut self,
        user_id: &str,
        categories: &[String],
    ) -> crate::Result<()> {
        let saved = self.preferences.save_categories(user_id, categories).await?;
        info!(session = %self.id, categories = ?saved, "Categories saved");
        self.queue.set_categories(saved);
        Ok(())
    }

    /// Persist a new selection on a background task.
    ///
    /// The result comes back as [`Action::CategoriesSaved`]; the queue is
    /// left untouched until the reducer applies it.
    pub fn spawn_save_categories(
        &self,
        user_id: &str,
        categories: Vec<String>,
        tx: &mpsc::UnboundedSender<Action>,
    ) {
        let preferences = Arc::clone(&self.preferences);
        let user_id = user_id.to_string();
        let tx = tx.clone();
        let span = info_span!("save_categories", session = %self.id);

        tokio::spawn(
            async move {
                let result = preferences
                    .save_categories(&user_id, &categories)
                    .await
                    .map_err(|e| {
                        warn!(error = %e, "Failed to save categories");
                        e.to_string()
                    });

                if tx.send(Action::CategoriesSaved(result)).is_err() {
                    debug!("Action channel closed, dropping save result");
                }
            }
            .instrument(span),
        );
    }

    fn spawn(&self, ticket: FetchTicket, tx: mpsc::UnboundedSender<Action>) {
        let fallback = ticket.clone();
        let handle = tokio::spawn(self.fetch(ticket));
        let session = self.id;

        tokio::spawn(async move {
            let completion = match handle.await {
                Ok(completion) => completion,
                Err(e) => {
                    error!(%session, error = %e, "Feed fetch task failed");
                    FetchCompletion {
                        ticket: fallback,
                        result: Err(FeedError::FetchFailed(e.to_string())),
                    }
                }
            };

            if tx.send(Action::FeedFetched(completion)).is_err() {
                debug!(%session, "Action channel closed, dropping feed result");
            }
        });
    }

    fn fetch(&self, ticket: FetchTicket) -> impl Future<Output = FetchCompletion> + Send + use<> {
        let span = info_span!("feed_fetch", session = %self.id, kind = ?ticket.kind);
        run_fetch(
            Arc::clone(&self.aggregator),
            Arc::clone(&self.preferences),
            self.default_categories.clone(),
            ticket,
        )
        .instrument(span)
    }
}

async fn run_fetch(
    aggregator: Arc<FeedAggregator>,
    preferences: Arc<dyn PreferencesStore>,
    default_categories: Vec<String>,
    mut ticket: FetchTicket,
) -> FetchCompletion {
    match ticket.kind {
        FetchKind::Initial => {
            let user_id = ticket.user_id.clone().unwrap_or_default();
            ticket.categories =
                resolve_categories(preferences.as_ref(), &user_id, default_categories).await;
        }
        FetchKind::Refresh => aggregator.fetcher().clear_cache().await,
        FetchKind::Refill => {}
    }

    let markets = aggregator
        .build_feed(&ticket.categories, &ticket.exclude, ticket.target_count)
        .await;

    FetchCompletion {
        ticket,
        result: Ok(markets),
    }
}

/// The user's saved categories, or the defaults if the lookup fails.
async fn resolve_categories(
    preferences: &dyn PreferencesStore,
    user_id: &str,
    default_categories: Vec<String>,
) -> Vec<String> {
    match preferences.get_categories(user_id).await {
        Ok(categories) => {
            info!(?categories, "Loaded saved categories");
            categories
        }
        Err(e) => {
            warn!(error = %e, "Falling back to default categories");
            default_categories
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MarketFetchClient, MockMarketSource, MockPreferencesStore, RawMarket};
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn raw(id: &str, liquidity: f64) -> RawMarket {
        RawMarket {
            id: id.to_string(),
            question: format!("{id}?"),
            outcome_prices: Some(r#"["0.7", "0.3"]"#.to_string()),
            liquidity_num: Some(liquidity),
            volume_num: Some(50_000.0),
            active: true,
            closed: false,
            ..Default::default()
        }
    }

    /// Four markets per tag, ids `<tag>-<n>`.
    fn records(tag: u64) -> Vec<RawMarket> {
        (0..4)
            .map(|i| raw(&format!("{tag}-{i}"), 2_000.0 + i as f64))
            .collect()
    }

    fn session(source: MockMarketSource, prefs: MockPreferencesStore) -> FeedSession {
        let config = FeedConfig::default();
        let fetcher = Arc::new(MarketFetchClient::new(
            Arc::new(source),
            Duration::from_secs(300),
        ));
        let aggregator = Arc::new(FeedAggregator::new(fetcher, &config, 20));
        FeedSession::new(&config, aggregator, Arc::new(prefs))
    }

    fn prefs_returning(categories: &'static [&'static str]) -> MockPreferencesStore {
        let mut prefs = MockPreferencesStore::new();
        prefs
            .expect_get_categories()
            .returning(move |_| Ok(categories.iter().map(|c| c.to_string()).collect()));
        prefs
    }

    fn ids(session: &FeedSession) -> Vec<String> {
        session.queue().markets().iter().map(|m| m.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_initialize_without_user_is_unauthenticated() {
        let mut source = MockMarketSource::new();
        source.expect_markets_by_tag().times(0);
        let mut prefs = MockPreferencesStore::new();
        prefs.expect_get_categories().times(0);

        let mut session = session(source, prefs);
        assert_eq!(session.initialize(None).await, Err(FeedError::Unauthenticated));
        assert!(session.queue().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_uses_saved_categories() {
        let mut source = MockMarketSource::new();
        source
            .expect_markets_by_tag()
            .returning(|tag, _| Ok(records(tag)));

        let mut session = session(source, prefs_returning(&["weather"]));
        let outcome = session.initialize(Some("user-1")).await;

        assert_eq!(outcome, Ok(ApplyOutcome::Replaced(8)));
        assert_eq!(session.queue().categories(), &["weather".to_string()]);
        assert!(session.queue().markets().iter().all(|m| m.category == "Weather"));
    }

    #[tokio::test]
    async fn test_initialize_falls_back_to_defaults() {
        let mut source = MockMarketSource::new();
        source
            .expect_markets_by_tag()
            .returning(|tag, _| Ok(records(tag)));
        let mut prefs = MockPreferencesStore::new();
        prefs
            .expect_get_categories()
            .returning(|_| Err(Error::network("connection refused")));

        let mut session = session(source, prefs);
        session.initialize(Some("user-1")).await.unwrap();

        assert_eq!(
            session.queue().categories(),
            &[
                "crypto".to_string(),
                "politics".to_string(),
                "sports".to_string()
            ]
        );
        assert_eq!(session.queue().len(), 25);
    }

    #[tokio::test]
    async fn test_empty_selection_reports_no_markets() {
        let mut source = MockMarketSource::new();
        source.expect_markets_by_tag().times(0);

        let mut session = session(source, prefs_returning(&[]));
        assert_eq!(
            session.initialize(Some("user-1")).await,
            Err(FeedError::NoMarketsAvailable)
        );
        assert_eq!(session.queue().error(), Some(&FeedError::NoMarketsAvailable));
    }

    #[tokio::test]
    async fn test_refill_only_yields_fresh_markets() {
        let mut source = MockMarketSource::new();
        source.expect_markets_by_tag().returning(|tag, _| {
            let mut batch = records(tag);
            batch.push(raw("late-arrival", 1_500.0));
            Ok(batch)
        });

        // News has a single tag: four markets plus the late arrival.
        let mut session = session(source, prefs_returning(&["news"]));
        session.initialize(Some("user-1")).await.unwrap();
        assert_eq!(session.queue().len(), 5);

        let head = session.head().unwrap().id.clone();
        session.consume(&head);
        assert_eq!(session.queue().len(), 4);

        // Every candidate is either queued or seen, so the refill finds nothing.
        let refill = session.check_and_refill().await;
        assert_eq!(refill, Some(Err(FeedError::NoMarketsAvailable)));
        assert!(!ids(&session).contains(&head));
        assert_eq!(session.queue().len(), 4);
    }

    #[tokio::test]
    async fn test_refill_is_idempotent_while_in_flight() {
        let mut source = MockMarketSource::new();
        source
            .expect_markets_by_tag()
            .returning(|tag, _| Ok(records(tag)));

        let mut session = session(source, prefs_returning(&["news"]));
        session.initialize(Some("user-1")).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(session.spawn_refill(&tx));
        assert!(!session.spawn_refill(&tx));
        assert!(session.queue().is_fetching());

        let Some(Action::FeedFetched(completion)) = rx.recv().await else {
            panic!("expected a feed result");
        };
        assert_eq!(completion.ticket.kind, FetchKind::Refill);
        let _ = session.apply(completion);
        assert!(!session.queue().is_fetching());
    }

    #[tokio::test]
    async fn test_refresh_clears_cache_and_seen() {
        let mut source = MockMarketSource::new();
        source
            .expect_markets_by_tag()
            .times(2)
            .returning(|tag, _| Ok(records(tag)));

        let mut session = session(source, prefs_returning(&["news"]));
        session.initialize(Some("user-1")).await.unwrap();
        session.consume("198-3");
        assert!(session.queue().seen().contains("198-3"));

        let outcome = session.refresh().await;
        assert_eq!(outcome, Some(Ok(ApplyOutcome::Replaced(4))));
        assert!(session.queue().seen().is_empty());
        assert!(ids(&session).contains(&"198-3".to_string()));
    }

    #[tokio::test]
    async fn test_refresh_beats_inflight_refill() {
        let mut source = MockMarketSource::new();
        source
            .expect_markets_by_tag()
            .returning(|tag, _| Ok(records(tag)));

        let mut session = session(source, prefs_returning(&["news"]));
        session.initialize(Some("user-1")).await.unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(session.spawn_refill(&tx));
        assert!(session.spawn_refresh(&tx));

        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let Some(Action::FeedFetched(completion)) = rx.recv().await else {
                panic!("expected a feed result");
            };
            outcomes.push((completion.ticket.kind, session.apply(completion)));
        }

        let refill = outcomes
            .iter()
            .find(|(kind, _)| *kind == FetchKind::Refill)
            .map(|(_, outcome)| outcome.clone());
        assert_eq!(refill, Some(Ok(ApplyOutcome::Stale)));
        assert_eq!(session.queue().len(), 4);
        assert!(!session.queue().is_loading());
        assert!(!session.queue().is_fetching());
    }

    #[tokio::test]
    async fn test_saved_categories_drive_next_refresh() {
        let mut source = MockMarketSource::new();
        source
            .expect_markets_by_tag()
            .returning(|tag, _| Ok(records(tag)));
        let mut prefs = prefs_returning(&["news"]);
        prefs
            .expect_save_categories()
            .withf(|user, cats| user == "user-1" && cats.len() == 1 && cats[0] == "weather")
            .times(1)
            .returning(|_, cats| Ok(cats.to_vec()));

        let mut session = session(source, prefs);
        session.initialize(Some("user-1")).await.unwrap();

        session
            .save_categories("user-1", &["weather".to_string()])
            .await
            .unwrap();
        assert_eq!(session.queue().categories(), &["weather".to_string()]);

        session.refresh().await.unwrap().unwrap();
        assert!(session.queue().markets().iter().all(|m| m.category == "Weather"));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_categories() {
        let mut source = MockMarketSource::new();
        source
            .expect_markets_by_tag()
            .returning(|tag, _| Ok(records(tag)));
        let mut prefs = prefs_returning(&["news"]);
        prefs
            .expect_save_categories()
            .returning(|_, _| Err(Error::api(500, "database unavailable")));

        let mut session = session(source, prefs);
        session.initialize(Some("user-1")).await.unwrap();

        let result = session.save_categories("user-1", &["tech".to_string()]).await;
        assert!(result.is_err());
        assert_eq!(session.queue().categories(), &["news".to_string()]);
    }

    #[tokio::test]
    async fn test_seen_cap_lets_markets_reappear() {
        let mut source = MockMarketSource::new();
        source
            .expect_markets_by_tag()
            .returning(|tag, _| Ok(records(tag)));

        let mut session = session(source, prefs_returning(&["news"]));
        session.initialize(Some("user-1")).await.unwrap();

        for id in ids(&session) {
            session.consume(&id);
        }
        assert!(session.queue().is_empty());
        assert!(session.check_and_refill().await.unwrap().is_err());

        // Push the seen set past its cap; it resets and old ids become eligible.
        for i in 0..1997 {
            session.consume(&format!("filler-{i}"));
        }
        assert!(session.queue().seen().is_empty());

        let outcome = session.check_and_refill().await;
        assert_eq!(outcome, Some(Ok(ApplyOutcome::Appended(4))));
        assert!(ids(&session).contains(&"198-0".to_string()));
    }
}
