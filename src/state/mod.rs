//! State management for betswipe.
//!
//! This module provides centralized state management with a unidirectional
//! data flow pattern inspired by Redux/Elm architecture. Background work
//! (fetches, saves) reports back through the action channel so every
//! mutation happens in [`Store::reduce`].

mod app_state;
mod category_state;
mod market_state;

pub use app_state::{AppState, View};
pub use category_state::CategoryPicker;
pub use market_state::{Market, SwipeTally, quality_score};

use crate::config::KeyBindings;
use crate::error::{FeedError, Result};
use crate::feed::{ApplyOutcome, FeedSession, FetchCompletion, FetchKind};
use crate::gesture::{Direction, GestureEngine, Offset, SwipeOutcome, Viewport};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Actions that can be dispatched to modify state.
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    SetView(View),
    ToggleHelp,

    // Feed
    LoadFeed,
    RefreshFeed,
    FeedFetched(FetchCompletion),

    // Gestures, in screen pixels
    PointerDown(Offset),
    PointerMove(Offset),
    PointerUp(Instant),
    Swipe(Direction, Instant),
    Tick(Instant),
    SetViewport(Viewport),

    // Category picker
    ScrollUp,
    ScrollDown,
    ToggleCategory,
    SaveCategories,
    CategoriesSaved(std::result::Result<Vec<String>, String>),

    // Notifications
    ShowNotification(Notification),
    DismissNotification,

    // Error handling
    SetError(String),
    ClearError,

    // Quit
    Quit,
}

/// A notification to display to the user.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub duration_secs: u64,
}

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
            duration_secs: 3,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
            duration_secs: 3,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Warning,
            duration_secs: 5,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
            duration_secs: 10,
        }
    }

    pub fn with_duration_secs(mut self, secs: u64) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

/// The global state store.
#[derive(Debug)]
pub struct Store {
    /// Application state.
    pub app: AppState,
    /// The feed queue and its fetch machinery.
    pub feed: FeedSession,
    /// Gesture state for the top card.
    pub gesture: GestureEngine,
    /// Decisions made so far.
    pub tally: SwipeTally,
    /// Category picker state.
    pub categories: CategoryPicker,
    /// Key bindings, for on-screen hints.
    pub keybindings: KeyBindings,
    /// Identity used for preferences.
    user_id: Option<String>,
    /// How long decision toasts stay up.
    toast_secs: u64,
    /// Action sender for dispatching actions.
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Store {
    /// Create a new store with the given action sender.
    pub fn new(
        action_tx: mpsc::UnboundedSender<Action>,
        feed: FeedSession,
        gesture: GestureEngine,
        user_id: Option<String>,
    ) -> Self {
        Self {
            app: AppState::new(),
            feed,
            gesture,
            tally: SwipeTally::default(),
            categories: CategoryPicker::default(),
            keybindings: KeyBindings::default(),
            user_id,
            toast_secs: 2,
            action_tx,
        }
    }

    pub fn with_toast_secs(mut self, secs: u64) -> Self {
        self.toast_secs = secs;
        self
    }

    pub fn with_keybindings(mut self, keybindings: KeyBindings) -> Self {
        self.keybindings = keybindings;
        self
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Either kind of feed fetch is running.
    pub fn is_loading(&self) -> bool {
        self.feed.queue().is_loading() || self.feed.queue().is_fetching()
    }

    /// Dispatch an action to the store.
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.action_tx
            .send(action)
            .map_err(|e| crate::Error::channel(e.to_string()))
    }

    /// Apply an action to update state.
    pub fn reduce(&mut self, action: Action) {
        match action {
            // Navigation
            Action::SetView(view) => self.set_view(view),
            Action::ToggleHelp => {
                self.app.show_help = !self.app.show_help;
                if self.app.show_help {
                    self.gesture.cancel_drag();
                }
            }

            // Feed
            Action::LoadFeed => self.load_feed(),
            Action::RefreshFeed => self.refresh_feed(),
            Action::FeedFetched(completion) => self.feed_fetched(completion),

            // Gestures
            Action::PointerDown(at) => {
                self.gesture.pointer_down(at, self.feed.head());
            }
            Action::PointerMove(at) => self.gesture.pointer_move(at),
            Action::PointerUp(now) => self.gesture.pointer_up(self.feed.head(), now),
            Action::Swipe(direction, now) => {
                self.gesture.commit(direction, self.feed.head(), now);
            }
            Action::Tick(now) => self.tick(now),
            Action::SetViewport(viewport) => self.gesture.set_viewport(viewport),

            // Category picker
            Action::ScrollUp => self.categories.move_cursor(-1),
            Action::ScrollDown => self.categories.move_cursor(1),
            Action::ToggleCategory => self.categories.toggle(),
            Action::SaveCategories => self.save_categories(),
            Action::CategoriesSaved(result) => self.categories_saved(result),

            // Notifications
            Action::ShowNotification(notification) => self.app.notify(notification),
            Action::DismissNotification => self.app.dismiss_notification(),

            // Error handling
            Action::SetError(error) => self.app.error = Some(error),
            Action::ClearError => self.app.error = None,

            // Quit
            Action::Quit => self.app.should_quit = true,
        }
    }

    fn set_view(&mut self, view: View) {
        if view == self.app.current_view {
            return;
        }
        if view == View::Categories {
            self.categories.load(self.feed.queue().categories());
        }
        // The card is off screen now, so its release would never arrive.
        if self.gesture.cancel_drag() {
            debug!("Drag dropped on view change");
        }
        self.app.current_view = view;
    }

    fn load_feed(&mut self) {
        if let Err(e) = self
            .feed
            .spawn_initialize(self.user_id.as_deref(), &self.action_tx)
        {
            info!(error = %e, "Feed not started");
        }
    }

    /// Refresh, or start over if the feed never got its categories.
    fn refresh_feed(&mut self) {
        if self.feed.queue().categories().is_empty() {
            self.load_feed();
        } else if !self.feed.spawn_refresh(&self.action_tx) {
            debug!("Refresh skipped");
        }
    }

    fn feed_fetched(&mut self, completion: FetchCompletion) {
        let kind = completion.ticket.kind;
        match self.feed.apply(completion) {
            Ok(ApplyOutcome::Replaced(count)) => {
                if kind == FetchKind::Refresh {
                    self.notify(Notification::info(format!("Loaded {count} markets")));
                }
                // A small first batch may already be under the refill threshold.
                self.feed.spawn_refill(&self.action_tx);
            }
            Ok(ApplyOutcome::Appended(count)) => debug!(count, "Feed topped up"),
            Ok(ApplyOutcome::Stale) => {}
            // Upstream ran dry; the empty-queue screen reports it once the cards run out.
            Err(FeedError::NoMarketsAvailable) if kind == FetchKind::Refill => {
                debug!("Refill found nothing new");
            }
            Err(e) => {
                if !self.feed.queue().is_empty() {
                    self.notify(Notification::warning(e.to_string()));
                }
            }
        }
    }

    fn tick(&mut self, now: Instant) {
        if let Some(outcome) = self.gesture.tick(now) {
            self.record(outcome);
        }
        self.app.expire_notification(now);
    }

    /// Apply a finished swipe: count it, drop the card, top up the queue.
    fn record(&mut self, outcome: SwipeOutcome) {
        let direction = outcome.direction();
        let market = outcome.market();

        match direction {
            Direction::Right => self.tally.yes += 1,
            Direction::Left => self.tally.no += 1,
            Direction::Up => self.tally.skipped += 1,
        }
        info!(
            decision = direction.label(),
            market_id = %market.id,
            total = self.tally.total(),
            "Decision recorded"
        );

        self.feed.consume(&market.id);
        let message = format!("{} on {}", direction.label(), market.question);
        let toast = match direction {
            Direction::Up => Notification::info(message),
            _ => Notification::success(message),
        };
        self.notify(toast);

        if self.feed.spawn_refill(&self.action_tx) {
            debug!(queued = self.feed.queue().len(), "Refill started");
        }
    }

    fn save_categories(&mut self) {
        if self.categories.saving {
            return;
        }
        let Some(user_id) = self.user_id.clone() else {
            self.notify(Notification::error("Sign in to save categories"));
            return;
        };
        let selection = self.categories.selection();
        if selection.is_empty() {
            self.notify(Notification::warning("Pick at least one category"));
            return;
        }

        self.categories.saving = true;
        self.feed
            .spawn_save_categories(&user_id, selection, &self.action_tx);
    }

    fn categories_saved(&mut self, result: std::result::Result<Vec<String>, String>) {
        self.categories.saving = false;
        match result {
            Ok(categories) => {
                self.feed.set_categories(categories);
                self.app.current_view = View::Feed;
                self.notify(Notification::success("Categories saved"));
                self.refresh_feed();
            }
            Err(e) => self.notify(Notification::error(format!("Could not save categories: {e}"))),
        }
    }

    fn notify(&mut self, notification: Notification) {
        let notification = match notification.level {
            NotificationLevel::Info | NotificationLevel::Success => {
                notification.with_duration_secs(self.toast_secs)
            }
            NotificationLevel::Warning | NotificationLevel::Error => notification,
        };
        self.app.notify(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MarketFetchClient, MockMarketSource, MockPreferencesStore, RawMarket};
    use crate::config::{FeedConfig, GestureConfig};
    use crate::feed::FeedAggregator;
    use crate::gesture::GesturePhase;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn raw(id: &str) -> RawMarket {
        RawMarket {
            id: id.to_string(),
            question: format!("Will {id} resolve YES?"),
            outcome_prices: Some(r#"["0.55", "0.45"]"#.to_string()),
            liquidity_num: Some(5_000.0),
            volume_num: Some(25_000.0),
            active: true,
            closed: false,
            ..Default::default()
        }
    }

    fn store_with(
        prefs: MockPreferencesStore,
        user_id: Option<&str>,
    ) -> (Store, mpsc::UnboundedReceiver<Action>) {
        let mut source = MockMarketSource::new();
        source
            .expect_markets_by_tag()
            .returning(|tag, _| Ok((0..3).map(|i| raw(&format!("{tag}-{i}"))).collect()));

        let config = FeedConfig::default();
        let fetcher = Arc::new(MarketFetchClient::new(
            Arc::new(source),
            Duration::from_secs(300),
        ));
        let aggregator = Arc::new(FeedAggregator::new(fetcher, &config, 20));
        let feed = FeedSession::new(&config, aggregator, Arc::new(prefs));
        let gesture = GestureEngine::new(&GestureConfig::default());

        let (tx, rx) = mpsc::unbounded_channel();
        let store = Store::new(tx, feed, gesture, user_id.map(str::to_string));
        (store, rx)
    }

    fn news_prefs() -> MockPreferencesStore {
        let mut prefs = MockPreferencesStore::new();
        prefs
            .expect_get_categories()
            .returning(|_| Ok(vec!["news".to_string()]));
        prefs
    }

    /// Run actions coming back from background tasks until `done` holds.
    async fn pump(
        store: &mut Store,
        rx: &mut mpsc::UnboundedReceiver<Action>,
        done: impl Fn(&Store) -> bool,
    ) {
        while !done(store) {
            let action = rx.recv().await.expect("action channel closed");
            store.reduce(action);
        }
    }

    #[tokio::test]
    async fn test_load_feed_fills_queue() {
        let (mut store, mut rx) = store_with(news_prefs(), Some("user-1"));
        store.reduce(Action::LoadFeed);
        assert!(store.is_loading());

        pump(&mut store, &mut rx, |s| !s.feed.queue().is_empty()).await;
        assert_eq!(store.feed.queue().len(), 3);
        assert_eq!(store.feed.head().map(|m| m.id.as_str()), Some("198-0"));
    }

    #[tokio::test]
    async fn test_empty_refill_stays_quiet() {
        let (mut store, mut rx) = store_with(news_prefs(), Some("user-1"));
        store.reduce(Action::LoadFeed);
        pump(&mut store, &mut rx, |s| !s.feed.queue().is_empty()).await;

        // The topic has nothing beyond the three queued cards.
        assert!(store.feed.queue().is_fetching());
        pump(&mut store, &mut rx, |s| !s.feed.queue().is_fetching()).await;

        assert_eq!(store.feed.queue().len(), 3);
        assert_eq!(
            store.feed.queue().error(),
            Some(&FeedError::NoMarketsAvailable)
        );
        assert!(store.app.notification.is_none());
    }

    #[tokio::test]
    async fn test_load_feed_without_user() {
        let (mut store, _rx) = store_with(MockPreferencesStore::new(), None);
        store.reduce(Action::LoadFeed);

        assert_eq!(
            store.feed.queue().error(),
            Some(&FeedError::Unauthenticated)
        );
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_keyboard_swipe_records_decision_once() {
        let (mut store, mut rx) = store_with(news_prefs(), Some("user-1"));
        store.reduce(Action::LoadFeed);
        pump(&mut store, &mut rx, |s| !s.feed.queue().is_empty()).await;

        let head = store.feed.head().map(|m| m.id.clone()).unwrap();
        let t0 = Instant::now();
        store.reduce(Action::Swipe(Direction::Right, t0));
        store.reduce(Action::Swipe(Direction::Left, t0));
        store.reduce(Action::Tick(t0 + Duration::from_millis(100)));
        assert_eq!(store.tally.total(), 0);

        store.reduce(Action::Tick(t0 + Duration::from_millis(350)));
        store.reduce(Action::Tick(t0 + Duration::from_millis(400)));

        assert_eq!(
            store.tally,
            SwipeTally {
                yes: 1,
                no: 0,
                skipped: 0
            }
        );
        assert!(store.feed.queue().seen().contains(&head));
        assert!(store.feed.queue().markets().iter().all(|m| m.id != head));
        let toast = store.app.notification.as_ref().unwrap();
        assert!(toast.message.starts_with("YES on "));
    }

    #[tokio::test]
    async fn test_view_switch_mid_drag_keeps_keys_working() {
        let (mut store, mut rx) = store_with(news_prefs(), Some("user-1"));
        store.reduce(Action::LoadFeed);
        pump(&mut store, &mut rx, |s| !s.feed.queue().is_empty()).await;

        let t0 = Instant::now();
        store.reduce(Action::PointerDown(Offset::new(200.0, 400.0)));
        store.reduce(Action::PointerMove(Offset::new(450.0, 400.0)));
        store.reduce(Action::SetView(View::Categories));
        store.reduce(Action::PointerUp(t0));
        store.reduce(Action::SetView(View::Feed));

        // The abandoned drag must not have swiped anything.
        store.reduce(Action::Tick(t0 + Duration::from_millis(400)));
        assert_eq!(store.tally.total(), 0);

        store.reduce(Action::Swipe(Direction::Right, t0));
        store.reduce(Action::Tick(t0 + Duration::from_millis(400)));
        assert_eq!(store.tally.yes, 1);
    }

    #[tokio::test]
    async fn test_opening_help_mid_drag_drops_it() {
        let (mut store, mut rx) = store_with(news_prefs(), Some("user-1"));
        store.reduce(Action::LoadFeed);
        pump(&mut store, &mut rx, |s| !s.feed.queue().is_empty()).await;

        let t0 = Instant::now();
        store.reduce(Action::PointerDown(Offset::new(200.0, 400.0)));
        store.reduce(Action::ToggleHelp);
        assert_eq!(store.gesture.phase(), GesturePhase::Idle);

        store.reduce(Action::ToggleHelp);
        store.reduce(Action::Swipe(Direction::Up, t0));
        store.reduce(Action::Tick(t0 + Duration::from_millis(400)));
        assert_eq!(store.tally.skipped, 1);
    }

    #[tokio::test]
    async fn test_swipe_on_empty_queue_is_ignored() {
        let (mut store, _rx) = store_with(MockPreferencesStore::new(), Some("user-1"));
        let t0 = Instant::now();
        store.reduce(Action::Swipe(Direction::Up, t0));
        store.reduce(Action::Tick(t0 + Duration::from_secs(1)));
        assert_eq!(store.tally.total(), 0);
    }

    #[tokio::test]
    async fn test_categories_view_loads_current_selection() {
        let (mut store, mut rx) = store_with(news_prefs(), Some("user-1"));
        store.reduce(Action::LoadFeed);
        pump(&mut store, &mut rx, |s| !s.feed.queue().is_empty()).await;

        store.reduce(Action::SetView(View::Categories));
        assert_eq!(store.categories.selection(), vec!["news"]);
    }

    #[tokio::test]
    async fn test_saving_categories_refreshes_feed() {
        let mut prefs = news_prefs();
        prefs
            .expect_save_categories()
            .times(1)
            .returning(|_, cats| Ok(cats.to_vec()));
        let (mut store, mut rx) = store_with(prefs, Some("user-1"));
        store.reduce(Action::LoadFeed);
        pump(&mut store, &mut rx, |s| !s.feed.queue().is_empty()).await;

        store.reduce(Action::SetView(View::Categories));
        // Cursor 0 is politics; deselect news further down the table.
        store.reduce(Action::ToggleCategory);
        for _ in 0..9 {
            store.reduce(Action::ScrollDown);
        }
        store.reduce(Action::ToggleCategory);
        store.reduce(Action::SaveCategories);
        assert!(store.categories.saving);

        pump(&mut store, &mut rx, |s| {
            s.feed.queue().categories() == ["politics".to_string()]
                && !s.feed.queue().is_loading()
        })
        .await;

        assert_eq!(store.app.current_view, View::Feed);
        assert!(!store.categories.saving);
        assert!(
            store
                .feed
                .queue()
                .markets()
                .iter()
                .all(|m| m.category == "Politics")
        );
    }

    #[tokio::test]
    async fn test_empty_selection_is_not_saved() {
        let mut prefs = MockPreferencesStore::new();
        prefs.expect_save_categories().times(0);
        let (mut store, _rx) = store_with(prefs, Some("user-1"));

        store.reduce(Action::SetView(View::Categories));
        store.reduce(Action::SaveCategories);

        assert!(!store.categories.saving);
        assert_eq!(
            store.app.notification.as_ref().map(|n| n.level),
            Some(NotificationLevel::Warning)
        );
    }

    #[test]
    fn test_toggle_help_and_quit() {
        let (mut store, _rx) = store_with(MockPreferencesStore::new(), None);
        store.reduce(Action::ToggleHelp);
        assert!(store.app.show_help);
        store.reduce(Action::Quit);
        assert!(store.app.should_quit);
    }
}
