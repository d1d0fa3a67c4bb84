//! Main application module.
//!
//! This module contains the main `App` struct that coordinates
//! the event loop, state management, and rendering.

use crate::api::{GammaClientBuilder, MarketFetchClient, PreferencesClient};
use crate::config::Config;
use crate::error::Result;
use crate::events::{EventConfig, EventHandler, EventLoop};
use crate::feed::{FeedAggregator, FeedSession};
use crate::gesture::GestureEngine;
use crate::state::{Action, Store};
use crate::ui::Ui;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// The main application.
pub struct App {
    /// Terminal.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application store.
    store: Store,
    /// Maps terminal events to actions.
    event_handler: EventHandler,
    /// Terminal event source.
    event_loop: Option<EventLoop>,
    /// Action receiver.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Whether mouse capture was enabled and must be undone.
    mouse_capture: bool,
}

impl App {
    /// Create a new application.
    pub fn new(config: Config) -> Result<Self> {
        // Clients first so a bad URL fails before the terminal is taken over
        let gamma = GammaClientBuilder::new().config(config.api.clone()).build()?;
        let fetcher = Arc::new(MarketFetchClient::new(
            Arc::new(gamma),
            config.api.cache_ttl(),
        ));
        let aggregator = Arc::new(FeedAggregator::new(
            fetcher,
            &config.feed,
            config.api.topic_fetch_limit,
        ));
        let preferences = Arc::new(PreferencesClient::new(&config.api)?);
        let feed = FeedSession::new(&config.feed, aggregator, preferences);
        let gesture = GestureEngine::new(&config.gesture);

        // Set up terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        if config.ui.mouse_support {
            execute!(stdout, EnableMouseCapture)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        // Create action channel
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let user_id = config.identity.user_id.clone();
        if user_id.is_none() {
            warn!("No identity.user_id configured");
        }

        let store = Store::new(action_tx, feed, gesture, user_id)
            .with_toast_secs(config.ui.toast_secs)
            .with_keybindings(config.keybindings.clone());

        let event_handler = EventHandler::new(config.keybindings.clone(), &config.gesture);
        let event_loop =
            EventLoop::new(EventConfig::default().with_tick_rate_ms(config.ui.tick_rate_ms));

        info!(session = %store.feed.id(), "Application initialized");

        Ok(Self {
            terminal,
            store,
            event_handler,
            event_loop: Some(event_loop),
            action_rx,
            mouse_capture: config.ui.mouse_support,
        })
    }

    /// Run the application event loop.
    pub async fn run(&mut self) -> Result<()> {
        let size = self.terminal.size()?;
        self.store.reduce(Action::SetViewport(
            self.event_handler.resize(size.width, size.height),
        ));
        self.store.reduce(Action::LoadFeed);

        let Some(event_loop) = self.event_loop.take() else {
            return Ok(());
        };
        let (mut events, event_task) = event_loop.start();

        // Main event loop
        loop {
            // Update event handler with current state
            self.event_handler.update_store_snapshot(&self.store);

            // Render UI
            let now = Instant::now();
            self.terminal.draw(|frame| {
                Ui::render(frame, &self.store, now);
            })?;

            tokio::select! {
                // Handle terminal events
                event = events.recv() => {
                    let Some(event) = event else { break };
                    if let Some(action) = self.event_handler.handle_event(event, Instant::now()) {
                        self.store.reduce(action);
                    }
                }

                // Handle actions from the channel
                Some(action) = self.action_rx.recv() => {
                    self.store.reduce(action);
                }
            }

            // Check if we should quit
            if self.store.app.should_quit {
                break;
            }
        }

        // The reader thread stops once its receiver is gone.
        drop(events);
        if let Err(e) = event_task.await {
            warn!(error = %e, "Event loop ended abnormally");
        }
        info!(swiped = self.store.tally.total(), "Shutting down");
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = disable_raw_mode();
        if self.mouse_capture {
            let _ = execute!(self.terminal.backend_mut(), DisableMouseCapture);
        }
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}
