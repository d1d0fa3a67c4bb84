//! Terminal input for betswipe.
//!
//! A blocking reader thread polls crossterm and interleaves a steady tick,
//! which drives gesture animations and toast expiry. [`EventHandler`] turns
//! the resulting [`Event`]s into store actions.

mod handler;
mod input;

pub use handler::EventHandler;
pub use input::{InputEvent, Key, Modifiers};

use crossterm::event::{Event as CrosstermEvent, KeyEvent, MouseEvent};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Terminal events the app reacts to.
#[derive(Debug, Clone)]
pub enum Event {
    /// Animation frame.
    Tick,
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// New terminal size in cells.
    Resize(u16, u16),
}

impl Event {
    /// Focus and paste events are dropped.
    fn from_terminal(event: CrosstermEvent) -> Option<Self> {
        match event {
            CrosstermEvent::Key(key) => Some(Self::Key(key)),
            CrosstermEvent::Mouse(mouse) => Some(Self::Mouse(mouse)),
            CrosstermEvent::Resize(columns, rows) => Some(Self::Resize(columns, rows)),
            CrosstermEvent::FocusGained | CrosstermEvent::FocusLost | CrosstermEvent::Paste(_) => {
                None
            }
        }
    }
}

/// Configuration for the event loop.
#[derive(Debug, Clone)]
pub struct EventConfig {
    /// Time between [`Event::Tick`]s.
    pub tick_rate: Duration,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(16),
        }
    }
}

impl EventConfig {
    pub fn with_tick_rate_ms(mut self, ms: u64) -> Self {
        self.tick_rate = Duration::from_millis(ms.max(1));
        self
    }
}

/// Event loop for handling terminal events.
pub struct EventLoop {
    config: EventConfig,
}

impl EventLoop {
    pub fn new(config: EventConfig) -> Self {
        Self { config }
    }

    /// Start reading on a blocking thread. It exits once the receiver is dropped.
    pub fn start(self) -> (mpsc::UnboundedReceiver<Event>, tokio::task::JoinHandle<()>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let tick_rate = self.config.tick_rate;
        let handle = tokio::task::spawn_blocking(move || pump(tick_rate, &event_tx));
        (event_rx, handle)
    }
}

fn pump(tick_rate: Duration, tx: &mpsc::UnboundedSender<Event>) {
    let mut last_tick = Instant::now();

    loop {
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        match read_event(timeout) {
            Ok(Some(event)) => {
                if tx.send(event).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Terminal input failed");
                break;
            }
        }

        if last_tick.elapsed() >= tick_rate {
            if tx.send(Event::Tick).is_err() {
                break;
            }
            last_tick = Instant::now();
        }
    }

    debug!("Event loop stopped");
}

fn read_event(timeout: Duration) -> io::Result<Option<Event>> {
    if !crossterm::event::poll(timeout)? {
        return Ok(None);
    }
    Ok(Event::from_terminal(crossterm::event::read()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_terminal_events_are_filtered() {
        let key = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::NONE);
        assert!(matches!(
            Event::from_terminal(CrosstermEvent::Key(key)),
            Some(Event::Key(k)) if k == key
        ));
        assert!(matches!(
            Event::from_terminal(CrosstermEvent::Resize(80, 24)),
            Some(Event::Resize(80, 24))
        ));
        assert!(Event::from_terminal(CrosstermEvent::FocusLost).is_none());
        assert!(Event::from_terminal(CrosstermEvent::Paste("yes".into())).is_none());
    }

    #[test]
    fn test_tick_rate_never_zero() {
        let config = EventConfig::default().with_tick_rate_ms(0);
        assert_eq!(config.tick_rate, Duration::from_millis(1));
    }
}
