//! Application-level state.

use super::Notification;
use std::time::Instant;

/// The current view/screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Feed,
    Categories,
}

/// Global application state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current view.
    pub current_view: View,
    /// Whether to show help overlay.
    pub show_help: bool,
    /// Current notification.
    pub notification: Option<Notification>,
    /// When the current notification was first drawn.
    pub notification_since: Option<Instant>,
    /// Current error message.
    pub error: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl AppState {
    /// Create a new application state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
        self.notification_since = None;
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
        self.notification_since = None;
    }

    /// Start the clock on a fresh notification and drop it once it has expired.
    pub fn expire_notification(&mut self, now: Instant) {
        let Some(notification) = &self.notification else {
            return;
        };

        match self.notification_since {
            None => self.notification_since = Some(now),
            Some(since) if now.saturating_duration_since(since) >= notification.duration() => {
                self.dismiss_notification();
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_notification_expires_after_duration() {
        let mut app = AppState::new();
        let t0 = Instant::now();
        app.notify(Notification::info("hello").with_duration_secs(2));

        app.expire_notification(t0);
        app.expire_notification(t0 + Duration::from_millis(1999));
        assert!(app.notification.is_some());

        app.expire_notification(t0 + Duration::from_secs(2));
        assert!(app.notification.is_none());
        assert!(app.notification_since.is_none());
    }

    #[test]
    fn test_new_notification_restarts_clock() {
        let mut app = AppState::new();
        let t0 = Instant::now();
        app.notify(Notification::info("first").with_duration_secs(1));
        app.expire_notification(t0);

        app.notify(Notification::info("second").with_duration_secs(1));
        app.expire_notification(t0 + Duration::from_millis(1500));
        assert_eq!(
            app.notification.as_ref().map(|n| n.message.as_str()),
            Some("second")
        );
    }
}
