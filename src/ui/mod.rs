//! UI rendering using ratatui.
//!
//! Rendering is a pure function of the [`Store`] and the frame time. The
//! card stack samples the gesture engine at `now`, so the same store can be
//! drawn at different instants while an animation runs.

mod layout;
mod widgets;

pub use layout::Layout;
pub use widgets::{ActionBar, CardStack, CategoryPickerView, HelpPanel, StatusBar, TabBar};

use std::time::Instant;

use ratatui::{Frame, layout::Rect};

use crate::state::{Store, View};

/// Where the top card rests on a terminal of size `screen`.
pub fn top_card_area(screen: Rect) -> Rect {
    CardStack::card_area(Layout::new(screen).main_area)
}

/// Main UI renderer.
pub struct Ui;

impl Ui {
    /// Render the entire UI.
    pub fn render(frame: &mut Frame, store: &Store, now: Instant) {
        let layout = Layout::new(frame.area());

        StatusBar::render(frame, layout.status_area, store);
        TabBar::render(frame, layout.tab_area, store);

        match store.app.current_view {
            View::Feed => {
                CardStack::render(frame, layout.main_area, store, now);
                ActionBar::render(frame, layout.action_area, store);
            }
            View::Categories => {
                CategoryPickerView::render(frame, layout.main_area, store);
            }
        }

        if store.app.show_help {
            HelpPanel::render(frame, frame.area(), &store.keybindings);
        }

        if let Some(notification) = &store.app.notification {
            widgets::render_notification(frame, layout.notification_area, notification);
        }

        if let Some(error) = &store.app.error {
            widgets::render_error(frame, layout.notification_area, error);
        }
    }
}
