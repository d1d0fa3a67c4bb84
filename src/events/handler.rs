//! Event handler for turning terminal events into actions.

use super::{Event, InputEvent};
use crate::config::{GestureConfig, KeyBindings};
use crate::gesture::{Direction, Offset, Viewport};
use crate::state::{Action, Store, View};
use crate::ui;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Position, Rect};
use std::time::Instant;

/// Handles input events and produces actions.
pub struct EventHandler {
    /// Key bindings.
    keybindings: KeyBindings,
    /// Terminal cell size in pixels, for pointer gestures.
    cell_width_px: f64,
    cell_height_px: f64,
    /// Terminal size in cells, once known.
    screen: Option<Rect>,
    /// Store reference for state-aware handling.
    store_snapshot: Option<StoreSnapshot>,
}

/// Snapshot of relevant store state for event handling.
#[derive(Debug, Clone, Copy)]
struct StoreSnapshot {
    current_view: View,
    show_help: bool,
}

impl EventHandler {
    /// Create a new event handler.
    pub fn new(keybindings: KeyBindings, gesture: &GestureConfig) -> Self {
        Self {
            keybindings,
            cell_width_px: gesture.cell_width_px,
            cell_height_px: gesture.cell_height_px,
            screen: None,
            store_snapshot: None,
        }
    }

    /// Update the store snapshot for state-aware event handling.
    pub fn update_store_snapshot(&mut self, store: &Store) {
        self.store_snapshot = Some(StoreSnapshot {
            current_view: store.app.current_view,
            show_help: store.app.show_help,
        });
    }

    /// Record the terminal size and return it in pixels.
    pub fn resize(&mut self, columns: u16, rows: u16) -> Viewport {
        self.screen = Some(Rect::new(0, 0, columns, rows));
        self.viewport(columns, rows)
    }

    /// Size of a `columns` × `rows` terminal in pixels.
    pub fn viewport(&self, columns: u16, rows: u16) -> Viewport {
        Viewport {
            width: f64::from(columns) * self.cell_width_px,
            height: f64::from(rows) * self.cell_height_px,
        }
    }

    /// Map a terminal event to an action. `now` stamps time-dependent actions.
    pub fn handle_event(&mut self, event: Event, now: Instant) -> Option<Action> {
        match event {
            Event::Tick => Some(Action::Tick(now)),
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            Event::Resize(columns, rows) => Some(Action::SetViewport(self.resize(columns, rows))),
        }
    }

    /// Handle a key event and return an optional action.
    fn handle_key(&self, key: KeyEvent, now: Instant) -> Option<Action> {
        // Only process key press events
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let snapshot = self.store_snapshot?;
        let input = InputEvent::from(key);

        // Global shortcuts
        if input.matches(&self.keybindings.quit) {
            return Some(Action::Quit);
        }
        if input.matches(&self.keybindings.help) {
            return Some(Action::ToggleHelp);
        }
        if snapshot.show_help {
            return input
                .matches(&self.keybindings.back)
                .then_some(Action::ToggleHelp);
        }

        match snapshot.current_view {
            View::Feed => self.handle_feed_view(key, &input, now),
            View::Categories => self.handle_categories_view(key, &input),
        }
    }

    fn handle_feed_view(&self, key: KeyEvent, input: &InputEvent, now: Instant) -> Option<Action> {
        if input.matches(&self.keybindings.yes) || key.code == KeyCode::Right {
            return Some(Action::Swipe(Direction::Right, now));
        }
        if input.matches(&self.keybindings.no) || key.code == KeyCode::Left {
            return Some(Action::Swipe(Direction::Left, now));
        }
        if input.matches(&self.keybindings.skip) || key.code == KeyCode::Up {
            return Some(Action::Swipe(Direction::Up, now));
        }
        if input.matches(&self.keybindings.refresh) {
            return Some(Action::RefreshFeed);
        }
        if input.matches(&self.keybindings.categories) {
            return Some(Action::SetView(View::Categories));
        }

        None
    }

    fn handle_categories_view(&self, key: KeyEvent, input: &InputEvent) -> Option<Action> {
        if input.matches(&self.keybindings.up) || key.code == KeyCode::Up {
            return Some(Action::ScrollUp);
        }
        if input.matches(&self.keybindings.down) || key.code == KeyCode::Down {
            return Some(Action::ScrollDown);
        }
        if input.matches(&self.keybindings.toggle) {
            return Some(Action::ToggleCategory);
        }
        if input.matches(&self.keybindings.select) {
            return Some(Action::SaveCategories);
        }
        if input.matches(&self.keybindings.back) || input.matches(&self.keybindings.feed) {
            return Some(Action::SetView(View::Feed));
        }

        None
    }

    /// Left-button down/drag/up drives the top card on the feed view.
    ///
    /// A release is always forwarded so a drag never outlives the button.
    fn handle_mouse(&self, mouse: MouseEvent, now: Instant) -> Option<Action> {
        let snapshot = self.store_snapshot?;
        if let MouseEventKind::Up(MouseButton::Left) = mouse.kind {
            return Some(Action::PointerUp(now));
        }
        if snapshot.current_view != View::Feed || snapshot.show_help {
            return match mouse.kind {
                MouseEventKind::ScrollUp => Some(Action::ScrollUp),
                MouseEventKind::ScrollDown => Some(Action::ScrollDown),
                _ => None,
            };
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if self.on_top_card(mouse.column, mouse.row) => {
                Some(Action::PointerDown(self.to_pixels(mouse.column, mouse.row)))
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                Some(Action::PointerMove(self.to_pixels(mouse.column, mouse.row)))
            }
            _ => None,
        }
    }

    /// Whether a cell lies on the resting top card. Unknown screen sizes accept any cell.
    fn on_top_card(&self, column: u16, row: u16) -> bool {
        self.screen
            .is_none_or(|screen| ui::top_card_area(screen).contains(Position::new(column, row)))
    }

    /// Centre of the given cell, in pixels.
    fn to_pixels(&self, column: u16, row: u16) -> Offset {
        Offset::new(
            (f64::from(column) + 0.5) * self.cell_width_px,
            (f64::from(row) + 0.5) * self.cell_height_px,
        )
    }
}
