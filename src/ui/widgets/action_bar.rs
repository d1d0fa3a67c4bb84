//! Decision buttons under the card stack.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::gesture::{Direction, GesturePhase};
use crate::state::Store;

/// `← NO   ↑ SKIP   YES →`, highlighting the direction being committed.
pub struct ActionBar;

impl ActionBar {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let committing = match store.gesture.phase() {
            GesturePhase::Committing(direction) => Some(direction),
            _ => None,
        };
        let enabled = store.feed.head().is_some();

        let button = |text: &'static str, direction: Direction, color: Color| {
            let style = if !enabled {
                Style::default().fg(Color::DarkGray)
            } else if committing == Some(direction) {
                Style::default()
                    .fg(Color::Black)
                    .bg(color)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            };
            Span::styled(text, style)
        };

        let line = Line::from(vec![
            button(" ← NO ", Direction::Left, Color::Red),
            Span::raw("     "),
            button(" ↑ SKIP ", Direction::Up, Color::Blue),
            Span::raw("     "),
            button(" YES → ", Direction::Right, Color::Green),
        ]);

        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }
}
