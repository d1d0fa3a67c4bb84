//! View switcher shown under the status bar.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::{Store, View};

/// Tab bar widget.
pub struct TabBar;

impl TabBar {
    /// Render one tab per view, each with its key and a count.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let keys = &store.keybindings;
        let queue = store.feed.queue();
        let tabs = [
            (&keys.feed, View::Feed, format!("Feed ({})", queue.len())),
            (
                &keys.categories,
                View::Categories,
                format!("Categories ({})", queue.categories().len()),
            ),
        ];

        let spans = tabs.into_iter().flat_map(|(key, view, label)| {
            let label_style = if store.app.current_view == view {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::White)
            };
            [
                Span::styled(format!(" [{key}] "), Style::default().fg(Color::DarkGray)),
                Span::styled(label, label_style),
                Span::raw(" "),
            ]
        });

        frame.render_widget(Paragraph::new(Line::from(spans.collect::<Vec<_>>())), area);
    }
}
