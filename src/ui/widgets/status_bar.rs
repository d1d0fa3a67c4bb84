//! Status bar widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use chrono::{DateTime, Local, Utc};

use crate::state::Store;

/// Status bar widget.
pub struct StatusBar;

impl StatusBar {
    /// Render the status bar.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let tally = store.tally;

        let loading = if store.is_loading() {
            Span::styled(
                " Loading... ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Span::raw("")
        };

        let help_hint = Span::styled(" Press ? for help ", Style::default().fg(Color::Gray));

        let left_content = vec![
            Span::styled(
                " 🃏 betswipe ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::raw(format!("{} swiped", tally.total())),
            Span::raw(" | "),
            Span::styled(format!("YES {}", tally.yes), Style::default().fg(Color::Green)),
            Span::raw(" "),
            Span::styled(format!("NO {}", tally.no), Style::default().fg(Color::Red)),
            Span::raw(" "),
            Span::styled(
                format!("SKIP {}", tally.skipped),
                Style::default().fg(Color::Blue),
            ),
            Span::raw(" | "),
            Span::raw(format!("{} queued", store.feed.queue().len())),
            Span::styled(
                updated_label(store.feed.queue().last_updated()),
                Style::default().fg(Color::Gray),
            ),
            loading,
        ];

        let status_line = Line::from(left_content);

        // Pad so the help hint sits on the right edge
        let left_len = status_line.width();
        let right_len = help_hint.width();
        let padding = usize::from(area.width).saturating_sub(left_len + right_len);

        let mut full_line = status_line.spans;
        full_line.push(Span::raw(" ".repeat(padding)));
        full_line.push(help_hint);

        let paragraph =
            Paragraph::new(Line::from(full_line)).style(Style::default().bg(Color::DarkGray));

        frame.render_widget(paragraph, area);
    }
}

/// When the queue last took in markets, in local time.
fn updated_label(last_updated: Option<DateTime<Utc>>) -> String {
    last_updated
        .map(|at| format!(" · updated {}", at.with_timezone(&Local).format("%H:%M")))
        .unwrap_or_default()
}
