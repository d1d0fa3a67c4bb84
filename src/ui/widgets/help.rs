//! Help panel widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::super::layout::centered_rect;
use crate::config::KeyBindings;

/// Help panel showing keybindings.
pub struct HelpPanel;

impl HelpPanel {
    /// Render the help panel.
    pub fn render(frame: &mut Frame, area: Rect, keys: &KeyBindings) {
        let popup_area = centered_rect(60, 80, area);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let mut help_text = section("Feed");
        help_text.extend([
            binding(format!("{}/→", keys.yes), "Swipe right: YES"),
            binding(format!("{}/←", keys.no), "Swipe left: NO"),
            binding(format!("{}/↑", keys.skip), "Swipe up: SKIP"),
            binding("drag", "Drag the card with the left mouse button"),
            binding(keys.refresh.clone(), "Refresh the feed"),
            binding(keys.categories.clone(), "Choose categories"),
        ]);
        help_text.push(Line::from(""));

        help_text.extend(section("Categories"));
        help_text.extend([
            binding(format!("{}/↑ {}/↓", keys.up, keys.down), "Move"),
            binding(display_key(&keys.toggle), "Toggle category"),
            binding(keys.select.clone(), "Save and reload"),
            binding(keys.back.clone(), "Back to feed"),
        ]);
        help_text.push(Line::from(""));

        help_text.extend(section("General"));
        help_text.extend([
            binding(keys.help.clone(), "Toggle help"),
            binding(keys.quit.clone(), "Quit"),
        ]);

        let help = Paragraph::new(help_text)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White));

        frame.render_widget(help, popup_area);
    }
}

fn section(title: &'static str) -> Vec<Line<'static>> {
    vec![
        Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
    ]
}

fn binding(key: impl Into<String>, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("  {:<10}", key.into()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(description),
    ])
}

fn display_key(binding: &str) -> String {
    match binding {
        " " => "space".to_string(),
        other => other.to_string(),
    }
}
