//! Toasts and error popups.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::state::{Notification, NotificationLevel};

/// Render a toast, coloured by level.
pub fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
    let (color, icon) = match notification.level {
        NotificationLevel::Info => (Color::Cyan, "ℹ"),
        NotificationLevel::Success => (Color::Green, "✓"),
        NotificationLevel::Warning => (Color::Yellow, "⚠"),
        NotificationLevel::Error => (Color::Red, "✗"),
    };
    let line = Line::from(vec![
        Span::styled(format!("{icon} "), Style::default().fg(color)),
        Span::raw(notification.message.as_str()),
    ]);
    render_popup(frame, area, line, color, BorderType::Rounded);
}

/// Render a persistent error in the toast slot.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let line = Line::from(vec![
        Span::styled(
            "✗ Error: ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(error),
    ]);
    render_popup(frame, area, line, Color::Red, BorderType::Plain);
}

fn render_popup(frame: &mut Frame, area: Rect, line: Line<'_>, color: Color, border: BorderType) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border)
        .border_style(Style::default().fg(color));
    let popup = Paragraph::new(line)
        .wrap(Wrap { trim: true })
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}
