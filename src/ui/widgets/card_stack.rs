//! The swipeable card stack.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use std::time::Instant;

use crate::error::{FeedError, Recovery};
use crate::feed::categories;
use crate::gesture::GestureSnapshot;
use crate::state::{Market, Store};

const CARD_MAX_WIDTH: u16 = 64;
const CARD_MAX_HEIGHT: u16 = 22;

/// Card stack widget: the top card follows the gesture, the next one peeks behind.
pub struct CardStack;

impl CardStack {
    /// Render the stack, or the empty/loading/error state when there is no card.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store, now: Instant) {
        let queue = store.feed.queue();
        let Some(top) = queue.head() else {
            render_empty(frame, area, store);
            return;
        };

        let snapshot = store.gesture.poll_state(now);
        let base = card_rect(area);

        if let Some(next) = queue.markets().get(1) {
            let peek = scaled(base, snapshot.next_card_scale);
            let peek = Rect {
                y: peek.y.saturating_add(1).min(area.bottom().saturating_sub(peek.height)),
                ..peek
            };
            render_card(frame, peek, next, None);
        }

        // Pixels to cells: the viewport spans the whole terminal.
        let viewport = store.gesture.viewport();
        let screen = frame.area();
        let dx = snapshot.offset.x * f64::from(screen.width) / viewport.width.max(1.0);
        let dy = snapshot.offset.y * f64::from(screen.height) / viewport.height.max(1.0);

        if let Some(rect) = shift_within(base, dx.round() as i32, dy.round() as i32, area) {
            render_card(frame, rect, top, Some(&snapshot));
        }
    }

    /// Resting position of the top card inside `area`.
    pub fn card_area(area: Rect) -> Rect {
        card_rect(area)
    }
}

/// Largest card that fits, centred in `area`.
fn card_rect(area: Rect) -> Rect {
    let width = area.width.saturating_sub(4).min(CARD_MAX_WIDTH);
    let height = area.height.saturating_sub(2).min(CARD_MAX_HEIGHT);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn scaled(rect: Rect, scale: f64) -> Rect {
    let width = (f64::from(rect.width) * scale).round() as u16;
    let height = (f64::from(rect.height) * scale).round() as u16;
    Rect {
        x: rect.x + (rect.width - width.min(rect.width)) / 2,
        y: rect.y + (rect.height - height.min(rect.height)) / 2,
        width: width.min(rect.width),
        height: height.min(rect.height),
    }
}

/// Move `rect` by whole cells and clip it to `bounds`; `None` once fully off-screen.
fn shift_within(rect: Rect, dx: i32, dy: i32, bounds: Rect) -> Option<Rect> {
    let left = (i32::from(rect.x) + dx).max(i32::from(bounds.x));
    let top = (i32::from(rect.y) + dy).max(i32::from(bounds.y));
    let right = (i32::from(rect.right()) + dx).min(i32::from(bounds.right()));
    let bottom = (i32::from(rect.bottom()) + dy).min(i32::from(bounds.bottom()));

    if right - left < 3 || bottom - top < 3 {
        return None;
    }
    Some(Rect {
        x: left as u16,
        y: top as u16,
        width: (right - left) as u16,
        height: (bottom - top) as u16,
    })
}

fn render_card(frame: &mut Frame, area: Rect, market: &Market, gesture: Option<&GestureSnapshot>) {
    frame.render_widget(Clear, area);

    let is_top = gesture.is_some();
    let border_style = if is_top {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let emoji = categories::CATEGORIES
        .iter()
        .find(|c| c.label == market.category)
        .map(|c| c.emoji)
        .unwrap_or("•");

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title(Span::styled(
            format!(" {} {} ", emoji, market.category),
            Style::default().fg(Color::Yellow),
        ));

    if let Some(snapshot) = gesture {
        if snapshot.rotation_deg.abs() >= 1.0 {
            block = block.title_bottom(
                Line::from(format!(" {:+.0}° ", snapshot.rotation_deg)).alignment(Alignment::Right),
            );
        }
        if let Some(label) = overlay_label(snapshot) {
            block = block.title(label.alignment(Alignment::Right));
        }
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if !is_top {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Question + description
            Constraint::Length(2), // YES bar
            Constraint::Length(2), // NO bar
            Constraint::Length(1), // Stats
        ])
        .split(inner);

    let mut text = vec![
        Line::from(Span::styled(
            market.question.as_str(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if !market.description.is_empty() {
        text.push(Line::from(Span::styled(
            market.description.as_str(),
            Style::default().fg(Color::Gray),
        )));
    }
    frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), rows[0]);

    render_share(frame, rows[1], "YES", market.yes_share, Color::Green);
    render_share(frame, rows[2], "NO ", market.no_share, Color::Red);

    let mut stats = vec![
        Span::styled("Vol ", Style::default().fg(Color::DarkGray)),
        Span::raw(market.volume_display.as_str()),
        Span::raw("  "),
        Span::styled("Liq ", Style::default().fg(Color::DarkGray)),
        Span::raw(market.liquidity_display.as_str()),
    ];
    if let Some(end) = market.end_date {
        stats.push(Span::raw("  "));
        stats.push(Span::styled("Ends ", Style::default().fg(Color::DarkGray)));
        stats.push(Span::raw(end.format("%b %d, %Y").to_string()));
    }
    frame.render_widget(Paragraph::new(Line::from(stats)), rows[3]);
}

/// `YES 62% ████████░░░░`
fn render_share(frame: &mut Frame, area: Rect, label: &str, share: u8, color: Color) {
    let prefix = format!("{label} {share:>3}% ");
    let bar_width = usize::from(area.width).saturating_sub(prefix.chars().count());
    let filled = bar_width * usize::from(share) / 100;

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled("█".repeat(filled), Style::default().fg(color)),
        Span::styled(
            "░".repeat(bar_width - filled),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// The strongest decision label the drag is currently showing.
fn overlay_label(snapshot: &GestureSnapshot) -> Option<Line<'static>> {
    let (text, opacity, color) = [
        (" YES ", snapshot.yes_opacity, Color::Green),
        (" NO ", snapshot.no_opacity, Color::Red),
        (" SKIP ", snapshot.skip_opacity, Color::Blue),
    ]
    .into_iter()
    .max_by(|a, b| a.1.total_cmp(&b.1))?;

    if opacity <= 0.0 {
        return None;
    }

    let mut style = Style::default().fg(Color::Black).bg(color);
    style = if opacity >= 1.0 {
        style.add_modifier(Modifier::BOLD)
    } else {
        style.add_modifier(Modifier::DIM)
    };
    Some(Line::from(Span::styled(text, style)))
}

fn render_empty(frame: &mut Frame, area: Rect, store: &Store) {
    let queue = store.feed.queue();

    let lines = if let Some(error) = queue.error() {
        error_lines(error)
    } else if store.is_loading() {
        vec![Line::from(Span::styled(
            "Loading markets...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ))]
    } else {
        vec![
            Line::from(Span::styled(
                "No more markets!",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press r to refresh",
                Style::default().fg(Color::DarkGray),
            )),
        ]
    };

    let height = lines.len() as u16 + 2;
    let message_area = Rect {
        y: area.y + area.height.saturating_sub(height) / 2,
        height: height.min(area.height),
        ..area
    };
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        message_area,
    );
}

fn error_lines(error: &FeedError) -> Vec<Line<'static>> {
    let hint = match error.recovery() {
        Recovery::Retry => "Press r to try again",
        Recovery::Relogin => "Set identity.user_id in your config and restart",
    };
    vec![
        Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ]
}
