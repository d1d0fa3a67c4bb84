//! Category picker widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::feed::CATEGORIES;
use crate::state::Store;

/// Checkbox list of every category the feed can draw from.
pub struct CategoryPickerView;

impl CategoryPickerView {
    pub fn render(frame: &mut Frame, area: Rect, store: &Store) {
        let picker = &store.categories;

        let items: Vec<ListItem> = CATEGORIES
            .iter()
            .map(|category| {
                let selected = picker.is_selected(category.id);
                let (mark, style) = if selected {
                    ("[x]", Style::default().fg(Color::Green))
                } else {
                    ("[ ]", Style::default().fg(Color::DarkGray))
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {mark} "), style),
                    Span::raw(format!("{} {}", category.emoji, category.label)),
                ]))
            })
            .collect();

        let count = picker.selection().len();
        let title = if picker.saving {
            " Categories (saving...) ".to_string()
        } else {
            format!(" Categories ({count} selected) ")
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .title(title)
                    .title_bottom(Line::from(Span::styled(
                        " space toggle · enter save · esc back ",
                        Style::default().fg(Color::DarkGray),
                    )))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(Some(picker.cursor));

        frame.render_stateful_widget(list, area, &mut state);
    }
}
