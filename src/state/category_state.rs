//! Category picker state.

use crate::feed::CATEGORIES;
use std::collections::HashSet;

/// Selection being edited in the categories view.
#[derive(Debug, Clone, Default)]
pub struct CategoryPicker {
    selected: HashSet<&'static str>,
    /// Index into the category table.
    pub cursor: usize,
    /// A save request is in flight.
    pub saving: bool,
}

impl CategoryPicker {
    /// Reset the picker to the categories the feed is currently using.
    pub fn load<S: AsRef<str>>(&mut self, current: &[S]) {
        self.selected = CATEGORIES
            .iter()
            .filter(|c| current.iter().any(|id| id.as_ref() == c.id))
            .map(|c| c.id)
            .collect();
        self.cursor = 0;
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let max = CATEGORIES.len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(max);
    }

    /// Flip the category under the cursor.
    pub fn toggle(&mut self) {
        let Some(category) = CATEGORIES.get(self.cursor) else {
            return;
        };
        if !self.selected.remove(category.id) {
            self.selected.insert(category.id);
        }
    }

    /// Selected ids in table order.
    pub fn selection(&self) -> Vec<String> {
        CATEGORIES
            .iter()
            .filter(|c| self.selected.contains(c.id))
            .map(|c| c.id.to_string())
            .collect()
    }
}
