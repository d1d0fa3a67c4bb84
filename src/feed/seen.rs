//! Bounded memory of market ids already surfaced to the user.

use std::collections::HashSet;
use tracing::info;

/// Ids consumed this session, cleared wholesale once it grows past `cap`.
#[derive(Debug, Clone)]
pub struct SeenSet {
    ids: HashSet<String>,
    cap: usize,
}

impl SeenSet {
    pub fn new(cap: usize) -> Self {
        Self {
            ids: HashSet::new(),
            cap,
        }
    }

    /// Record `id`. Returns `true` if the set overflowed and was reset.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into());
        if self.ids.len() > self.cap {
            info!(cap = self.cap, "Resetting seen market ids");
            self.ids.clear();
            return true;
        }
        false
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Borrow the ids as a plain set, e.g. to seed an aggregation.
    pub fn as_set(&self) -> &HashSet<String> {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clears_when_cap_exceeded() {
        let mut seen = SeenSet::new(3);
        assert!(!seen.insert("a"));
        assert!(!seen.insert("b"));
        assert!(!seen.insert("c"));
        assert_eq!(seen.len(), 3);

        assert!(seen.insert("d"));
        assert!(seen.is_empty());
        assert!(!seen.contains("a"));
    }

    #[test]
    fn test_duplicate_insert_does_not_grow() {
        let mut seen = SeenSet::new(2);
        seen.insert("a");
        seen.insert("a");
        seen.insert("b");
        assert_eq!(seen.len(), 2);
    }
}
