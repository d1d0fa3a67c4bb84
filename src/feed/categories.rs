//! Static category → upstream topic table.

/// A user-facing category backed by several upstream tag ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub label: &'static str,
    pub emoji: &'static str,
    pub tag_ids: &'static [u64],
}

/// Every category the feed can draw from.
pub const CATEGORIES: &[Category] = &[
    Category {
        id: "politics",
        label: "Politics",
        emoji: "🏛️",
        tag_ids: &[2, 339, 100575, 170, 126],
    },
    Category {
        id: "crypto",
        label: "Crypto",
        emoji: "🪙",
        tag_ids: &[21, 235, 39, 818, 620, 157],
    },
    Category {
        id: "sports",
        label: "Sports",
        emoji: "⚽",
        tag_ids: &[745, 450, 517, 10, 100350],
    },
    Category {
        id: "economy",
        label: "Economy",
        emoji: "📈",
        tag_ids: &[702, 604, 120],
    },
    Category {
        id: "geopolitics",
        label: "Geopolitics",
        emoji: "🎯",
        tag_ids: &[95, 303, 180, 96],
    },
    Category {
        id: "global",
        label: "Global",
        emoji: "🌍",
        tag_ids: &[101970, 102419, 100783],
    },
    Category {
        id: "tech",
        label: "Tech",
        emoji: "💻",
        tag_ids: &[1401, 439, 1097, 663, 728],
    },
    Category {
        id: "weather",
        label: "Weather",
        emoji: "🌤️",
        tag_ids: &[84, 87],
    },
    Category {
        id: "culture",
        label: "Culture",
        emoji: "🎭",
        tag_ids: &[315, 53, 100338, 1535],
    },
    Category {
        id: "news",
        label: "News",
        emoji: "📰",
        tag_ids: &[198],
    },
];

/// Look up a category by id.
pub fn find(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// Resolve ids to categories, silently dropping unknown ones.
pub fn resolve<S: AsRef<str>>(ids: &[S]) -> Vec<&'static Category> {
    ids.iter().filter_map(|id| find(id.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_resolve_drops_unknown() {
        let resolved = resolve(&["crypto", "astrology", "sports"]);
        let labels: Vec<_> = resolved.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Crypto", "Sports"]);
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = CATEGORIES.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), CATEGORIES.len());
        assert!(CATEGORIES.iter().all(|c| !c.tag_ids.is_empty()));
    }
}
