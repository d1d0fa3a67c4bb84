//! Market-related state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Composite quality score used to rank candidates: `liquidity × log10(volume + 1)`.
pub fn quality_score(liquidity: f64, volume: f64) -> f64 {
    liquidity * (volume + 1.0).log10()
}

/// A normalized prediction market, shown as one card.
///
/// Built once by the normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Upstream market id.
    pub id: String,
    /// Market question/title.
    pub question: String,
    /// Market description.
    pub description: String,
    /// Category label the market was fetched under.
    pub category: String,
    /// YES share, 0-100.
    pub yes_share: u8,
    /// NO share, 0-100.
    pub no_share: u8,
    /// Unrounded YES price in percent.
    pub yes_price: f64,
    /// Unrounded NO price in percent.
    pub no_price: f64,
    /// Total volume traded.
    pub volume: f64,
    /// Abbreviated volume, e.g. `$1.2M`.
    pub volume_display: String,
    /// Total liquidity.
    pub liquidity: f64,
    /// Abbreviated liquidity.
    pub liquidity_display: String,
    /// Market image URL.
    pub image_url: String,
    pub slug: Option<String>,
    /// Needed to place an order against this market.
    pub condition_id: Option<String>,
    /// End date/time.
    pub end_date: Option<DateTime<Utc>>,
    pub spread: Option<f64>,
    pub last_trade_price: Option<f64>,
}

impl Market {
    pub fn score(&self) -> f64 {
        quality_score(self.liquidity, self.volume)
    }
}

#[cfg(test)]
impl Market {
    /// A plausible card for tests.
    pub(crate) fn sample(id: &str) -> Self {
        Self {
            id: id.to_string(),
            question: format!("Will {id} happen?"),
            description: String::new(),
            category: "Crypto".to_string(),
            yes_share: 60,
            no_share: 40,
            yes_price: 60.0,
            no_price: 40.0,
            volume: 10_000.0,
            volume_display: "$10K".to_string(),
            liquidity: 2_000.0,
            liquidity_display: "$2K".to_string(),
            image_url: "https://via.placeholder.com/400x200".to_string(),
            slug: None,
            condition_id: None,
            end_date: None,
            spread: None,
            last_trade_price: None,
        }
    }
}

/// Running tally of decisions made in this session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwipeTally {
    pub yes: usize,
    pub no: usize,
    pub skipped: usize,
}

impl SwipeTally {
    pub fn total(&self) -> usize {
        self.yes + self.no + self.skipped
    }
}
