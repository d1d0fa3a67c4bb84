//! Upstream integrations.
//!
//! This module talks to the gamma markets API (read-only, rate limited and
//! cached) and to the category preferences backend, and converts raw
//! records into [`Market`](crate::state::Market) cards.

mod cache;
mod client;
mod converter;
mod fetcher;
mod preferences;
mod types;

pub use cache::{CacheKey, ResponseCache};
pub use client::{GammaClient, GammaClientBuilder, MarketSource};
pub use converter::{MarketNormalizer, PLACEHOLDER_IMAGE_URL};
pub use fetcher::MarketFetchClient;
pub use preferences::{PreferencesClient, PreferencesStore};
pub use types::{ApiResponse, RawMarket, SaveCategoriesRequest, UserCategoryData};

#[cfg(test)]
pub(crate) use client::MockMarketSource;
#[cfg(test)]
pub(crate) use preferences::MockPreferencesStore;
