//! Configuration settings for betswipe.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix; nested keys are separated by `__`.
pub const ENV_PREFIX: &str = "BETSWIPE";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API configuration.
    pub api: ApiConfig,
    /// Feed pipeline tuning.
    pub feed: FeedConfig,
    /// Gesture thresholds and animation timing.
    pub gesture: GestureConfig,
    /// UI configuration.
    pub ui: UiConfig,
    /// Key bindings.
    pub keybindings: KeyBindings,
    /// Identity handed over by the external provider.
    pub identity: IdentityConfig,
}

impl Config {
    /// Load configuration from file, returning default if file doesn't exist.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from file, then overlay `BETSWIPE__*` environment variables.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(default_path);
        Self::load_from(&config_path)
    }

    fn load_from(config_path: &Path) -> crate::Result<Self> {
        config::Config::builder()
            .add_source(
                config::File::from(config_path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| crate::Error::config(e.to_string()))
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<()> {
        let config_path = path.unwrap_or_else(default_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }
}

fn default_path() -> PathBuf {
    super::config_dir()
        .map(|p| p.join("config.toml"))
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Gamma markets API base URL.
    pub gamma_url: String,
    /// Category preferences backend base URL.
    pub preferences_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Rate limit (requests per second).
    pub rate_limit: u32,
    /// How long a successful topic response stays cached.
    pub cache_ttl_secs: u64,
    /// Records requested per topic query.
    pub topic_fetch_limit: usize,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            gamma_url: "https://gamma-api.polymarket.com".to_string(),
            preferences_url: "http://localhost:5500/api".to_string(),
            timeout_secs: 30,
            rate_limit: 10,
            cache_ttl_secs: 5 * 60,
            topic_fetch_limit: 20,
        }
    }
}

/// Feed queue and aggregation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Markets requested on initialize/refresh.
    pub initial_fetch_count: usize,
    /// Markets requested per background refill.
    pub refetch_count: usize,
    /// Refill once the queue holds this many or fewer.
    pub refetch_threshold: usize,
    /// Seen set is cleared once it grows past this.
    pub max_seen_ids: usize,
    /// Minimum liquidity for a market to be shown.
    pub min_liquidity: f64,
    /// Minimum volume for a market to be shown.
    pub min_volume: f64,
    /// Used when the preferences lookup fails.
    pub default_categories: Vec<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            initial_fetch_count: 25,
            refetch_count: 15,
            refetch_threshold: 6,
            max_seen_ids: 2000,
            min_liquidity: 1000.0,
            min_volume: 5000.0,
            default_categories: vec![
                "crypto".to_string(),
                "politics".to_string(),
                "sports".to_string(),
            ],
        }
    }
}

/// Gesture thresholds and animation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Displacement (px) a release must exceed to commit.
    pub swipe_threshold: f64,
    /// Duration of the swipe-out animation in milliseconds.
    pub swipe_out_ms: u64,
    /// Spring stiffness for the spring-back.
    pub spring_tension: f64,
    /// Spring damping for the spring-back.
    pub spring_friction: f64,
    /// Maximum card tilt in degrees at half a screen width.
    pub max_rotation_deg: f64,
    /// Horizontal pixels represented by one terminal cell.
    pub cell_width_px: f64,
    /// Vertical pixels represented by one terminal cell.
    pub cell_height_px: f64,
}

impl GestureConfig {
    pub fn swipe_out_duration(&self) -> Duration {
        Duration::from_millis(self.swipe_out_ms)
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: 180.0,
            swipe_out_ms: 350,
            spring_tension: 40.0,
            spring_friction: 4.0,
            max_rotation_deg: 10.0,
            cell_width_px: 8.0,
            cell_height_px: 16.0,
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Tick rate in milliseconds; also the animation frame interval.
    pub tick_rate_ms: u64,
    /// Enable mouse support (drag gestures).
    pub mouse_support: bool,
    /// Enable Unicode symbols.
    pub unicode_symbols: bool,
    /// Show help bar.
    pub show_help_bar: bool,
    /// How long decision toasts stay up, in seconds.
    pub toast_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 16,
            mouse_support: true,
            unicode_symbols: true,
            show_help_bar: true,
            toast_secs: 2,
        }
    }
}

/// Key bindings configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Quit the application.
    pub quit: String,
    /// Show help.
    pub help: String,
    /// Commit the top card as YES.
    pub yes: String,
    /// Commit the top card as NO.
    pub no: String,
    /// Skip the top card.
    pub skip: String,
    /// Select/confirm.
    pub select: String,
    /// Cancel/back.
    pub back: String,
    /// Refresh the feed.
    pub refresh: String,
    /// Switch to the feed view.
    pub feed: String,
    /// Switch to the category picker.
    pub categories: String,
    /// Toggle the highlighted category.
    pub toggle: String,
    /// Move up in lists.
    pub up: String,
    /// Move down in lists.
    pub down: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "?".to_string(),
            yes: "l".to_string(),
            no: "h".to_string(),
            skip: "k".to_string(),
            select: "Enter".to_string(),
            back: "Esc".to_string(),
            refresh: "r".to_string(),
            feed: "1".to_string(),
            categories: "c".to_string(),
            toggle: " ".to_string(),
            up: "k".to_string(),
            down: "j".to_string(),
        }
    }
}

/// Opaque identity values supplied by the external identity provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Stable user id; without it the feed reports unauthenticated.
    pub user_id: Option<String>,
    /// Wallet address, passed through but never inspected.
    pub wallet_address: Option<String>,
}
