//! # betswipe - a swipeable Polymarket feed
//!
//! A terminal card stack of open prediction markets. Each card is a market;
//! swipe right for YES, left for NO, up to skip. The queue refills itself
//! in the background from the categories the user follows.
//!
//! ## Architecture
//!
//! - **API**: gamma markets client, response cache and preferences backend
//! - **Feed**: category aggregation, the card queue and the seen set
//! - **Gesture**: drag tracking and swipe animations
//! - **State**: centralized store and reducer
//! - **Events**: input handling and event processing
//! - **UI**: layout and rendering
//! - **Config**: configuration management

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod feed;
pub mod gesture;
pub mod state;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use error::{Error, FeedError, Result};
pub use feed::FeedSession;
pub use gesture::{Direction, GestureEngine, SwipeOutcome};
pub use state::Market;
