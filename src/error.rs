//! Error types for the betswipe application.

use thiserror::Error;

/// The main error type for betswipe.
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A single upstream topic query failed inside an aggregation.
    #[error("Topic {topic_id} fetch failed: {reason}")]
    TopicFetchFailed {
        topic_id: u64,
        reason: String,
        /// Whether the underlying failure was transient.
        recoverable: bool,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Channel communication errors
    #[error("Channel error: {0}")]
    Channel(String),

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limiting errors
    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u64),

    /// Generic application error
    #[error("{0}")]
    Application(String),
}

/// Alias for Result with our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new API status error.
    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: msg.into(),
        }
    }

    /// Wrap the failure of one topic query.
    pub fn topic_fetch(topic_id: u64, cause: Error) -> Self {
        Self::TopicFetchFailed {
            topic_id,
            reason: cause.to_string(),
            recoverable: cause.is_recoverable(),
        }
    }

    /// Create a new config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new channel error.
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Create a new network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new application error.
    pub fn application(msg: impl Into<String>) -> Self {
        Self::Application(msg.into())
    }

    /// Check if this error is recoverable (user can retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_)
            | Self::RateLimited(_)
            | Self::Channel(_)
            | Self::Http(_) => true,
            Self::TopicFetchFailed { recoverable, .. } => *recoverable,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// What the user has to do to get out of a feed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Refresh the feed.
    Retry,
    /// Go back through the identity provider.
    Relogin,
}

/// Feed-level failures, each with its own recovery path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// No user id is available, so categories cannot be resolved.
    #[error("User not authenticated")]
    Unauthenticated,

    /// Aggregation finished but nothing survived filtering.
    #[error("No markets available. Try different categories.")]
    NoMarketsAvailable,

    /// The fetch itself blew up.
    #[error("Failed to load markets: {0}")]
    FetchFailed(String),
}

impl FeedError {
    /// The recovery action the UI should offer.
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Unauthenticated => Recovery::Relogin,
            Self::NoMarketsAvailable | Self::FetchFailed(_) => Recovery::Retry,
        }
    }
}
