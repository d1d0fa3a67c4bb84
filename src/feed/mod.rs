//! The swipe feed.
//!
//! Categories resolve to upstream topics, the aggregator turns topic
//! queries into a ranked candidate list, and the queue buffers those
//! candidates for the card stack while remembering what has been decided.

mod aggregator;
pub mod categories;
mod queue;
mod seen;
mod session;

pub use aggregator::{FeedAggregator, TopicQuery, plan_queries};
pub use categories::{CATEGORIES, Category};
pub use queue::{ApplyOutcome, FeedQueue, FetchKind, FetchTicket};
pub use seen::SeenSet;
pub use session::{FeedSession, FetchCompletion};
