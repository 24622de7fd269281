//! Feed writer and reader for the Feed Latency Bench.
//!
//! A [`FeedWriter`] publishes successive signed updates to one storage
//! node, tolerating duplicate-publish conflicts. A [`FeedReader`] resolves
//! the current (highest-index) update a node knows for a feed. Polling
//! cadence and convergence scoring live one layer up, in `flb-bench`.

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{FeedError, FeedResult};
pub use reader::FeedReader;
pub use writer::{CommittedUpdate, FeedWriter};
