//! Foundation types for the Feed Latency Bench (FLB).
//!
//! This crate provides the value types shared by every other FLB crate.
//! All of them are plain process-local values with no shared mutable state.
//!
//! # Key Types
//!
//! - [`Topic`] — Fixed-length opaque tag distinguishing feeds of one owner
//! - [`OwnerId`] — Feed owner identity derived from an ed25519 public key
//! - [`FeedAddress`] — Where a feed's updates are looked up: hash(owner, topic)
//! - [`FeedIndex`] — Monotonically increasing update sequence number
//! - [`ChunkRef`] — Content address the current update points to
//! - [`Stamp`] — Opaque credential authorizing publishes

pub mod address;
pub mod chunk;
pub mod error;
pub mod index;
pub mod owner;
pub mod stamp;
pub mod topic;
pub mod update;

pub use address::FeedAddress;
pub use chunk::ChunkRef;
pub use error::TypeError;
pub use index::FeedIndex;
pub use owner::OwnerId;
pub use stamp::Stamp;
pub use topic::Topic;
pub use update::FeedUpdate;
