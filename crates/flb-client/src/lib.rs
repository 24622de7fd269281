//! Storage node API client for the Feed Latency Bench.
//!
//! The storage network itself — content addressing, chunk replication,
//! postage accounting — is an external collaborator. This crate only
//! consumes its HTTP surface: feed manifest creation, feed publish and
//! lookup, and sync-tag status. [`MemoryNode`] emulates that surface
//! in-process for tests and dry runs.

pub mod api;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod memory;

pub use api::{PublishReceipt, StorageNode, TagStatus};
pub use error::{ClientError, ClientResult};
pub use http::HttpNode;
pub use memory::MemoryNode;
