use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use flb_crypto::SignedUpdate;
use flb_types::{ChunkRef, FeedUpdate, OwnerId, Stamp, Topic};

use crate::error::ClientResult;

/// What a node returns for a committed publish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// Content address of the committed update.
    pub reference: ChunkRef,
    /// Node-assigned sync tag tracking replication of the pushed chunks,
    /// if the node issues tags.
    pub tag: Option<u64>,
}

/// Replication progress of a sync tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStatus {
    /// Chunks confirmed replicated so far.
    pub synced: u64,
    /// Chunks the tag is waiting on in total.
    pub total: u64,
}

impl TagStatus {
    /// Whether replication has completed.
    pub fn is_synced(&self) -> bool {
        self.synced >= self.total
    }
}

/// Interface to one storage node's feed API.
///
/// Implementations: [`HttpNode`](crate::HttpNode) for real nodes,
/// [`MemoryNode`](crate::MemoryNode) for in-process emulation.
#[async_trait]
pub trait StorageNode: Send + Sync {
    /// Create the durable, content-addressed feed manifest that lets third
    /// parties resolve the feed by address. Idempotent at the node.
    async fn create_manifest(
        &self,
        stamp: &Stamp,
        owner: &OwnerId,
        topic: &Topic,
    ) -> ClientResult<ChunkRef>;

    /// Submit a signed update.
    ///
    /// Fails with [`ClientError::Conflict`](crate::ClientError::Conflict)
    /// when the exact (index, payload) is already committed.
    async fn publish(
        &self,
        stamp: &Stamp,
        topic: &Topic,
        update: &SignedUpdate,
    ) -> ClientResult<PublishReceipt>;

    /// The highest-index update this node currently knows for the feed.
    ///
    /// Fails with [`ClientError::NotFound`](crate::ClientError::NotFound)
    /// when the node has no data for the feed yet.
    async fn lookup(&self, owner: &OwnerId, topic: &Topic) -> ClientResult<FeedUpdate>;

    /// Replication progress of a previously issued sync tag.
    async fn tag_status(&self, tag: u64) -> ClientResult<TagStatus>;

    /// Human-readable node identifier for logs and reports.
    fn label(&self) -> &str;
}
