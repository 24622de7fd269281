use std::sync::Arc;

use flb_client::{ClientError, StorageNode};
use flb_types::{FeedAddress, FeedUpdate, OwnerId, Topic};

use crate::error::{FeedError, FeedResult};

/// Resolves the current (highest-index) update for a feed from one node.
///
/// Pure lookup: no mutation, no retry. The convergence verifier owns the
/// polling cadence.
pub struct FeedReader {
    node: Arc<dyn StorageNode>,
    owner: OwnerId,
    topic: Topic,
    address: FeedAddress,
}

impl FeedReader {
    pub fn new(node: Arc<dyn StorageNode>, owner: OwnerId, topic: Topic) -> Self {
        let address = FeedAddress::derive(&owner, &topic);
        Self {
            node,
            owner,
            topic,
            address,
        }
    }

    /// The highest index this node has observed plus its payload reference.
    ///
    /// Maps a node-side miss to [`FeedError::NotFound`]; everything else
    /// propagates unchanged.
    pub async fn download(&self) -> FeedResult<FeedUpdate> {
        match self.node.lookup(&self.owner, &self.topic).await {
            Ok(update) => Ok(update),
            Err(ClientError::NotFound) => Err(FeedError::NotFound),
            Err(other) => Err(other.into()),
        }
    }

    /// Human-readable identifier of the backing node.
    pub fn node_label(&self) -> &str {
        self.node.label()
    }

    pub fn address(&self) -> &FeedAddress {
        &self.address
    }
}
