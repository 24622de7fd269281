use std::sync::Arc;

use tracing::{debug, warn};

use flb_client::{ClientError, StorageNode};
use flb_crypto::{SignedUpdate, SigningKey};
use flb_types::{ChunkRef, FeedAddress, FeedIndex, OwnerId, Stamp, Topic};

use crate::error::FeedResult;

/// Outcome of one publish: the committed reference plus the node's sync
/// tag, when the publish actually uploaded new chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommittedUpdate {
    pub index: FeedIndex,
    pub reference: ChunkRef,
    /// `None` when the node issued no tag, including (but not only) the
    /// conflict case: nothing new was uploaded, so there is no replication
    /// to wait for.
    pub tag: Option<u64>,
    /// Whether the node resolved the publish as an existing commit. A
    /// tagless successful publish is not a conflict.
    pub conflict: bool,
}

/// Publishes successive signed updates for one feed to one storage node.
///
/// The internal index counter starts at 0 and advances by exactly 1 per
/// successful publish, including publishes resolved as conflicts. Writers
/// for the same feed on different nodes stay in lockstep only because the
/// caller drives them with the same round; the writer does not enforce
/// cross-instance agreement.
pub struct FeedWriter {
    node: Arc<dyn StorageNode>,
    key: Arc<SigningKey>,
    stamp: Stamp,
    topic: Topic,
    address: FeedAddress,
    next_index: FeedIndex,
}

impl FeedWriter {
    pub fn new(node: Arc<dyn StorageNode>, key: Arc<SigningKey>, stamp: Stamp, topic: Topic) -> Self {
        let address = FeedAddress::derive(&key.owner_id(), &topic);
        Self {
            node,
            key,
            stamp,
            topic,
            address,
            next_index: FeedIndex::ZERO,
        }
    }

    /// Create the feed's durable manifest. Called once per session;
    /// idempotent at the node.
    pub async fn create_manifest(&self) -> FeedResult<ChunkRef> {
        let reference = self
            .node
            .create_manifest(&self.stamp, &self.owner(), &self.topic)
            .await?;
        debug!(node = self.node.label(), manifest = %reference, "feed manifest ready");
        Ok(reference)
    }

    /// Sign and submit a new update at the writer's next index.
    ///
    /// A node-side conflict (the exact index/payload already committed,
    /// e.g. after a retried partial failure) counts as success: the
    /// already-committed reference is returned and the counter advances
    /// once — never twice.
    pub async fn publish(&mut self, payload: ChunkRef) -> FeedResult<CommittedUpdate> {
        let index = self.next_index;
        let update = SignedUpdate::sign(&self.key, &self.address, index, payload);

        let committed = match self.node.publish(&self.stamp, &self.topic, &update).await {
            Ok(receipt) => CommittedUpdate {
                index,
                reference: receipt.reference,
                tag: receipt.tag,
                conflict: false,
            },
            Err(ClientError::Conflict) => {
                warn!(
                    node = self.node.label(),
                    index = index.value(),
                    "update already committed, treating as success"
                );
                CommittedUpdate {
                    index,
                    reference: self.committed_reference(index, payload).await,
                    tag: None,
                    conflict: true,
                }
            }
            Err(other) => return Err(other.into()),
        };

        self.next_index = index.next();
        Ok(committed)
    }

    /// Resolve the reference a conflicting publish already committed. The
    /// conflict contract guarantees it equals the attempted payload; the
    /// lookup keeps the return value honest when the node disagrees.
    async fn committed_reference(&self, index: FeedIndex, attempted: ChunkRef) -> ChunkRef {
        match self.node.lookup(&self.owner(), &self.topic).await {
            Ok(latest) if latest.index == index => latest.payload,
            _ => attempted,
        }
    }

    pub fn owner(&self) -> OwnerId {
        self.key.owner_id()
    }

    /// The storage node this writer publishes to.
    pub fn node(&self) -> &Arc<dyn StorageNode> {
        &self.node
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn address(&self) -> &FeedAddress {
        &self.address
    }

    /// The index the next publish will use.
    pub fn next_index(&self) -> FeedIndex {
        self.next_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flb_client::MemoryNode;
    use flb_types::FeedUpdate;

    fn writer_on(node: Arc<MemoryNode>, key: Arc<SigningKey>) -> FeedWriter {
        FeedWriter::new(node, key, Stamp::new("stamp"), Topic::zero())
    }

    #[tokio::test]
    async fn publish_advances_index_by_one() {
        let node = Arc::new(MemoryNode::new("mem"));
        let key = Arc::new(SigningKey::generate());
        let mut writer = writer_on(node, key);

        let mut payload = ChunkRef::zero();
        for round in 0..3u64 {
            payload.increment();
            let committed = writer.publish(payload).await.unwrap();
            assert_eq!(committed.index.value(), round);
            assert_eq!(committed.reference, payload);
            assert!(!committed.conflict);
            assert_eq!(writer.next_index().value(), round + 1);
        }
    }

    #[tokio::test]
    async fn conflict_is_success_and_increments_once() {
        let node = Arc::new(MemoryNode::new("mem"));
        let key = Arc::new(SigningKey::generate());
        let payload = ChunkRef::zero().incremented();

        // A previous writer instance already committed index 0 (the
        // retry-after-partial-failure scenario).
        let mut earlier = writer_on(Arc::clone(&node), Arc::clone(&key));
        earlier.publish(payload).await.unwrap();

        let mut writer = writer_on(Arc::clone(&node), Arc::clone(&key));
        let committed = writer.publish(payload).await.unwrap();
        assert_eq!(committed.index, FeedIndex::ZERO);
        assert_eq!(committed.reference, payload);
        assert_eq!(committed.tag, None);
        assert!(committed.conflict);
        assert_eq!(writer.next_index().value(), 1);
        assert_eq!(node.committed(&writer.owner(), writer.topic()), 1);

        // The writer continues past the conflict without a gap.
        let committed = writer.publish(payload.incremented()).await.unwrap();
        assert_eq!(committed.index.value(), 1);
        assert_eq!(node.committed(&writer.owner(), writer.topic()), 2);
    }

    #[tokio::test]
    async fn hard_failure_does_not_advance_index() {
        let node = Arc::new(MemoryNode::new("mem"));
        let key = Arc::new(SigningKey::generate());
        let payload = ChunkRef::zero().incremented();

        let mut earlier = writer_on(Arc::clone(&node), Arc::clone(&key));
        earlier.publish(payload).await.unwrap();

        // Same index, different payload: not the conflict class, so the
        // publish is a hard failure.
        let mut writer = writer_on(node, key);
        let err = writer.publish(payload.incremented()).await.unwrap_err();
        assert!(matches!(
            err,
            crate::FeedError::Client(ClientError::Node { .. })
        ));
        assert_eq!(writer.next_index(), FeedIndex::ZERO);
    }

    #[tokio::test]
    async fn manifest_creation_is_idempotent() {
        let node = Arc::new(MemoryNode::new("mem"));
        let key = Arc::new(SigningKey::generate());
        let writer = writer_on(node, key);
        let m1 = writer.create_manifest().await.unwrap();
        let m2 = writer.create_manifest().await.unwrap();
        assert_eq!(m1, m2);
    }

    #[tokio::test]
    async fn published_update_is_readable() {
        let node = Arc::new(MemoryNode::new("mem"));
        let key = Arc::new(SigningKey::generate());
        let mut writer = writer_on(Arc::clone(&node), key);
        let payload = ChunkRef::zero().incremented();
        writer.publish(payload).await.unwrap();

        let latest = node.lookup(&writer.owner(), writer.topic()).await.unwrap();
        assert_eq!(latest, FeedUpdate::new(FeedIndex::ZERO, payload));
    }
}
