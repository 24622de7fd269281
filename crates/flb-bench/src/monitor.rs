use std::time::Duration;

use tracing::debug;

use flb_client::StorageNode;

use crate::error::{BenchError, BenchResult};

/// Bounded poll of a sync tag: the coarse signal that previously uploaded
/// chunks have finished replicating across the network.
///
/// This is the one place in the benchmark with an explicit retry ceiling;
/// exhausting it is fatal to the run.
#[derive(Clone, Copy, Debug)]
pub struct SyncMonitor {
    trials: u32,
    interval: Duration,
}

impl SyncMonitor {
    pub fn new(trials: u32, interval: Duration) -> Self {
        Self { trials, interval }
    }

    /// Poll `tag` on `node` until it reports fully synced.
    ///
    /// Returns the number of trials used. Fails with
    /// [`BenchError::SyncTagTimeout`] once the budget is spent.
    pub async fn wait_synced(&self, node: &dyn StorageNode, tag: u64) -> BenchResult<u32> {
        for trial in 1..=self.trials {
            let status = node.tag_status(tag).await?;
            if status.is_synced() {
                return Ok(trial);
            }
            debug!(
                node = node.label(),
                tag,
                trial,
                synced = status.synced,
                total = status.total,
                "replication incomplete"
            );
            if trial < self.trials {
                tokio::time::sleep(self.interval).await;
            }
        }
        Err(BenchError::SyncTagTimeout {
            tag,
            trials: self.trials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flb_client::MemoryNode;
    use flb_crypto::{SignedUpdate, SigningKey};
    use flb_types::{ChunkRef, FeedAddress, FeedIndex, Stamp, Topic};

    async fn publish_with_tag(node: &MemoryNode) -> u64 {
        let key = SigningKey::generate();
        let topic = Topic::zero();
        let address = FeedAddress::derive(&key.owner_id(), &topic);
        let update = SignedUpdate::sign(&key, &address, FeedIndex::ZERO, ChunkRef::zero());
        node.publish(&Stamp::new("s"), &topic, &update)
            .await
            .unwrap()
            .tag
            .unwrap()
    }

    #[tokio::test]
    async fn immediate_sync_uses_one_trial() {
        let node = MemoryNode::new("mem");
        let tag = publish_with_tag(&node).await;
        let monitor = SyncMonitor::new(5, Duration::from_millis(1));
        assert_eq!(monitor.wait_synced(&node, tag).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delayed_sync_within_budget_succeeds() {
        let node = MemoryNode::with_lag("mem", 0, 2);
        let tag = publish_with_tag(&node).await;
        let monitor = SyncMonitor::new(5, Duration::from_millis(1));
        assert_eq!(monitor.wait_synced(&node, tag).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn budget_exhaustion_is_fatal_timeout() {
        let node = MemoryNode::with_lag("mem", 0, 10);
        let tag = publish_with_tag(&node).await;
        let monitor = SyncMonitor::new(3, Duration::from_millis(1));
        let err = monitor.wait_synced(&node, tag).await.unwrap_err();
        assert!(matches!(err, BenchError::SyncTagTimeout { trials: 3, .. }));
    }

    #[tokio::test]
    async fn unknown_tag_propagates_client_error() {
        let node = MemoryNode::new("mem");
        let monitor = SyncMonitor::new(3, Duration::from_millis(1));
        assert!(matches!(
            monitor.wait_synced(&node, 404).await.unwrap_err(),
            BenchError::Client(_)
        ));
    }
}
