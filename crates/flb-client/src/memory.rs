use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use flb_crypto::SignedUpdate;
use flb_types::{ChunkRef, FeedAddress, FeedUpdate, OwnerId, Stamp, Topic};

use crate::api::{PublishReceipt, StorageNode, TagStatus};
use crate::error::{ClientError, ClientResult};

/// One feed's committed updates plus the node's local poll counter.
#[derive(Default)]
struct FeedLog {
    /// Committed updates, position == index.
    updates: Vec<FeedUpdate>,
    /// Poll count after which each update becomes visible.
    visible_after: Vec<u64>,
    /// Lookups served so far for this feed.
    polls: u64,
}

struct State {
    feeds: HashMap<FeedAddress, FeedLog>,
    /// Remaining `tag_status` calls before each tag reports fully synced.
    tags: HashMap<u64, u64>,
    next_tag: u64,
}

/// In-process emulation of a storage node's feed API.
///
/// Intended for tests and dry runs. Signatures are actually verified, and
/// duplicate publishes surface the same `Conflict` a real node would.
/// `visibility_lag` delays each new update by that many lookups, emulating
/// replication lag; `tag_delay` makes sync tags report incomplete for that
/// many status polls.
pub struct MemoryNode {
    label: String,
    visibility_lag: u64,
    tag_delay: u64,
    state: RwLock<State>,
}

impl MemoryNode {
    /// A node with no artificial lag: updates are visible immediately and
    /// tags report synced on the first poll.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_lag(label, 0, 0)
    }

    /// A node where each update needs `visibility_lag` lookups before it is
    /// served, and each tag needs `tag_delay` polls before it is synced.
    pub fn with_lag(label: impl Into<String>, visibility_lag: u64, tag_delay: u64) -> Self {
        Self {
            label: label.into(),
            visibility_lag,
            tag_delay,
            state: RwLock::new(State {
                feeds: HashMap::new(),
                tags: HashMap::new(),
                next_tag: 1,
            }),
        }
    }

    /// Number of updates committed for the feed, regardless of visibility.
    pub fn committed(&self, owner: &OwnerId, topic: &Topic) -> usize {
        let address = FeedAddress::derive(owner, topic);
        let state = self.state.read().expect("lock poisoned");
        state
            .feeds
            .get(&address)
            .map(|log| log.updates.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl StorageNode for MemoryNode {
    async fn create_manifest(
        &self,
        _stamp: &Stamp,
        owner: &OwnerId,
        topic: &Topic,
    ) -> ClientResult<ChunkRef> {
        // Content-addressed: the same (owner, topic) always yields the same
        // manifest reference, so repeated creation is idempotent.
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"flb-manifest-v1:");
        hasher.update(owner.as_bytes());
        hasher.update(topic.as_bytes());
        Ok(ChunkRef::from_raw(*hasher.finalize().as_bytes()))
    }

    async fn publish(
        &self,
        _stamp: &Stamp,
        topic: &Topic,
        update: &SignedUpdate,
    ) -> ClientResult<PublishReceipt> {
        let owner = OwnerId::from_public_key(&update.public_key);
        let address = FeedAddress::derive(&owner, topic);
        update
            .verify(&address)
            .map_err(|e| ClientError::Unauthorized(e.to_string()))?;

        let mut state = self.state.write().expect("lock poisoned");
        let index = update.index.value() as usize;

        let committed = state
            .feeds
            .get(&address)
            .map(|log| log.updates.len())
            .unwrap_or(0);
        if index < committed {
            let log = state.feeds.get(&address).expect("feed exists");
            return if log.updates[index].payload == update.payload {
                Err(ClientError::Conflict)
            } else {
                Err(ClientError::Node {
                    status: 422,
                    message: format!("index {index} already bound to a different payload"),
                })
            };
        }
        if index > committed {
            return Err(ClientError::Node {
                status: 422,
                message: format!("index gap: expected {committed}, got {index}"),
            });
        }

        let tag = state.next_tag;
        state.next_tag += 1;
        state.tags.insert(tag, self.tag_delay);

        let log = state.feeds.entry(address).or_default();
        let visible_after = log.polls + self.visibility_lag;
        log.updates.push(update.to_update());
        log.visible_after.push(visible_after);

        Ok(PublishReceipt {
            reference: update.payload,
            tag: Some(tag),
        })
    }

    async fn lookup(&self, owner: &OwnerId, topic: &Topic) -> ClientResult<FeedUpdate> {
        let address = FeedAddress::derive(owner, topic);
        let mut state = self.state.write().expect("lock poisoned");
        let log = state.feeds.get_mut(&address).ok_or(ClientError::NotFound)?;
        log.polls += 1;
        let polls = log.polls;
        log.updates
            .iter()
            .zip(&log.visible_after)
            .rev()
            .find(|(_, visible_after)| polls > **visible_after)
            .map(|(update, _)| *update)
            .ok_or(ClientError::NotFound)
    }

    async fn tag_status(&self, tag: u64) -> ClientResult<TagStatus> {
        let mut state = self.state.write().expect("lock poisoned");
        let remaining = state.tags.get_mut(&tag).ok_or(ClientError::NotFound)?;
        if *remaining > 0 {
            *remaining -= 1;
            Ok(TagStatus { synced: 0, total: 1 })
        } else {
            Ok(TagStatus { synced: 1, total: 1 })
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for MemoryNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().expect("lock poisoned");
        f.debug_struct("MemoryNode")
            .field("label", &self.label)
            .field("feeds", &state.feeds.len())
            .finish()
    }
}
