use serde::{Deserialize, Serialize};

use crate::chunk::ChunkRef;
use crate::index::FeedIndex;

/// What a node reports as the current state of a feed: the highest index
/// it has observed and the payload reference that update points to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedUpdate {
    pub index: FeedIndex,
    pub payload: ChunkRef,
}

impl FeedUpdate {
    pub fn new(index: FeedIndex, payload: ChunkRef) -> Self {
        Self { index, payload }
    }
}
