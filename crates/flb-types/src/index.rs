use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Width of a feed index on the wire, in bytes.
pub const INDEX_WIDTH: usize = 8;

/// Sequence number of a feed update.
///
/// Starts at 0 and increases by exactly 1 on each successful publish. The
/// wire form is a fixed-width big-endian byte string; `to_bytes` and
/// `from_bytes` are exact inverses over the whole `u64` range. A decoded
/// index that does not match the monotonic sequence contract is a protocol
/// anomaly handled by the caller, never a crash.
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FeedIndex(u64);

impl FeedIndex {
    /// The first index of every feed.
    pub const ZERO: FeedIndex = FeedIndex(0);

    /// Create from a raw sequence number.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw sequence number.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The index of the next update.
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Fixed-width big-endian wire encoding.
    pub fn to_bytes(&self) -> [u8; INDEX_WIDTH] {
        self.0.to_be_bytes()
    }

    /// Decode from the fixed-width big-endian wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; INDEX_WIDTH] =
            bytes
                .try_into()
                .map_err(|_| TypeError::InvalidLength {
                    expected: INDEX_WIDTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(u64::from_be_bytes(arr)))
    }
}

impl fmt::Debug for FeedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedIndex({})", self.0)
    }
}

impl fmt::Display for FeedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FeedIndex {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
