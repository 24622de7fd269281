use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::owner::OwnerId;
use crate::topic::Topic;

/// Address of a logical feed: hash(owner, topic).
///
/// A `FeedAddress` uniquely determines where a feed's updates are looked
/// up on a storage node. It is immutable once derived and carries no
/// information beyond the (owner, topic) pair it was derived from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedAddress([u8; 32]);

impl FeedAddress {
    /// Derive the address of the feed identified by (owner, topic).
    pub fn derive(owner: &OwnerId, topic: &Topic) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"flb-feed-v1:");
        hasher.update(owner.as_bytes());
        hasher.update(b":");
        hasher.update(topic.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string (64 hex characters).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for FeedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedAddress({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for FeedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(seed: u8) -> OwnerId {
        OwnerId::from_public_key(&[seed; 32])
    }

    #[test]
    fn derivation_is_deterministic() {
        let o = owner(1);
        let t = Topic::from_seed("t");
        assert_eq!(FeedAddress::derive(&o, &t), FeedAddress::derive(&o, &t));
    }

    #[test]
    fn different_topics_give_unrelated_feeds() {
        let o = owner(1);
        let a1 = FeedAddress::derive(&o, &Topic::from_seed("a"));
        let a2 = FeedAddress::derive(&o, &Topic::from_seed("b"));
        assert_ne!(a1, a2);
    }

    #[test]
    fn different_owners_give_unrelated_feeds() {
        let t = Topic::zero();
        let a1 = FeedAddress::derive(&owner(1), &t);
        let a2 = FeedAddress::derive(&owner(2), &t);
        assert_ne!(a1, a2);
    }

    #[test]
    fn hex_roundtrip() {
        let a = FeedAddress::derive(&owner(5), &Topic::zero());
        let parsed = FeedAddress::from_hex(&a.to_hex()).unwrap();
        assert_eq!(a, parsed);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(matches!(
            FeedAddress::from_hex("00ff"),
            Err(TypeError::InvalidLength { .. })
        ));
    }
}
