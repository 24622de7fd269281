use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Fixed-length opaque identifier chosen by a feed's publisher.
///
/// Two feeds with the same owner but different topics are unrelated. A
/// `Topic` never changes after construction; it only participates in
/// [`FeedAddress`](crate::FeedAddress) derivation and reporting.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic([u8; 32]);

impl Topic {
    /// Derive a topic from a human-readable seed label.
    ///
    /// The same label always produces the same topic.
    pub fn from_seed(label: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"flb-topic-v1:");
        hasher.update(label.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// The all-zero topic. Used as the default benchmark topic.
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Create from raw bytes.
    pub const fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
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

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Topic({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_seed_is_deterministic() {
        let t1 = Topic::from_seed("bench-2024");
        let t2 = Topic::from_seed("bench-2024");
        assert_eq!(t1, t2);
    }

    #[test]
    fn different_seeds_produce_different_topics() {
        assert_ne!(Topic::from_seed("a"), Topic::from_seed("b"));
    }

    #[test]
    fn zero_is_all_zeros() {
        assert_eq!(Topic::zero().as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn hex_roundtrip() {
        let t = Topic::from_seed("roundtrip");
        let parsed = Topic::from_hex(&t.to_hex()).unwrap();
        assert_eq!(t, parsed);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = Topic::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(matches!(
            Topic::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn display_is_full_hex() {
        let t = Topic::zero();
        assert_eq!(format!("{t}"), "0".repeat(64));
    }

    #[test]
    fn serde_roundtrip() {
        let t = Topic::from_seed("serde");
        let json = serde_json::to_string(&t).unwrap();
        let parsed: Topic = serde_json::from_str(&json).unwrap();
        assert_eq!(t, parsed);
    }
}
