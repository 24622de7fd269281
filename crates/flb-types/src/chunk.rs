use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Content address a feed update points to.
///
/// In general this is the root address of arbitrary content. The benchmark
/// treats it as a 32-byte big-endian counter and increments it between
/// rounds so every round's payload is cheaply distinguishable.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkRef([u8; 32]);

impl ChunkRef {
    /// The all-zero reference. Starting payload of a benchmark session.
    pub const fn zero() -> Self {
        Self([0u8; 32])
    }

    /// Create from raw bytes.
    pub const fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Add 1, treating the buffer as a big-endian unsigned integer.
    ///
    /// Carry propagates from the least-significant byte. Overflow past the
    /// 32-byte width wraps to zero; that would take 2^256 rounds and is out
    /// of contract.
    pub fn increment(&mut self) {
        for byte in self.0.iter_mut().rev() {
            let (next, carried) = byte.overflowing_add(1);
            *byte = next;
            if !carried {
                break;
            }
        }
    }

    /// A copy of this reference incremented once.
    pub fn incremented(&self) -> Self {
        let mut next = *self;
        next.increment();
        next
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

impl fmt::Debug for ChunkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkRef({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ChunkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn increment_from_zero() {
        let mut r = ChunkRef::zero();
        r.increment();
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(r.as_bytes(), &expected);
    }

    #[test]
    fn increment_carries_on_rollover() {
        let mut bytes = [0u8; 32];
        bytes[31] = 0xff;
        let mut r = ChunkRef::from_raw(bytes);
        r.increment();
        let mut expected = [0u8; 32];
        expected[30] = 1;
        assert_eq!(r.as_bytes(), &expected);
    }

    #[test]
    fn increment_carries_across_multiple_bytes() {
        let mut bytes = [0u8; 32];
        bytes[30] = 0xff;
        bytes[31] = 0xff;
        let mut r = ChunkRef::from_raw(bytes);
        r.increment();
        let mut expected = [0u8; 32];
        expected[29] = 1;
        assert_eq!(r.as_bytes(), &expected);
    }

    #[test]
    fn full_buffer_wraps_to_zero() {
        let mut r = ChunkRef::from_raw([0xff; 32]);
        r.increment();
        assert_eq!(r, ChunkRef::zero());
    }

    #[test]
    fn incremented_leaves_original_untouched() {
        let r = ChunkRef::zero();
        let next = r.incremented();
        assert_eq!(r, ChunkRef::zero());
        assert_ne!(r, next);
    }

    #[test]
    fn hex_roundtrip() {
        let r = ChunkRef::from_raw([0xab; 32]);
        assert_eq!(ChunkRef::from_hex(&r.to_hex()).unwrap(), r);
    }

    proptest! {
        #[test]
        fn increment_is_strictly_increasing(n in 0u64..1_000_000) {
            // Seed the low 8 bytes so we stay far from the wrap point.
            let mut bytes = [0u8; 32];
            bytes[24..].copy_from_slice(&n.to_be_bytes());
            let r = ChunkRef::from_raw(bytes);
            prop_assert!(r.incremented() > r);
        }

        #[test]
        fn repeated_increment_matches_integer_addition(n in 0u8..64) {
            let mut r = ChunkRef::zero();
            for _ in 0..n {
                r.increment();
            }
            let mut expected = [0u8; 32];
            expected[31] = n;
            prop_assert_eq!(r.as_bytes(), &expected);
        }
    }
}
