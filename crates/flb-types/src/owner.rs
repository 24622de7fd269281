use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identity of a feed's single writer.
///
/// An `OwnerId` is derived deterministically from the writer's ed25519
/// public key using BLAKE3. The same key always produces the same owner,
/// so readers can resolve a feed knowing only (owner, topic).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId([u8; 32]);

impl OwnerId {
    /// Derive an `OwnerId` from raw ed25519 public key bytes.
    pub fn from_public_key(public_key: &[u8; 32]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"flb-owner-v1:");
        hasher.update(public_key);
        Self(*hasher.finalize().as_bytes())
    }

    /// Create from a raw 32-byte identity. Use `from_public_key()` for
    /// production code.
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

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("fo:{}", hex::encode(&self.0[..4]))
    }
}

impl fmt::Debug for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnerId({})", self.short_id())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}
