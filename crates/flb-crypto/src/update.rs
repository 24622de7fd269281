use serde::{Deserialize, Serialize};

use flb_types::{ChunkRef, FeedAddress, FeedIndex, FeedUpdate};

use crate::signer::{Signature, SignatureError, SigningKey, VerifyingKey};

/// An authenticated feed update: (index, payload) signed by the feed owner.
///
/// Produced by exactly one writer at publish time and immutable afterward.
/// The signature covers the feed address, so an update for one (owner,
/// topic) pair cannot be replayed on another feed.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SignedUpdate {
    pub index: FeedIndex,
    pub payload: ChunkRef,
    /// Raw public key of the signing owner.
    pub public_key: [u8; 32],
    pub signature: Signature,
}

impl SignedUpdate {
    /// Sign a new update for the feed at `address`.
    pub fn sign(key: &SigningKey, address: &FeedAddress, index: FeedIndex, payload: ChunkRef) -> Self {
        let digest = update_digest(address, index, &payload);
        Self {
            index,
            payload,
            public_key: key.verifying_key().as_bytes(),
            signature: key.sign(&digest),
        }
    }

    /// Verify the embedded signature against the embedded public key.
    pub fn verify(&self, address: &FeedAddress) -> Result<(), SignatureError> {
        let key = VerifyingKey::from_bytes(self.public_key)?;
        let digest = update_digest(address, self.index, &self.payload);
        key.verify(&digest, &self.signature)
    }

    /// The unauthenticated (index, payload) view of this update.
    pub fn to_update(&self) -> FeedUpdate {
        FeedUpdate::new(self.index, self.payload)
    }
}

/// Digest the owner signs: hash(address, index wire bytes, payload bytes).
fn update_digest(address: &FeedAddress, index: FeedIndex, payload: &ChunkRef) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"flb-update-v1:");
    hasher.update(address.as_bytes());
    hasher.update(&index.to_bytes());
    hasher.update(payload.as_bytes());
    *hasher.finalize().as_bytes()
}
