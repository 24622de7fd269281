//! Signing primitives for the Feed Latency Bench.
//!
//! A feed is owned by exactly one ed25519 key. The writer signs each
//! (index, payload) pair into a [`SignedUpdate`]; nodes and readers verify
//! the signature against the owner's public key. The signing scheme itself
//! is deliberately minimal — the benchmark treats it as an opaque
//! "sign(owner, index, payload)" primitive.

pub mod signer;
pub mod update;

pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
pub use update::SignedUpdate;
