//! Cryptographic primitives backing Trellis identities.
//!
//! Thin wrappers around the ecosystem implementations (dalek curves,
//! RustCrypto P-384) plus the reduced-round Speck-128 block cipher
//! used only by the proof-of-work function.

pub(crate) mod c25519;
pub(crate) mod p384;
pub(crate) mod speck;
