//! Trellis Identity
//!
//! Self-generated cryptographic credentials for nodes of the Trellis
//! peer-to-peer overlay network. An identity binds a short 40-bit
//! address to long-lived signing and key-agreement keys, and minting
//! one requires passing a memory-hard proof of work that makes mass
//! identity creation expensive on any hardware.

mod crypto;

pub mod handle;
pub mod identity;
pub mod pow;

// Re-export identity types
pub use identity::{
    Address, Fingerprint, Identity, IdentityError, IdentityType, Signature, ADDRESS_SIZE,
    C25519_PUBLIC_KEY_SIZE, C25519_SECRET_KEY_SIZE, FINGERPRINT_HASH_SIZE,
    IDENTITY_MARSHAL_SIZE_MAX, IDENTITY_STRING_SIZE_MAX, P384_PUBLIC_KEY_SIZE,
    P384_SECRET_KEY_SIZE, SHARED_KEY_SIZE, SIGNATURE_BUFFER_SIZE,
};
