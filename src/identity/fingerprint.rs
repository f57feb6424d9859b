//! Address plus public-key hash: the canonical compact identifier.

use std::fmt;

use super::Address;

/// Size of the fingerprint hash (SHA-384).
pub const FINGERPRINT_HASH_SIZE: usize = 48;

/// Canonical compact identifier of an identity.
///
/// Combines the 40-bit address with the SHA-384 hash of the identity's
/// public key material. Two identities are the same identity exactly
/// when their fingerprints are equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    address: Address,
    hash: [u8; FINGERPRINT_HASH_SIZE],
}

impl Fingerprint {
    pub(crate) fn new(address: Address, hash: [u8; FINGERPRINT_HASH_SIZE]) -> Self {
        Self { address, hash }
    }

    /// The identity's 40-bit address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// SHA-384 of the identity's public key material.
    pub fn hash(&self) -> &[u8; FINGERPRINT_HASH_SIZE] {
        &self.hash
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hash = base32::encode(base32::Alphabet::Rfc4648Lower { padding: false }, &self.hash);
        write!(f, "{}-{}", self.address, hash)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}
