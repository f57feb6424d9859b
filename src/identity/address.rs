//! 40-bit Trellis address derived from identity key material.

use std::fmt;
use std::str::FromStr;

use super::IdentityError;

/// Wire size of an address in bytes.
pub const ADDRESS_SIZE: usize = 5;

/// Addresses whose most significant byte equals this are reserved for
/// network-internal use and never assigned to identities.
const RESERVED_PREFIX: u64 = 0xff;

/// 40-bit node address.
///
/// Addresses are derived from identity key material (the PoW digest
/// tail for type-0, the fingerprint hash prefix for type-1) and are
/// the short routable identifier of a node. The all-zero address and
/// the `0xff`-prefixed range are reserved; identities carrying a
/// reserved address are rejected everywhere.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address {
    /// Create an Address from its 5-byte big-endian form.
    pub fn from_bytes(bytes: &[u8; ADDRESS_SIZE]) -> Self {
        let mut raw = 0u64;
        for &byte in bytes {
            raw = (raw << 8) | u64::from(byte);
        }
        Self(raw)
    }

    /// Create an Address from a slice.
    pub fn from_slice(slice: &[u8]) -> Result<Self, IdentityError> {
        let bytes: &[u8; ADDRESS_SIZE] = slice
            .try_into()
            .map_err(|_| IdentityError::InvalidAddressLength(slice.len()))?;
        Ok(Self::from_bytes(bytes))
    }

    /// Create an Address from the low 40 bits of an integer.
    pub fn from_u64(raw: u64) -> Self {
        Self(raw & 0xff_ffff_ffff)
    }

    /// Return the 5-byte big-endian form.
    pub fn to_bytes(self) -> [u8; ADDRESS_SIZE] {
        let mut bytes = [0u8; ADDRESS_SIZE];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = (self.0 >> (32 - 8 * i)) as u8;
        }
        bytes
    }

    /// Return the address as an integer (low 40 bits).
    pub fn to_u64(self) -> u64 {
        self.0
    }

    /// Whether this address is excluded from assignment: zero, or in
    /// the `0xff`-prefixed reserved range.
    pub fn is_reserved(self) -> bool {
        self.0 == 0 || (self.0 >> 32) == RESERVED_PREFIX
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010x}", self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({:010x})", self.0)
    }
}

impl FromStr for Address {
    type Err = IdentityError;

    /// Parse the 10-hex-digit text form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(IdentityError::InvalidAddress);
        }
        let raw = u64::from_str_radix(s, 16).map_err(|_| IdentityError::InvalidAddress)?;
        Ok(Self(raw))
    }
}
