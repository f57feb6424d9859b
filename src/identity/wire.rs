//! Compact binary form of an identity.
//!
//! ```text
//! [address:5][type:1][public:varlen][privlen:1][secret:privlen]
//! ```
//!
//! | Type | Public | Secret | Public-only | Full |
//! |------|--------|--------|-------------|------|
//! | 0    | 64     | 64     | 71 bytes    | 135  |
//! | 1    | 114    | 112    | 121 bytes   | 233  |
//!
//! `privlen` is 0 (no secret present) or exactly the type's canonical
//! secret size; anything else fails decoding. Identities are embedded
//! in larger messages, so the decoder tolerates trailing bytes and
//! reports how many it consumed.

use super::{
    Address, Identity, IdentityError, IdentityKeys, IdentityType, ADDRESS_SIZE,
    C25519_PUBLIC_KEY_SIZE, C25519_SECRET_KEY_SIZE, P384_PUBLIC_KEY_SIZE, P384_SECRET_KEY_SIZE,
};

/// Size of the public-only type-0 wire form.
pub const C25519_MARSHAL_SIZE: usize = ADDRESS_SIZE + 1 + C25519_PUBLIC_KEY_SIZE + 1;

/// Size of the full type-0 wire form.
pub const C25519_MARSHAL_SIZE_FULL: usize = C25519_MARSHAL_SIZE + C25519_SECRET_KEY_SIZE;

/// Size of the public-only type-1 wire form.
pub const P384_MARSHAL_SIZE: usize = ADDRESS_SIZE + 1 + P384_PUBLIC_KEY_SIZE + 1;

/// Size of the full type-1 wire form.
pub const P384_MARSHAL_SIZE_FULL: usize = P384_MARSHAL_SIZE + P384_SECRET_KEY_SIZE;

/// Largest possible wire form of any identity.
pub const IDENTITY_MARSHAL_SIZE_MAX: usize = P384_MARSHAL_SIZE_FULL;

impl Identity {
    /// Encode the wire form. The secret tail is emitted only when
    /// `include_private` is set and secret material is present.
    pub fn marshal(&self, include_private: bool) -> Vec<u8> {
        let mut out = Vec::with_capacity(IDENTITY_MARSHAL_SIZE_MAX);
        out.extend_from_slice(&self.address().to_bytes());
        out.push(self.identity_type() as u8);
        match &self.keys {
            IdentityKeys::C25519 { public, secret } => {
                out.extend_from_slice(public);
                match secret {
                    Some(secret) if include_private => {
                        out.push(C25519_SECRET_KEY_SIZE as u8);
                        out.extend_from_slice(&secret.0);
                    }
                    _ => out.push(0),
                }
            }
            IdentityKeys::P384 { public, secret } => {
                out.extend_from_slice(public.as_bytes());
                match secret {
                    Some(secret) if include_private => {
                        out.push(P384_SECRET_KEY_SIZE as u8);
                        out.extend_from_slice(&secret.to_bytes());
                    }
                    _ => out.push(0),
                }
            }
        }
        out
    }

    /// Decode an identity from the head of `data`, returning it along
    /// with the number of bytes consumed.
    pub fn unmarshal(data: &[u8]) -> Result<(Self, usize), IdentityError> {
        let address = Address::from_slice(take::<ADDRESS_SIZE>(data, 0)?.as_slice())?;
        let kind = IdentityType::from_wire(take::<1>(data, ADDRESS_SIZE)?[0])?;
        let mut at = ADDRESS_SIZE + 1;

        match kind {
            IdentityType::C25519 => {
                let public = take::<C25519_PUBLIC_KEY_SIZE>(data, at)?;
                at += C25519_PUBLIC_KEY_SIZE;
                let privlen = take::<1>(data, at)?[0] as usize;
                at += 1;
                let secret = match privlen {
                    0 => None,
                    C25519_SECRET_KEY_SIZE => {
                        let secret = take::<C25519_SECRET_KEY_SIZE>(data, at)?;
                        at += C25519_SECRET_KEY_SIZE;
                        Some(secret)
                    }
                    other => {
                        return Err(IdentityError::InvalidLength {
                            expected: C25519_SECRET_KEY_SIZE,
                            got: other,
                        })
                    }
                };
                Ok((Identity::assemble_c25519(address, public, secret)?, at))
            }
            IdentityType::P384 => {
                let public = take::<P384_PUBLIC_KEY_SIZE>(data, at)?;
                at += P384_PUBLIC_KEY_SIZE;
                let privlen = take::<1>(data, at)?[0] as usize;
                at += 1;
                let secret = match privlen {
                    0 => None,
                    P384_SECRET_KEY_SIZE => {
                        let secret = take::<P384_SECRET_KEY_SIZE>(data, at)?;
                        at += P384_SECRET_KEY_SIZE;
                        Some(secret)
                    }
                    other => {
                        return Err(IdentityError::InvalidLength {
                            expected: P384_SECRET_KEY_SIZE,
                            got: other,
                        })
                    }
                };
                Ok((Identity::assemble_p384(address, public, secret)?, at))
            }
        }
    }
}

fn take<const N: usize>(data: &[u8], at: usize) -> Result<[u8; N], IdentityError> {
    let end = at + N;
    if data.len() < end {
        return Err(IdentityError::Truncated { need: end, got: data.len() });
    }
    Ok(data[at..end].try_into().expect("N-byte window"))
}
