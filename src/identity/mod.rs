//! Trellis node identity: a 40-bit address bound to signing and
//! key-agreement keys by a memory-hard proof of work.
//!
//! Two identity types exist on the wire:
//!
//! - **type-0 (`C25519`)** — combined X25519 + Ed25519 keys. The
//!   address is the tail of the v0 frankenhash digest of the public
//!   key, and candidates are ground until the digest passes the PoW
//!   bound.
//! - **type-1 (`P384`)** — an 8-bit nonce, combined X25519 + Ed25519
//!   keys, and a NIST P-384 key in one compound blob. The nonce is
//!   ground until the v1 memory-hard hash accepts the blob; the
//!   address is the head of the blob's SHA-384 fingerprint.
//!
//! Identities are immutable once constructed (by [`Identity::generate`]
//! or by decoding) and their secret material is zeroized on drop.
//! Signing, verification, and agreement dispatch on the type tag;
//! agreement between mixed types falls back to the X25519 halves both
//! sides share.

mod address;
mod fingerprint;
mod text;
mod wire;

use std::collections::TryReserveError;
use std::fmt;
use std::time::Instant;

use sha2::{Digest, Sha384, Sha512};
use thiserror::Error;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{c25519, p384};
use crate::pow::{
    frankenhash, frankenhash_accepts, memhash_accepts, FrankenhashScratch, MemhashScratch,
};

pub use address::{Address, ADDRESS_SIZE};
pub use fingerprint::{Fingerprint, FINGERPRINT_HASH_SIZE};
pub use text::IDENTITY_STRING_SIZE_MAX;
pub use wire::IDENTITY_MARSHAL_SIZE_MAX;

/// Combined public key size for type-0 identities.
pub const C25519_PUBLIC_KEY_SIZE: usize = c25519::PUBLIC_SIZE;

/// Combined secret key size for type-0 identities.
pub const C25519_SECRET_KEY_SIZE: usize = c25519::SECRET_SIZE;

/// Compound public key size for type-1 identities:
/// `nonce(1) || c25519(64) || p384(49)`.
pub const P384_PUBLIC_KEY_SIZE: usize = 1 + c25519::PUBLIC_SIZE + p384::PUBLIC_SIZE;

/// Compound secret key size for type-1 identities:
/// `c25519(64) || p384(48)`.
pub const P384_SECRET_KEY_SIZE: usize = c25519::SECRET_SIZE + p384::SECRET_SIZE;

/// Capacity that accommodates a signature of either identity type.
pub const SIGNATURE_BUFFER_SIZE: usize = p384::SIGNATURE_SIZE;

/// Size of an agreed shared key.
pub const SHARED_KEY_SIZE: usize = 48;

// Offsets of the component keys inside a type-1 compound public blob.
const P384_PUB_C25519: usize = 1;
const P384_PUB_P384: usize = 1 + c25519::PUBLIC_SIZE;

/// Errors that can occur in identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid address: expected 10 hex digits")]
    InvalidAddress,

    #[error("invalid address length: expected 5, got {0}")]
    InvalidAddressLength(usize),

    #[error("reserved or zero address")]
    ReservedAddress,

    #[error("address does not match public key fingerprint")]
    AddressMismatch,

    #[error("unsupported identity type {0}")]
    UnsupportedType(u8),

    #[error("malformed identity string: expected 3 or 4 fields, got {0}")]
    BadFieldCount(usize),

    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("invalid base32 encoding")]
    InvalidBase32,

    #[error("invalid field length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("truncated identity: need {need} bytes, got {got}")]
    Truncated { need: usize, got: usize },

    #[error("identity has no private key")]
    MissingPrivateKey,

    #[error("private key does not match public key")]
    SecretMismatch,

    #[error("invalid key material")]
    InvalidKey,

    #[error("scratch allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

/// Identity type tag. The discriminant is both the wire byte and the
/// text-form digit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum IdentityType {
    /// Type-0: combined X25519 + Ed25519.
    C25519 = 0,
    /// Type-1: compound nonce + X25519 + Ed25519 + P-384.
    P384 = 1,
}

impl IdentityType {
    /// Decode a wire tag byte.
    pub fn from_wire(byte: u8) -> Result<Self, IdentityError> {
        match byte {
            0 => Ok(Self::C25519),
            1 => Ok(Self::P384),
            other => Err(IdentityError::UnsupportedType(other)),
        }
    }

    /// Signature size produced by this identity type.
    pub fn signature_size(self) -> usize {
        match self {
            Self::C25519 => c25519::SIGNATURE_SIZE,
            Self::P384 => p384::SIGNATURE_SIZE,
        }
    }
}

impl fmt::Display for IdentityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::C25519 => write!(f, "c25519"),
            Self::P384 => write!(f, "p384"),
        }
    }
}

/// Compound type-1 public key blob.
#[derive(Clone)]
struct P384Public([u8; P384_PUBLIC_KEY_SIZE]);

impl P384Public {
    fn as_bytes(&self) -> &[u8; P384_PUBLIC_KEY_SIZE] {
        &self.0
    }

    fn x25519(&self) -> [u8; 32] {
        self.0[P384_PUB_C25519..P384_PUB_C25519 + 32]
            .try_into()
            .expect("32-byte window")
    }

    fn c25519(&self) -> [u8; c25519::PUBLIC_SIZE] {
        self.0[P384_PUB_C25519..P384_PUB_P384]
            .try_into()
            .expect("64-byte window")
    }

    fn p384(&self) -> [u8; p384::PUBLIC_SIZE] {
        self.0[P384_PUB_P384..].try_into().expect("49-byte window")
    }
}

/// Compound type-1 secret material. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct P384Secret {
    c25519: [u8; c25519::SECRET_SIZE],
    p384: [u8; p384::SECRET_SIZE],
}

impl P384Secret {
    fn from_bytes(bytes: &[u8; P384_SECRET_KEY_SIZE]) -> Self {
        let mut secret = Self { c25519: [0; c25519::SECRET_SIZE], p384: [0; p384::SECRET_SIZE] };
        secret.c25519.copy_from_slice(&bytes[..c25519::SECRET_SIZE]);
        secret.p384.copy_from_slice(&bytes[c25519::SECRET_SIZE..]);
        secret
    }

    fn to_bytes(&self) -> [u8; P384_SECRET_KEY_SIZE] {
        let mut bytes = [0u8; P384_SECRET_KEY_SIZE];
        bytes[..c25519::SECRET_SIZE].copy_from_slice(&self.c25519);
        bytes[c25519::SECRET_SIZE..].copy_from_slice(&self.p384);
        bytes
    }
}

/// Type-specific key material, tagged.
#[derive(Clone)]
enum IdentityKeys {
    C25519 {
        public: [u8; C25519_PUBLIC_KEY_SIZE],
        secret: Option<c25519::SecretBytes>,
    },
    P384 {
        public: P384Public,
        secret: Option<P384Secret>,
    },
}

/// A Trellis node identity.
///
/// Carries the address, the public-key fingerprint, the type-specific
/// public keys, and optionally the matching secret keys. Equality and
/// hashing consider only the public side, so an identity decoded from
/// its public form compares equal to the full original.
#[derive(Clone)]
pub struct Identity {
    fingerprint: Fingerprint,
    keys: IdentityKeys,
}

impl Identity {
    /// Generate a new identity of the given type.
    ///
    /// Blocking and CPU-bound: the proof-of-work grind takes on the
    /// order of seconds for [`IdentityType::P384`] on a typical core.
    /// Callers wanting parallelism run generations on worker threads.
    pub fn generate(kind: IdentityType) -> Result<Self, IdentityError> {
        let started = Instant::now();
        let mut attempts = 0u64;

        let identity = match kind {
            IdentityType::C25519 => {
                let mut scratch = FrankenhashScratch::new()?;
                let mut digest = [0u8; 64];
                loop {
                    let keypair = c25519::Keypair::generate_satisfying(|public| {
                        attempts += 1;
                        digest = frankenhash(public, &mut scratch);
                        frankenhash_accepts(&digest)
                    });
                    let address = Address::from_slice(&digest[59..])?;
                    if address.is_reserved() {
                        continue;
                    }
                    let hash = Sha384::digest(keypair.public).into();
                    break Self {
                        fingerprint: Fingerprint::new(address, hash),
                        keys: IdentityKeys::C25519 {
                            public: keypair.public,
                            secret: Some(keypair.secret),
                        },
                    };
                }
            }

            IdentityType::P384 => {
                let mut scratch = MemhashScratch::new()?;
                loop {
                    // The nonce is only 8 bits; when it wraps, reroll
                    // the cheaper P-384 key and keep the C25519 key.
                    let combined = c25519::Keypair::generate();
                    let mut p384_keypair = p384::generate();
                    let mut public = [0u8; P384_PUBLIC_KEY_SIZE];
                    public[P384_PUB_C25519..P384_PUB_P384].copy_from_slice(&combined.public);
                    public[P384_PUB_P384..].copy_from_slice(&p384_keypair.public);
                    loop {
                        attempts += 1;
                        if memhash_accepts(&public, &mut scratch) {
                            break;
                        }
                        public[0] = public[0].wrapping_add(1);
                        if public[0] == 0 {
                            p384_keypair = p384::generate();
                            public[P384_PUB_P384..].copy_from_slice(&p384_keypair.public);
                        }
                    }

                    let hash: [u8; FINGERPRINT_HASH_SIZE] = Sha384::digest(public).into();
                    let address = Address::from_slice(&hash[..ADDRESS_SIZE])?;
                    if address.is_reserved() {
                        continue;
                    }
                    let secret = P384Secret {
                        c25519: combined.secret.0,
                        p384: p384_keypair.secret.0,
                    };
                    break Self {
                        fingerprint: Fingerprint::new(address, hash),
                        keys: IdentityKeys::P384 { public: P384Public(public), secret: Some(secret) },
                    };
                }
            }
        };

        debug!(
            %kind,
            address = %identity.address(),
            attempts,
            elapsed = ?started.elapsed(),
            "generated identity",
        );
        Ok(identity)
    }

    /// The identity's type tag.
    pub fn identity_type(&self) -> IdentityType {
        match self.keys {
            IdentityKeys::C25519 { .. } => IdentityType::C25519,
            IdentityKeys::P384 { .. } => IdentityType::P384,
        }
    }

    /// The identity's 40-bit address.
    pub fn address(&self) -> Address {
        self.fingerprint.address()
    }

    /// The identity's fingerprint (address + public key hash).
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Whether secret key material is present.
    pub fn has_private(&self) -> bool {
        match &self.keys {
            IdentityKeys::C25519 { secret, .. } => secret.is_some(),
            IdentityKeys::P384 { secret, .. } => secret.is_some(),
        }
    }

    /// Recompute the proof of work and the address binding.
    ///
    /// Returns false for any violation, including scratch allocation
    /// failure. Never panics on hostile key material.
    pub fn validate(&self) -> bool {
        let address = self.address();
        if address.is_reserved() {
            return false;
        }
        match &self.keys {
            IdentityKeys::C25519 { public, .. } => {
                let Ok(mut scratch) = FrankenhashScratch::new() else {
                    return false;
                };
                let digest = frankenhash(public, &mut scratch);
                if !frankenhash_accepts(&digest) {
                    debug!(%address, "identity failed proof-of-work validation");
                    return false;
                }
                Address::from_slice(&digest[59..]).is_ok_and(|derived| derived == address)
            }
            IdentityKeys::P384 { public, .. } => {
                let bound = Address::from_slice(&self.fingerprint.hash()[..ADDRESS_SIZE])
                    .is_ok_and(|derived| derived == address);
                if !bound {
                    return false;
                }
                let Ok(mut scratch) = MemhashScratch::new() else {
                    return false;
                };
                let ok = memhash_accepts(public.as_bytes(), &mut scratch);
                if !ok {
                    debug!(%address, "identity failed proof-of-work validation");
                }
                ok
            }
        }
    }

    /// Sign `data` with this identity's secret key.
    ///
    /// Type-0 identities produce a 64-byte Ed25519 signature over the
    /// data. Type-1 identities produce a 96-byte ECDSA-P384 signature
    /// over `SHA-384(data || public_blob)`; folding the whole compound
    /// public key into the hash stops substitution of either half.
    pub fn sign(&self, data: &[u8]) -> Result<Signature, IdentityError> {
        match &self.keys {
            IdentityKeys::C25519 { secret: Some(secret), .. } => {
                Ok(Signature::ed25519(c25519::sign(&secret.0, data)))
            }
            IdentityKeys::P384 { public, secret: Some(secret) } => {
                let digest = p384_signing_digest(data, public);
                let sig = p384::sign_prehash(&secret.p384, &digest)
                    .ok_or(IdentityError::InvalidKey)?;
                Ok(Signature::ecdsa_p384(sig))
            }
            _ => Err(IdentityError::MissingPrivateKey),
        }
    }

    /// Verify a signature made by this identity.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        match &self.keys {
            IdentityKeys::C25519 { public, .. } => c25519::verify(public, data, signature),
            IdentityKeys::P384 { public, .. } => {
                let digest = p384_signing_digest(data, public);
                p384::verify_prehash(&public.p384(), &digest, signature)
            }
        }
    }

    /// Derive the 48-byte shared key between this identity (which must
    /// hold its secret) and a peer's public identity.
    ///
    /// When both sides are type-1 the X25519 and P-384 exchanges are
    /// hashed together, so the key stands as long as either curve
    /// does. Any mix involving a type-0 identity falls back to the
    /// X25519 halves both types carry.
    pub fn agree(&self, peer: &Identity) -> Result<[u8; SHARED_KEY_SIZE], IdentityError> {
        match (&self.keys, &peer.keys) {
            (IdentityKeys::C25519 { secret: Some(secret), .. }, _) => {
                Ok(x25519_session_key(&secret.0, &peer.x25519_public()))
            }
            (IdentityKeys::P384 { secret: Some(secret), .. }, IdentityKeys::C25519 { .. }) => {
                Ok(x25519_session_key(&secret.c25519, &peer.x25519_public()))
            }
            (
                IdentityKeys::P384 { secret: Some(secret), .. },
                IdentityKeys::P384 { public: peer_public, .. },
            ) => {
                let raw_x25519 = c25519::agree(&secret.c25519, &peer_public.x25519());
                let raw_p384 = p384::agree(&secret.p384, &peer_public.p384())
                    .ok_or(IdentityError::InvalidKey)?;
                let mut hasher = Sha384::new();
                hasher.update(raw_x25519);
                hasher.update(raw_p384);
                Ok(hasher.finalize().into())
            }
            _ => Err(IdentityError::MissingPrivateKey),
        }
    }

    /// SHA-384 over the public and secret blobs together, or `None`
    /// when no secret material is present.
    pub fn hash_with_private(&self) -> Option<[u8; FINGERPRINT_HASH_SIZE]> {
        let mut hasher = Sha384::new();
        match &self.keys {
            IdentityKeys::C25519 { public, secret: Some(secret) } => {
                hasher.update(public);
                hasher.update(secret.0);
            }
            IdentityKeys::P384 { public, secret: Some(secret) } => {
                hasher.update(public.as_bytes());
                hasher.update(secret.c25519);
                hasher.update(secret.p384);
            }
            _ => return None,
        }
        Some(hasher.finalize().into())
    }

    /// The X25519 public key every identity type carries.
    fn x25519_public(&self) -> [u8; 32] {
        match &self.keys {
            IdentityKeys::C25519 { public, .. } => {
                public[..32].try_into().expect("32-byte window")
            }
            IdentityKeys::P384 { public, .. } => public.x25519(),
        }
    }

    /// Build a type-0 identity from decoded parts, enforcing every
    /// decode-time invariant except the (expensive) proof of work.
    pub(crate) fn assemble_c25519(
        address: Address,
        public: [u8; C25519_PUBLIC_KEY_SIZE],
        secret: Option<[u8; C25519_SECRET_KEY_SIZE]>,
    ) -> Result<Self, IdentityError> {
        if address.is_reserved() {
            return Err(IdentityError::ReservedAddress);
        }
        let secret = match secret {
            Some(bytes) => {
                if c25519::public_from_secret(&bytes) != public {
                    return Err(IdentityError::SecretMismatch);
                }
                Some(c25519::SecretBytes(bytes))
            }
            None => None,
        };
        let hash = Sha384::digest(public).into();
        Ok(Self {
            fingerprint: Fingerprint::new(address, hash),
            keys: IdentityKeys::C25519 { public, secret },
        })
    }

    /// Build a type-1 identity from decoded parts, enforcing every
    /// decode-time invariant except the (expensive) proof of work.
    pub(crate) fn assemble_p384(
        address: Address,
        public: [u8; P384_PUBLIC_KEY_SIZE],
        secret: Option<[u8; P384_SECRET_KEY_SIZE]>,
    ) -> Result<Self, IdentityError> {
        if address.is_reserved() {
            return Err(IdentityError::ReservedAddress);
        }
        let hash: [u8; FINGERPRINT_HASH_SIZE] = Sha384::digest(public).into();
        let derived = Address::from_slice(&hash[..ADDRESS_SIZE])?;
        if derived != address {
            return Err(IdentityError::AddressMismatch);
        }
        let public = P384Public(public);
        let secret = match secret {
            Some(bytes) => {
                let secret = P384Secret::from_bytes(&bytes);
                let c25519_matches =
                    c25519::public_from_secret(&secret.c25519) == public.c25519();
                let p384_matches =
                    p384::public_from_secret(&secret.p384) == Some(public.p384());
                if !c25519_matches || !p384_matches {
                    return Err(IdentityError::SecretMismatch);
                }
                Some(secret)
            }
            None => None,
        };
        Ok(Self {
            fingerprint: Fingerprint::new(address, hash),
            keys: IdentityKeys::P384 { public, secret },
        })
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.identity_type() == other.identity_type() && self.fingerprint == other.fingerprint
    }
}

impl Eq for Identity {}

impl std::hash::Hash for Identity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity_type().hash(state);
        std::hash::Hash::hash(&self.fingerprint, state);
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("type", &self.identity_type())
            .field("address", &self.address())
            .field("has_private", &self.has_private())
            .finish_non_exhaustive()
    }
}

/// A detached signature: 64 bytes from a type-0 identity, 96 from a
/// type-1 identity.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; SIGNATURE_BUFFER_SIZE],
    len: u8,
}

impl Signature {
    fn ed25519(sig: [u8; c25519::SIGNATURE_SIZE]) -> Self {
        let mut bytes = [0u8; SIGNATURE_BUFFER_SIZE];
        bytes[..sig.len()].copy_from_slice(&sig);
        Self { bytes, len: sig.len() as u8 }
    }

    fn ecdsa_p384(sig: [u8; p384::SIGNATURE_SIZE]) -> Self {
        Self { bytes: sig, len: p384::SIGNATURE_SIZE as u8 }
    }

    /// The signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Signature length in bytes.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always false for signatures produced by [`Identity::sign`].
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(self.as_bytes()))
    }
}

/// Type-1 signatures cover `SHA-384(data || compound_public_blob)`.
fn p384_signing_digest(data: &[u8], public: &P384Public) -> [u8; 48] {
    let mut hasher = Sha384::new();
    hasher.update(data);
    hasher.update(public.as_bytes());
    hasher.finalize().into()
}

/// X25519-only agreement: hash the raw shared point with SHA-512 and
/// keep the first 48 bytes.
fn x25519_session_key(secret: &[u8; 64], peer_x25519: &[u8; 32]) -> [u8; SHARED_KEY_SIZE] {
    let raw = c25519::agree(secret, peer_x25519);
    let hash: [u8; 64] = Sha512::digest(raw).into();
    let mut key = [0u8; SHARED_KEY_SIZE];
    key.copy_from_slice(&hash[..SHARED_KEY_SIZE]);
    key
}
