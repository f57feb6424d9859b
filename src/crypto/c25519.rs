//! Combined X25519 + Ed25519 key material ("type-0" keys).
//!
//! A combined key concatenates an X25519 key-agreement key and an
//! Ed25519 signing key. Public and secret halves are each 64 bytes:
//! `x25519(32) || ed25519(32)`.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::OsRng;
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Combined public key size: X25519 point plus Ed25519 point.
pub(crate) const PUBLIC_SIZE: usize = 64;

/// Combined secret key size: X25519 scalar plus Ed25519 seed.
pub(crate) const SECRET_SIZE: usize = 64;

/// Ed25519 signature size.
pub(crate) const SIGNATURE_SIZE: usize = 64;

/// X25519 shared secret size.
pub(crate) const DH_SHARED_SIZE: usize = 32;

/// Secret half of a combined keypair. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct SecretBytes(pub [u8; SECRET_SIZE]);

/// A freshly generated combined keypair.
pub(crate) struct Keypair {
    pub public: [u8; PUBLIC_SIZE],
    pub secret: SecretBytes,
}

impl Keypair {
    /// Generate a new random combined keypair.
    pub fn generate() -> Self {
        let dh = StaticSecret::random_from_rng(OsRng);
        let sign = SigningKey::generate(&mut OsRng);

        let mut public = [0u8; PUBLIC_SIZE];
        public[..32].copy_from_slice(X25519Public::from(&dh).as_bytes());
        public[32..].copy_from_slice(sign.verifying_key().as_bytes());

        let mut secret = [0u8; SECRET_SIZE];
        secret[..32].copy_from_slice(&dh.to_bytes());
        secret[32..].copy_from_slice(&sign.to_bytes());

        Self { public, secret: SecretBytes(secret) }
    }

    /// Generate keypairs until `accept` approves the public half.
    ///
    /// The predicate is expected to be far more expensive than the key
    /// generation itself.
    pub fn generate_satisfying(mut accept: impl FnMut(&[u8; PUBLIC_SIZE]) -> bool) -> Self {
        loop {
            let keypair = Self::generate();
            if accept(&keypair.public) {
                return keypair;
            }
        }
    }
}

/// Derive the public half from a stored secret.
pub(crate) fn public_from_secret(secret: &[u8; SECRET_SIZE]) -> [u8; PUBLIC_SIZE] {
    let (dh_secret, seed) = split32(secret);
    let mut public = [0u8; PUBLIC_SIZE];
    public[..32].copy_from_slice(X25519Public::from(&StaticSecret::from(dh_secret)).as_bytes());
    public[32..].copy_from_slice(SigningKey::from_bytes(&seed).verifying_key().as_bytes());
    public
}

/// Ed25519-sign `data` with the signing half of a combined secret.
pub(crate) fn sign(secret: &[u8; SECRET_SIZE], data: &[u8]) -> [u8; SIGNATURE_SIZE] {
    let seed: [u8; 32] = split32(secret).1;
    SigningKey::from_bytes(&seed).sign(data).to_bytes()
}

/// Verify an Ed25519 signature against the signing half of a combined
/// public key. Any malformed key or signature verifies as false.
pub(crate) fn verify(public: &[u8; PUBLIC_SIZE], data: &[u8], sig: &[u8]) -> bool {
    let sig_bytes: [u8; SIGNATURE_SIZE] = match sig.try_into() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let ed_public: [u8; 32] = split32(public).1;
    let Ok(key) = VerifyingKey::from_bytes(&ed_public) else {
        return false;
    };
    let signature = ed25519_dalek::Signature::from_bytes(&sig_bytes);
    key.verify(data, &signature).is_ok()
}

/// X25519 agreement between our combined secret and a peer's X25519
/// public key (the first half of a combined public key).
pub(crate) fn agree(secret: &[u8; SECRET_SIZE], peer_dh_public: &[u8; 32]) -> [u8; DH_SHARED_SIZE] {
    let dh_secret: [u8; 32] = split32(secret).0;
    let shared = StaticSecret::from(dh_secret).diffie_hellman(&X25519Public::from(*peer_dh_public));
    shared.to_bytes()
}

fn split32(combined: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut lo = [0u8; 32];
    let mut hi = [0u8; 32];
    lo.copy_from_slice(&combined[..32]);
    hi.copy_from_slice(&combined[32..]);
    (lo, hi)
}
