//! NIST P-384 key generation, prehash ECDSA, and ECDH.
//!
//! Wraps the RustCrypto `p384` crate. Points travel as 49-byte
//! compressed SEC1 encodings and signatures as fixed 96-byte `r || s`.
//! All parse failures surface as `None`/`false`; nothing panics on
//! malformed peer material.

use p384::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p384::ecdsa::{Signature, SigningKey, VerifyingKey};
use p384::elliptic_curve::sec1::ToEncodedPoint;
use p384::{PublicKey, SecretKey};
use rand_core::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Compressed SEC1 public key size.
pub(crate) const PUBLIC_SIZE: usize = 49;

/// Secret scalar size.
pub(crate) const SECRET_SIZE: usize = 48;

/// Fixed `r || s` signature size.
pub(crate) const SIGNATURE_SIZE: usize = 96;

/// ECDH shared secret size (the x coordinate).
pub(crate) const SHARED_SIZE: usize = 48;

/// Secret scalar bytes. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct SecretBytes(pub [u8; SECRET_SIZE]);

/// A freshly generated P-384 keypair.
pub(crate) struct Keypair {
    pub public: [u8; PUBLIC_SIZE],
    pub secret: SecretBytes,
}

/// Generate a new random P-384 keypair.
pub(crate) fn generate() -> Keypair {
    let secret_key = SecretKey::random(&mut OsRng);
    let point = secret_key.public_key().to_encoded_point(true);

    let mut public = [0u8; PUBLIC_SIZE];
    public.copy_from_slice(point.as_bytes());
    let mut secret = [0u8; SECRET_SIZE];
    secret.copy_from_slice(&secret_key.to_bytes());

    Keypair { public, secret: SecretBytes(secret) }
}

/// Derive the compressed public point for a stored secret scalar, or
/// `None` if the scalar is not a valid non-zero field element.
pub(crate) fn public_from_secret(secret: &[u8; SECRET_SIZE]) -> Option<[u8; PUBLIC_SIZE]> {
    let secret_key = SecretKey::from_slice(secret).ok()?;
    let point = secret_key.public_key().to_encoded_point(true);
    let mut public = [0u8; PUBLIC_SIZE];
    public.copy_from_slice(point.as_bytes());
    Some(public)
}

/// ECDSA-sign a precomputed 48-byte digest.
pub(crate) fn sign_prehash(secret: &[u8; SECRET_SIZE], digest: &[u8; 48]) -> Option<[u8; SIGNATURE_SIZE]> {
    let key = SigningKey::from_slice(secret).ok()?;
    let signature: Signature = key.sign_prehash(digest).ok()?;
    let mut out = [0u8; SIGNATURE_SIZE];
    out.copy_from_slice(&signature.to_bytes());
    Some(out)
}

/// Verify an ECDSA signature over a precomputed 48-byte digest.
pub(crate) fn verify_prehash(public: &[u8; PUBLIC_SIZE], digest: &[u8; 48], sig: &[u8]) -> bool {
    if sig.len() != SIGNATURE_SIZE {
        return false;
    }
    let Ok(key) = VerifyingKey::from_sec1_bytes(public) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(sig) else {
        return false;
    };
    key.verify_prehash(digest, &signature).is_ok()
}

/// ECDH agreement. `None` if either key fails to parse.
pub(crate) fn agree(secret: &[u8; SECRET_SIZE], peer_public: &[u8; PUBLIC_SIZE]) -> Option<[u8; SHARED_SIZE]> {
    let secret_key = SecretKey::from_slice(secret).ok()?;
    let peer_key = PublicKey::from_sec1_bytes(peer_public).ok()?;
    let shared = p384::ecdh::diffie_hellman(secret_key.to_nonzero_scalar(), peer_key.as_affine());
    let mut out = [0u8; SHARED_SIZE];
    out.copy_from_slice(shared.raw_secret_bytes());
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_verify_roundtrip() {
        let keypair = generate();
        let digest = [7u8; 48];
        let sig = sign_prehash(&keypair.secret.0, &digest).unwrap();
        assert!(verify_prehash(&keypair.public, &digest, &sig));
        assert!(!verify_prehash(&keypair.public, &[8u8; 48], &sig));
        assert!(!verify_prehash(&keypair.public, &digest, &sig[..95]));
    }

    #[test]
    fn test_agree_is_symmetric() {
        let a = generate();
        let b = generate();
        assert_eq!(agree(&a.secret.0, &b.public), agree(&b.secret.0, &a.public));
    }

    #[test]
    fn test_public_matches_secret() {
        let keypair = generate();
        assert_eq!(public_from_secret(&keypair.secret.0), Some(keypair.public));
    }

    #[test]
    fn test_garbage_peer_key_rejected() {
        let a = generate();
        let garbage = [0xabu8; PUBLIC_SIZE];
        assert!(agree(&a.secret.0, &garbage).is_none());
        assert!(!verify_prehash(&garbage, &[0u8; 48], &[0u8; SIGNATURE_SIZE]));
    }
}
