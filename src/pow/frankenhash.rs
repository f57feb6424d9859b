//! The v0 "frankenhash": a memory-hard digest over 2 MiB.
//!
//! The digest starts as SHA-512 of the input and is then dragged
//! through a 2 MiB buffer in two phases. Phase one fills the buffer
//! with Salsa20 in a CBC-like chain; plain Salsa20 is randomly
//! seekable, which is good for a cipher but exactly wrong for
//! sequential memory-hardness, so each 64-byte block is copied from
//! its predecessor before encryption. Phase two performs one
//! data-dependent 8-byte swap between the digest and the buffer per
//! word pair, re-encrypting the digest each step. Half the buffer's
//! words drive writes across the whole 2 MiB region.

use std::collections::TryReserveError;

use salsa20::cipher::{KeyIvInit, StreamCipher};
use salsa20::Salsa20;
use sha2::{Digest, Sha512};
use zeroize::Zeroize;

/// Scratch size in bytes.
pub const FRANKENHASH_MEMORY: usize = 2_097_152;

/// Digest acceptance bound: an identity candidate passes when the
/// first digest byte is below this.
const ACCEPT_BOUND: u8 = 17;

const WORDS: usize = FRANKENHASH_MEMORY / 8;

/// Reusable 2 MiB scratch buffer for [`frankenhash`].
pub struct FrankenhashScratch {
    mem: Vec<u8>,
}

impl FrankenhashScratch {
    /// Allocate the scratch, reporting failure instead of aborting.
    pub fn new() -> Result<Self, TryReserveError> {
        let mut mem = Vec::new();
        mem.try_reserve_exact(FRANKENHASH_MEMORY)?;
        mem.resize(FRANKENHASH_MEMORY, 0);
        Ok(Self { mem })
    }
}

impl Drop for FrankenhashScratch {
    fn drop(&mut self) {
        self.mem.zeroize();
    }
}

/// Whether a frankenhash digest satisfies the identity PoW predicate.
pub fn frankenhash_accepts(digest: &[u8; 64]) -> bool {
    digest[0] < ACCEPT_BOUND
}

/// Compute the memory-hard v0 digest of `public_key`.
///
/// Deterministic for a given input; the scratch carries no state
/// between calls.
pub fn frankenhash(public_key: &[u8], scratch: &mut FrankenhashScratch) -> [u8; 64] {
    let mut digest: [u8; 64] = Sha512::digest(public_key).into();
    let mem = scratch.mem.as_mut_slice();
    mem.fill(0);

    // One cipher instance streams through both phases.
    let mut key = [0u8; 32];
    let mut iv = [0u8; 8];
    key.copy_from_slice(&digest[..32]);
    iv.copy_from_slice(&digest[32..40]);
    let mut cipher = Salsa20::new(&key.into(), &iv.into());

    // Phase one: sequential chained fill.
    cipher.apply_keystream(&mut mem[..64]);
    let mut i = 64;
    while i < FRANKENHASH_MEMORY {
        mem.copy_within(i - 64..i, i);
        cipher.apply_keystream(&mut mem[i..i + 64]);
        i += 64;
    }

    // Phase two: data-dependent swaps between digest and buffer. The
    // index words are read in network byte order; the swap itself is a
    // raw 8-byte exchange.
    let mut w = 0;
    while w < WORDS {
        let idx1 = (be_word(mem, w) % 8) as usize * 8;
        let idx2 = (be_word(mem, w + 1) % WORDS as u64) as usize * 8;
        w += 2;

        let mut tmp = [0u8; 8];
        tmp.copy_from_slice(&mem[idx2..idx2 + 8]);
        mem[idx2..idx2 + 8].copy_from_slice(&digest[idx1..idx1 + 8]);
        digest[idx1..idx1 + 8].copy_from_slice(&tmp);

        cipher.apply_keystream(&mut digest);
    }

    digest
}

fn be_word(mem: &[u8], word_index: usize) -> u64 {
    let at = word_index * 8;
    u64::from_be_bytes(mem[at..at + 8].try_into().expect("8-byte window"))
}
