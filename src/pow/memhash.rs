//! The v1 memory-hard accept/reject hash over 768 KiB.
//!
//! Simpler and more orderly than the v0 frankenhash but still
//! unfriendly to massively parallel hardware: a sequential
//! chained-block walk fills 98 304 64-bit words from an 8-word SHA-512
//! seed using reduced-round Speck-128, the whole array is then sorted
//! (forcing full materialization and branchy access patterns), and a
//! final SHA-384 over the sorted words plus the original input decides
//! acceptance. All word I/O is little-endian regardless of host order.

use std::collections::TryReserveError;

use sha2::{Digest, Sha384, Sha512};
use zeroize::Zeroize;

use crate::crypto::speck::{Speck128, POW_ROUNDS};

/// Scratch size in 64-bit words (768 KiB).
pub const MEMHASH_WORDS: usize = 98_304;

/// Acceptance modulus. Tuned so a full type-1 generation lands around
/// one to two seconds on a contemporary desktop core.
const ACCEPT_MODULUS: u64 = 180;

/// Reusable word buffer for [`memhash_accepts`].
pub struct MemhashScratch {
    words: Vec<u64>,
}

impl MemhashScratch {
    /// Allocate the scratch, reporting failure instead of aborting.
    pub fn new() -> Result<Self, TryReserveError> {
        let mut words = Vec::new();
        words.try_reserve_exact(MEMHASH_WORDS)?;
        words.resize(MEMHASH_WORDS, 0);
        Ok(Self { words })
    }
}

impl Drop for MemhashScratch {
    fn drop(&mut self) {
        self.words.zeroize();
    }
}

/// Run the v1 proof-of-work function over `input`.
///
/// Returns the accept/reject bit. Deterministic for a given input;
/// every word of the scratch is overwritten before it is read.
pub fn memhash_accepts(input: &[u8], scratch: &mut MemhashScratch) -> bool {
    let b = scratch.words.as_mut_slice();

    let seed: [u8; 64] = Sha512::digest(input).into();
    for (word, bytes) in b[..8].iter_mut().zip(seed.chunks_exact(8)) {
        *word = u64::from_le_bytes(bytes.try_into().expect("8-byte chunk"));
    }

    // Chained 4-block walk: load 8 words, mix across blocks, encrypt,
    // store 8 words ahead. Each step depends on the previous store, so
    // the walk cannot be parallelized or recomputed piecemeal.
    let cipher = Speck128::with_rounds(POW_ROUNDS, b[4], b[5]);
    let mut i = 0;
    while i < MEMHASH_WORDS - 8 {
        let mut w: [u64; 8] = b[i..i + 8].try_into().expect("8-word window");
        i += 8;

        w[0] = w[0].wrapping_add(w[2]);
        w[2] = w[2].wrapping_add(w[4]);
        w[4] = w[4].wrapping_add(w[6]);
        w[6] = w[6].wrapping_add(w[1]);

        cipher.encrypt_four(&mut w);
        b[i..i + 8].copy_from_slice(&w);
    }

    // The sort requires the whole data set in memory, or at least that
    // is the most efficient implementation.
    b.sort_unstable();

    let mut hasher = Sha384::new();
    let mut block = [0u8; 4096];
    for chunk in b.chunks(block.len() / 8) {
        for (bytes, word) in block.chunks_exact_mut(8).zip(chunk) {
            bytes.copy_from_slice(&word.to_le_bytes());
        }
        hasher.update(&block[..chunk.len() * 8]);
    }
    hasher.update(input);
    let final_hash = hasher.finalize();

    let z0 = u64::from_le_bytes(final_hash[..8].try_into().expect("8-byte window"));
    let z1 = u64::from_le_bytes(final_hash[8..16].try_into().expect("8-byte window"));
    z0.wrapping_add(z1) % ACCEPT_MODULUS == 0
}
