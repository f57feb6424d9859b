//! Memory-hard proof-of-work functions gating identity generation.
//!
//! Minting an identity requires grinding key material until a rare
//! hash predicate holds. Both functions are deliberately hostile to
//! GPU/ASIC acceleration: each evaluation walks a multi-megabyte
//! working set with data-dependent accesses (v0) or materializes and
//! sorts the whole set (v1), so recompute-instead-of-store strategies
//! lose.
//!
//! | Version | Scratch | Core | Used by |
//! |---------|---------|---------------------------|-----------------|
//! | v0      | 2 MiB   | Salsa20 fill + swap walk  | type-0 (C25519) |
//! | v1      | 768 KiB | Speck-128/24 mix + sort   | type-1 (P384)   |
//!
//! Scratch buffers are reusable across evaluations, report allocation
//! failure instead of aborting, and are zeroized when dropped.

mod frankenhash;
mod memhash;

pub use frankenhash::{frankenhash, frankenhash_accepts, FrankenhashScratch, FRANKENHASH_MEMORY};
pub use memhash::{memhash_accepts, MemhashScratch, MEMHASH_WORDS};

#[cfg(test)]
mod tests;
