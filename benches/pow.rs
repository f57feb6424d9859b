//! Benchmarks for the proof-of-work hash functions.
//!
//! Run with: cargo bench --bench pow
//!
//! Single-evaluation cost is what matters here: expected generation
//! time is roughly 15 frankenhash runs for a type-0 identity and 180
//! memhash runs for a type-1 identity.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trellis_identity::pow::{frankenhash, memhash_accepts, FrankenhashScratch, MemhashScratch};

fn bench_frankenhash(c: &mut Criterion) {
    let mut group = c.benchmark_group("pow_v0");
    group.sample_size(20);

    let mut scratch = FrankenhashScratch::new().unwrap();
    let public_key = [0x5au8; 64];
    group.bench_function("frankenhash_2mib", |b| {
        b.iter(|| frankenhash(black_box(&public_key), &mut scratch))
    });

    group.finish();
}

fn bench_memhash(c: &mut Criterion) {
    let mut group = c.benchmark_group("pow_v1");
    group.sample_size(20);

    let mut scratch = MemhashScratch::new().unwrap();
    let public_blob = [0xa5u8; 114];
    group.bench_function("memhash_768kib", |b| {
        b.iter(|| memhash_accepts(black_box(&public_blob), &mut scratch))
    });

    group.finish();
}

criterion_group!(benches, bench_frankenhash, bench_memhash);
criterion_main!(benches);
