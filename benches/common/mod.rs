//! Shared data generators for the benchmarks.
#![allow(dead_code)]

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Batch sizes used by the batching benchmarks.
pub const BATCH_SIZES: &[usize] = &[1, 10, 100, 1_000, 10_000];

/// Deterministic alphanumeric strings of length `len`.
pub fn generate_strings(count: usize, len: usize) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(0xb100);
    (0..count)
        .map(|_| (&mut rng).sample_iter(&Alphanumeric).take(len).map(char::from).collect())
        .collect()
}

/// URL-like strings, the typical crawler dedup workload.
pub fn generate_urls(count: usize) -> Vec<String> {
    generate_strings(count, 16)
        .into_iter()
        .map(|path| format!("https://example.com/path/{path}"))
        .collect()
}
