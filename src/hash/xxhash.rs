//! XXH3-128 item hasher.
//!
//! XXH3 is a fast, non-cryptographic hash by Yann Collet with a published,
//! versioned specification and reference test vectors, so any language can
//! reproduce it bit for bit. That matters here: the hash decides which remote
//! bits an item owns, and every client of a shared filter has to agree.
//!
//! # Pinned Parameters
//!
//! - Algorithm: XXH3 128-bit variant
//! - Seed: 0
//! - `h1` = low 64 bits of the digest, `h2` = high 64 bits
//!
//! Changing any of these invalidates every filter already written.
//!
//! # Implementation Note
//!
//! This module wraps the `xxhash-rust` crate.
//!
//! # References
//!
//! - XXHash Project: https://github.com/Cyan4973/xxHash
//! - Specification: https://github.com/Cyan4973/xxHash/blob/dev/doc/xxhash_spec.md

use super::hasher::ItemHasher;
use xxhash_rust::xxh3::xxh3_128;

/// The pinned XXH3-128 hasher used for every remote filter.
///
/// Zero-sized, `Copy`, and `Send + Sync`.
///
/// # Examples
///
/// ```
/// use redbloom::hash::{ItemHasher, Xxh3Hasher};
///
/// // Reference digest of the empty input: 99aa06d3014798d8_6001c324468d497f
/// let (h1, h2) = Xxh3Hasher.hash_pair(b"");
/// assert_eq!(h1, 0x6001_c324_468d_497f);
/// assert_eq!(h2, 0x99aa_06d3_0147_98d8);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xxh3Hasher;

impl ItemHasher for Xxh3Hasher {
    #[inline]
    fn hash_pair(&self, bytes: &[u8]) -> (u64, u64) {
        let digest = xxh3_128(bytes);
        (digest as u64, (digest >> 64) as u64)
    }

    #[inline]
    fn name(&self) -> &'static str {
        "XXH3-128"
    }
}
