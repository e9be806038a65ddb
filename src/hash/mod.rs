//! Item hashing and bit-index derivation.
//!
//! # Module Structure
//!
//! ```text
//! hash/
//! ├── hasher.rs      - ItemHasher trait (bytes → (h1, h2))
//! ├── xxhash.rs      - Xxh3Hasher, the pinned XXH3-128 implementation
//! ├── strategies.rs  - DoubleHashing ((h1, h2) → k indices)
//! └── mod.rs         - This file (HashScheme and addresses())
//! ```
//!
//! # Quick Start
//!
//! ```
//! use redbloom::hash::addresses;
//!
//! let bits = addresses(b"", 1000, 3);
//! assert_eq!(bits, vec![999, 239, 479]);
//! ```
//!
//! # Interoperability
//!
//! The scheme is fixed: XXH3-128 with seed 0, low half as `h1`, high half as
//! `h2`, exact double hashing modulo `m`. Another implementation reading or
//! writing the same store must reproduce it exactly; the golden vector above is
//! the quickest way to check.

pub mod hasher;
pub mod strategies;
pub mod xxhash;

pub use hasher::ItemHasher;
pub use strategies::DoubleHashing;
pub use xxhash::Xxh3Hasher;

/// Hasher and strategy bundled together.
///
/// # Examples
///
/// ```
/// use redbloom::hash::HashScheme;
///
/// let scheme: HashScheme = HashScheme::default();
/// let bits = scheme.addresses(b"hello", 47_926, 3);
/// assert_eq!(bits.len(), 3);
/// assert!(bits.iter().all(|&b| b < 47_926));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HashScheme<H = Xxh3Hasher> {
    hasher: H,
    strategy: DoubleHashing,
}

impl<H: ItemHasher> HashScheme<H> {
    /// Use a custom base hasher.
    ///
    /// Filters written with one hasher cannot be read with another.
    #[must_use]
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            hasher,
            strategy: DoubleHashing,
        }
    }

    /// The `hash_count` global bit indices of `item`, in derivation order.
    #[must_use]
    pub fn addresses(&self, item: &[u8], bit_size: u64, hash_count: u32) -> Vec<u64> {
        let mut out = Vec::with_capacity(hash_count as usize);
        self.extend_addresses(item, bit_size, hash_count, &mut out);
        out
    }

    /// Append the global bit indices of `item` to `out`.
    #[inline]
    pub fn extend_addresses(&self, item: &[u8], bit_size: u64, hash_count: u32, out: &mut Vec<u64>) {
        let (h1, h2) = self.hasher.hash_pair(item);
        self.strategy.extend_indices(h1, h2, hash_count, bit_size, out);
    }

    /// Name of the base hasher.
    #[must_use]
    pub fn hasher_name(&self) -> &'static str {
        self.hasher.name()
    }

    /// Name of the index derivation strategy.
    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }
}

/// Global bit indices of `item` under the default scheme.
#[must_use]
pub fn addresses(item: &[u8], bit_size: u64, hash_count: u32) -> Vec<u64> {
    HashScheme::<Xxh3Hasher>::default().addresses(item, bit_size, hash_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_golden_vectors() {
        assert_eq!(addresses(b"", 1000, 3), vec![999, 239, 479]);
        assert_eq!(addresses(b"", 47_926, 3), vec![30_273, 21_297, 12_321]);
    }

    #[test]
    fn test_length_equals_hash_count() {
        assert_eq!(addresses(b"x", 100, 17).len(), 17);
        assert_eq!(addresses(b"x", 100, 1).len(), 1);
    }

    #[test]
    fn test_custom_hasher() {
        struct Fixed;
        impl ItemHasher for Fixed {
            fn hash_pair(&self, _bytes: &[u8]) -> (u64, u64) {
                (3, 4)
            }
            fn name(&self) -> &'static str {
                "Fixed"
            }
        }

        let scheme = HashScheme::with_hasher(Fixed);
        assert_eq!(scheme.addresses(b"anything", 10, 3), vec![3, 7, 1]);
        assert_eq!(scheme.hasher_name(), "Fixed");
        assert_eq!(scheme.strategy_name(), "DoubleHashing");
    }

    proptest! {
        #[test]
        fn prop_deterministic_and_in_range(item: Vec<u8>, m in 1u64..10_000_000_000, k in 1u32..32) {
            let first = addresses(&item, m, k);
            prop_assert_eq!(&first, &addresses(&item, m, k));
            prop_assert!(first.iter().all(|&b| b < m));
        }
    }
}
