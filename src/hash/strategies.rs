//! Index derivation from base hashes.
//!
//! # Double Hashing (Kirsch & Mitzenmacher 2006)
//!
//! For k positions derived from two independent hashes h₁ and h₂:
//!
//! ```text
//! gᵢ(x) = (h₁(x) + i·h₂(x)) mod m      for i in 0..k
//! ```
//!
//! The paper shows this matches the false positive rate of k independent hash
//! functions asymptotically, at the cost of one hash computation per item.
//!
//! # Exact Arithmetic
//!
//! The sum is evaluated as a mathematical integer, not with 64-bit
//! wrap-around: `g₀ = h₁ mod m` and `gᵢ₊₁ = (gᵢ + (h₂ mod m)) mod m`. Both
//! forms are congruent, and the incremental one needs no intermediate wider
//! than `2m`, so any language can reproduce it.
//!
//! # References
//!
//! - Kirsch, A., & Mitzenmacher, M. (2006). "Less Hashing, Same Performance: Building a Better Bloom Filter"

/// Standard double hashing over exact integers.
///
/// # Examples
///
/// ```
/// use redbloom::hash::DoubleHashing;
///
/// let indices = DoubleHashing.generate_indices(10, 7, 4, 20);
/// assert_eq!(indices, vec![10, 17, 4, 11]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleHashing;

impl DoubleHashing {
    /// Generate `k` indices in `[0, m)`.
    ///
    /// Returns an empty vector when `m == 0`.
    #[must_use]
    pub fn generate_indices(&self, h1: u64, h2: u64, k: u32, m: u64) -> Vec<u64> {
        let mut indices = Vec::with_capacity(k as usize);
        self.extend_indices(h1, h2, k, m, &mut indices);
        indices
    }

    /// Append `k` indices in `[0, m)` to `out`.
    #[inline]
    pub fn extend_indices(&self, h1: u64, h2: u64, k: u32, m: u64, out: &mut Vec<u64>) {
        if m == 0 {
            return;
        }
        let step = h2 % m;
        let mut index = h1 % m;

        for _ in 0..k {
            out.push(index);
            // index, step < m, so the sum fits in u128 and the result in u64
            index = ((u128::from(index) + u128::from(step)) % u128::from(m)) as u64;
        }
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        "DoubleHashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_double_hashing_basic() {
        let indices = DoubleHashing.generate_indices(12345, 67890, 7, 1000);

        assert_eq!(indices.len(), 7);
        assert!(indices.iter().all(|&idx| idx < 1000));
    }

    #[test]
    fn test_matches_closed_form_without_overflow() {
        let (h1, h2, m) = (u64::MAX - 3, u64::MAX - 11, 1_000_003u64);
        let indices = DoubleHashing.generate_indices(h1, h2, 5, m);

        for (i, &idx) in indices.iter().enumerate() {
            let exact = (u128::from(h1) + i as u128 * u128::from(h2)) % u128::from(m);
            assert_eq!(u128::from(idx), exact);
        }
    }

    #[test]
    fn test_zero_step_repeats_first_index() {
        assert_eq!(DoubleHashing.generate_indices(5, 100, 3, 100), vec![5, 5, 5]);
    }

    #[test]
    fn test_zero_size_is_empty() {
        assert!(DoubleHashing.generate_indices(1, 2, 3, 0).is_empty());
    }

    #[test]
    fn test_extend_appends() {
        let mut out = vec![42];
        DoubleHashing.extend_indices(1, 1, 2, 10, &mut out);
        assert_eq!(out, vec![42, 1, 2]);
    }

    proptest! {
        #[test]
        fn prop_indices_in_range(h1: u64, h2: u64, k in 1u32..40, m in 1u64..u64::MAX) {
            let indices = DoubleHashing.generate_indices(h1, h2, k, m);
            prop_assert_eq!(indices.len(), k as usize);
            prop_assert!(indices.iter().all(|&i| i < m));
        }
    }
}
