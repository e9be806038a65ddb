//! Optimal parameter calculation for remote Bloom filters.
//!
//! Given:
//! - `n`: expected number of elements (capacity)
//! - `ε`: target false positive rate
//!
//! Optimal parameters:
//! - `m = ceil(-n × ln(ε) / (ln 2)²)` (bits in filter)
//! - `k = max(1, round((m/n) × ln 2))` (number of hash functions)
//!
//! Expected false positive rate after `n` inserts:
//! - `p = (1 - e^(-kn/m))^k`
//!
//! # Layout Agreement
//!
//! No metadata is stored next to the bits. Every process that opens the same
//! key recomputes `m` and `k` from `(n, ε)`, so these formulas are applied
//! exactly as written, without minimum sizes or hash-count caps. Two processes
//! that disagree on `(n, ε)` end up with incompatible filters and nothing
//! detects it.
//!
//! # References
//!
//! - Bloom, Burton H. (1970). "Space/Time Trade-offs in Hash Coding with Allowable Errors"
//! - Kirsch & Mitzenmacher (2006). "Less Hashing, Same Performance: Building a Better Bloom Filter"

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

use crate::error::{RedBloomError, Result};
use std::f64::consts::LN_2;

/// Mathematical constant: (ln 2)² ≈ 0.4804530139182014
const LN2_SQUARED: f64 = LN_2 * LN_2;

/// Sizing derived from a capacity and error rate.
///
/// # Examples
///
/// ```
/// use redbloom::core::params::plan;
///
/// let params = plan(10_000, 0.1).unwrap();
/// assert_eq!(params.bit_size, 47_926);
/// assert_eq!(params.hash_count, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterParams {
    /// Total bits in the logical array (`m`).
    pub bit_size: u64,
    /// Number of bit positions per item (`k`).
    pub hash_count: u32,
}

/// Check that an error rate lies in the open interval (0, 1).
///
/// NaN is rejected as well.
///
/// # Errors
///
/// [`RedBloomError::ErrorRateOutOfBounds`] if the rate is not in (0, 1).
#[inline]
pub fn validate_error_rate(error_rate: f64) -> Result<()> {
    if !(error_rate > 0.0 && error_rate < 1.0) {
        return Err(RedBloomError::error_rate_out_of_bounds(error_rate));
    }
    Ok(())
}

/// Calculate optimal number of bits for given constraints.
///
/// Implements `m = ceil(-n × ln(ε) / (ln 2)²)`.
///
/// # Errors
///
/// - [`RedBloomError::InvalidCapacity`] if `capacity == 0`
/// - [`RedBloomError::ErrorRateOutOfBounds`] if `error_rate` not in (0, 1)
/// - [`RedBloomError::InvalidParameters`] if the result does not fit in `u64`
///
/// # Examples
///
/// ```
/// use redbloom::core::params::optimal_bit_count;
///
/// assert_eq!(optimal_bit_count(1000, 0.01).unwrap(), 9586);
/// assert_eq!(optimal_bit_count(200_000_000, 0.00001).unwrap(), 4_792_529_189);
/// ```
pub fn optimal_bit_count(capacity: u64, error_rate: f64) -> Result<u64> {
    if capacity == 0 {
        return Err(RedBloomError::invalid_capacity(capacity));
    }
    validate_error_rate(error_rate)?;

    let m = (-(capacity as f64) * error_rate.ln() / LN2_SQUARED).ceil();

    // u64::MAX as f64 rounds up to 2^64, so `>=` rejects anything that would saturate
    if !m.is_finite() || m >= u64::MAX as f64 {
        return Err(RedBloomError::invalid_parameters(format!(
            "calculated filter size {m:.0} bits exceeds u64 range"
        )));
    }

    Ok((m as u64).max(1))
}

/// Calculate optimal number of hash functions.
///
/// Implements `k = max(1, round((m/n) × ln 2))`.
///
/// # Errors
///
/// - [`RedBloomError::InvalidParameters`] if `bit_size == 0` or `k` overflows `u32`
/// - [`RedBloomError::InvalidCapacity`] if `capacity == 0`
///
/// # Examples
///
/// ```
/// use redbloom::core::params::optimal_hash_count;
///
/// assert_eq!(optimal_hash_count(9586, 1000).unwrap(), 7);
/// assert_eq!(optimal_hash_count(47_926, 10_000).unwrap(), 3);
/// ```
pub fn optimal_hash_count(bit_size: u64, capacity: u64) -> Result<u32> {
    if bit_size == 0 {
        return Err(RedBloomError::invalid_parameters("filter size must be positive"));
    }
    if capacity == 0 {
        return Err(RedBloomError::invalid_capacity(capacity));
    }

    let k = ((bit_size as f64 / capacity as f64) * LN_2).round();
    if k > f64::from(u32::MAX) {
        return Err(RedBloomError::invalid_parameters(format!(
            "hash count {k:.0} exceeds u32 range"
        )));
    }

    Ok((k as u32).max(1))
}

/// Compute the full sizing for a filter.
///
/// Both values are recomputed identically on every construction with the same
/// `(capacity, error_rate)`.
///
/// # Errors
///
/// See [`optimal_bit_count`] and [`optimal_hash_count`].
pub fn plan(capacity: u64, error_rate: f64) -> Result<FilterParams> {
    let bit_size = optimal_bit_count(capacity, error_rate)?;
    let hash_count = optimal_hash_count(bit_size, capacity)?;
    Ok(FilterParams {
        bit_size,
        hash_count,
    })
}

/// Calculate expected false positive rate for given parameters.
///
/// Implements `p = (1 - e^(-kn/m))^k`. Returns 0.0 when `n == 0` or `m == 0`.
///
/// # Examples
///
/// ```
/// use redbloom::core::params::expected_fp_rate;
///
/// let fp = expected_fp_rate(9586, 1000, 7);
/// assert!((fp - 0.01).abs() < 0.001);
/// ```
#[must_use]
pub fn expected_fp_rate(bit_size: u64, items: u64, hash_count: u32) -> f64 {
    if bit_size == 0 || items == 0 {
        return 0.0;
    }

    let k = f64::from(hash_count);
    let exponent = -(k * items as f64) / bit_size as f64;
    let prob_bit_one = 1.0 - exponent.exp();

    prob_bit_one.powf(k).clamp(0.0, 1.0)
}

/// False positive rate implied by the observed fraction of set bits.
///
/// A query for an absent item hits `k` independent bits, each set with
/// probability `set_bits / m`.
#[must_use]
pub fn fp_rate_from_fill(bit_size: u64, set_bits: u64, hash_count: u32) -> f64 {
    if bit_size == 0 {
        return 0.0;
    }
    let fill = (set_bits.min(bit_size)) as f64 / bit_size as f64;
    fill.powf(f64::from(hash_count)).clamp(0.0, 1.0)
}

/// Estimate how many distinct items were inserted from the number of set bits.
///
/// Uses the Swamidass & Baldi estimator `n* = -(m/k) × ln(1 - X/m)`.
/// A saturated filter has no finite estimate; `u64::MAX` is returned.
#[must_use]
pub fn estimate_cardinality(bit_size: u64, hash_count: u32, set_bits: u64) -> u64 {
    if bit_size == 0 || hash_count == 0 || set_bits == 0 {
        return 0;
    }
    if set_bits >= bit_size {
        return u64::MAX;
    }

    let m = bit_size as f64;
    let estimate = -(m / f64::from(hash_count)) * (1.0 - set_bits as f64 / m).ln();
    estimate.round() as u64
}
