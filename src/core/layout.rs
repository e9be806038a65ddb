//! Segment layout of the remote bit array.
//!
//! A store caps the size of a single string (512 MiB in Redis), so a logical
//! array of `m` bits is split into consecutive segments of `segment_bits`
//! bits each:
//!
//! ```text
//! global index:  0 ............ S-1 | S ........... 2S-1 | 2S ... m-1
//! segment key:   {key}.0            | {key}.1            | {key}.2
//! ```
//!
//! `global = segment × S + offset`, with `S` constant for the whole filter.
//! Segment names are derived, never listed, so a segment that has not been
//! written yet is still a valid (all-zero) part of the filter.

use crate::error::{RedBloomError, Result};

/// Redis' maximum string length: 512 MiB.
pub const REDIS_MAX_STRING_BYTES: u64 = 512 * 1024 * 1024;

/// Position of one bit inside the segmented array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitAddress {
    /// Zero-based segment number.
    pub segment: u64,
    /// Bit offset inside the segment.
    pub offset: u64,
}

/// How a filter's bits are spread over segments.
///
/// # Examples
///
/// ```
/// use redbloom::core::layout::{SegmentLayout, REDIS_MAX_STRING_BYTES};
///
/// let layout = SegmentLayout::new(4_792_529_189, REDIS_MAX_STRING_BYTES).unwrap();
/// assert_eq!(layout.segment_bits(), 1 << 32);
/// assert_eq!(layout.segment_count(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentLayout {
    bit_size: u64,
    segment_bits: u64,
    segment_count: u64,
}

impl SegmentLayout {
    /// Split `bit_size` bits into segments no larger than `max_string_bytes`.
    ///
    /// # Errors
    ///
    /// [`RedBloomError::InvalidParameters`] if either argument is zero or the
    /// byte limit cannot be expressed in bits.
    pub fn new(bit_size: u64, max_string_bytes: u64) -> Result<Self> {
        if bit_size == 0 {
            return Err(RedBloomError::invalid_parameters("filter size must be positive"));
        }
        let segment_bits = max_string_bytes.checked_mul(8).ok_or_else(|| {
            RedBloomError::invalid_parameters(format!(
                "maximum string size of {max_string_bytes} bytes overflows a bit offset"
            ))
        })?;
        if segment_bits == 0 {
            return Err(RedBloomError::invalid_parameters(
                "store maximum string size must be positive",
            ));
        }

        Ok(Self {
            bit_size,
            segment_bits,
            segment_count: bit_size.div_ceil(segment_bits),
        })
    }

    /// Total bits in the logical array.
    #[must_use]
    pub fn bit_size(&self) -> u64 {
        self.bit_size
    }

    /// Bits per segment (a multiple of 8).
    #[must_use]
    pub fn segment_bits(&self) -> u64 {
        self.segment_bits
    }

    /// Number of segments, `ceil(bit_size / segment_bits)`.
    #[must_use]
    pub fn segment_count(&self) -> u64 {
        self.segment_count
    }

    /// Map a global bit index to its segment and offset.
    #[inline]
    #[must_use]
    pub fn locate(&self, global: u64) -> BitAddress {
        debug_assert!(global < self.bit_size);
        BitAddress {
            segment: global / self.segment_bits,
            offset: global % self.segment_bits,
        }
    }

    /// Inverse of [`SegmentLayout::locate`].
    #[inline]
    #[must_use]
    pub fn global_index(&self, address: BitAddress) -> u64 {
        address.segment * self.segment_bits + address.offset
    }

    /// Names of every segment, in order: `{key}.0 … {key}.(n-1)`.
    #[must_use]
    pub fn segment_keys(&self, key: &[u8]) -> Vec<Vec<u8>> {
        (0..self.segment_count).map(|i| segment_key(key, i)).collect()
    }
}

/// Name of segment `index` of the filter stored under `key`.
#[must_use]
pub fn segment_key(key: &[u8], index: u64) -> Vec<u8> {
    let suffix = index.to_string();
    let mut name = Vec::with_capacity(key.len() + 1 + suffix.len());
    name.extend_from_slice(key);
    name.push(b'.');
    name.extend_from_slice(suffix.as_bytes());
    name
}
