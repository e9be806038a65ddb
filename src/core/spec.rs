//! Identity and sizing inputs of one logical filter.

use super::params::{self, FilterParams};
use crate::error::{RedBloomError, Result};

/// Immutable description of a shared filter.
///
/// Every process that constructs a filter from an equal `FilterSpec` talks to
/// the same remote bits with the same layout.
///
/// # Examples
///
/// ```
/// use redbloom::core::FilterSpec;
///
/// let spec = FilterSpec::new(b"visitors".to_vec(), 10_000, 0.01).with_db(2);
/// assert!(spec.validate().is_ok());
/// assert_eq!(spec.db(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterSpec {
    key: Vec<u8>,
    capacity: u64,
    error_rate: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    db: i64,
}

impl FilterSpec {
    /// Describe a filter in database 0.
    #[must_use]
    pub fn new(key: impl Into<Vec<u8>>, capacity: u64, error_rate: f64) -> Self {
        Self {
            key: key.into(),
            capacity,
            error_rate,
            db: 0,
        }
    }

    /// Select the logical database the segments live in.
    #[must_use]
    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Key prefix of every segment.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Expected number of items.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Target false positive rate at capacity.
    #[must_use]
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Logical database index.
    #[must_use]
    pub fn db(&self) -> i64 {
        self.db
    }

    /// Check every field without touching the store.
    ///
    /// # Errors
    ///
    /// - [`RedBloomError::InvalidParameters`] for an empty key
    /// - [`RedBloomError::InvalidCapacity`] for zero capacity
    /// - [`RedBloomError::ErrorRateOutOfBounds`] for a rate outside (0, 1)
    /// - [`RedBloomError::InvalidDatabase`] for a negative db
    pub fn validate(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(RedBloomError::invalid_parameters("filter key must not be empty"));
        }
        if self.capacity == 0 {
            return Err(RedBloomError::invalid_capacity(self.capacity));
        }
        params::validate_error_rate(self.error_rate)?;
        if self.db < 0 {
            return Err(RedBloomError::invalid_database(self.db));
        }
        Ok(())
    }

    /// Validate and compute `m` and `k`.
    ///
    /// # Errors
    ///
    /// See [`FilterSpec::validate`] and [`params::plan`].
    pub fn plan(&self) -> Result<FilterParams> {
        self.validate()?;
        params::plan(self.capacity, self.error_rate)
    }
}
