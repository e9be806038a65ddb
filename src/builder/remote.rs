//! Builder for remote Bloom filters.
//!
//! # Type-State Pattern
//!
//! Capacity and error rate are required; the builder only offers
//! `connect`/`build_with_store` once both are set:
//!
//! ```text
//! Initial → WithCapacity → Complete → RemoteBloomFilter
//!     ↓           ↓             ↓
//!  .capacity()  .error_rate()  .connect() / .build_with_store()
//! ```
//!
//! # Examples
//!
//! ```
//! use redbloom::builder::RemoteBloomFilterBuilder;
//! use redbloom::MemoryStore;
//!
//! let filter = RemoteBloomFilterBuilder::new("sessions")
//!     .capacity(50_000)
//!     .error_rate(0.001)
//!     .db(3)
//!     .build_with_store(MemoryStore::new())
//!     .unwrap();
//!
//! assert_eq!(filter.spec().db(), 3);
//! assert_eq!(filter.hash_count(), 10);
//! ```
//!
//! Missing parameters do not compile:
//!
//! ```compile_fail
//! use redbloom::builder::RemoteBloomFilterBuilder;
//! use redbloom::MemoryStore;
//!
//! let filter = RemoteBloomFilterBuilder::new("sessions")
//!     .capacity(50_000)
//!     .build_with_store(MemoryStore::new());
//! ```

use crate::core::spec::FilterSpec;
use crate::error::Result;
use crate::filters::RemoteBloomFilter;
use crate::store::{BatchLimits, BitStore, ConnectionOptions};
use std::marker::PhantomData;

#[cfg(feature = "redis")]
use crate::store::RedisStore;

/// Type-state marker: only the key is set.
#[derive(Debug)]
pub struct Initial;

/// Type-state marker: capacity is set.
#[derive(Debug)]
pub struct WithCapacity;

/// Type-state marker: all required parameters are set.
#[derive(Debug)]
pub struct Complete;

/// Builder for [`RemoteBloomFilter`] with type-state guarantees.
#[derive(Debug)]
pub struct RemoteBloomFilterBuilder<State> {
    key: Vec<u8>,
    capacity: u64,
    error_rate: f64,
    db: i64,
    limits: BatchLimits,
    options: ConnectionOptions,
    _state: PhantomData<State>,
}

impl RemoteBloomFilterBuilder<Initial> {
    /// Start a builder for the filter stored under `key`.
    #[must_use]
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            capacity: 0,
            error_rate: 0.0,
            db: 0,
            limits: BatchLimits::default(),
            options: ConnectionOptions::default(),
            _state: PhantomData,
        }
    }

    /// Number of items the filter is sized for (required).
    #[must_use]
    pub fn capacity(self, capacity: u64) -> RemoteBloomFilterBuilder<WithCapacity> {
        RemoteBloomFilterBuilder {
            capacity,
            ..self.transition()
        }
    }
}

impl RemoteBloomFilterBuilder<WithCapacity> {
    /// Target false positive rate at capacity, in (0, 1) (required).
    #[must_use]
    pub fn error_rate(self, error_rate: f64) -> RemoteBloomFilterBuilder<Complete> {
        RemoteBloomFilterBuilder {
            error_rate,
            ..self.transition()
        }
    }
}

impl<State> RemoteBloomFilterBuilder<State> {
    /// Database number (default 0).
    #[must_use]
    pub fn db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    /// Bounds on a single bulk command.
    #[must_use]
    pub fn batch_limits(mut self, limits: BatchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// How to reach Redis when finishing with `connect()`.
    #[must_use]
    pub fn connection(mut self, options: ConnectionOptions) -> Self {
        self.options = options;
        self
    }

    fn transition<Next>(self) -> RemoteBloomFilterBuilder<Next> {
        RemoteBloomFilterBuilder {
            key: self.key,
            capacity: self.capacity,
            error_rate: self.error_rate,
            db: self.db,
            limits: self.limits,
            options: self.options,
            _state: PhantomData,
        }
    }
}

impl RemoteBloomFilterBuilder<Complete> {
    /// The filter description gathered so far (not yet validated).
    #[must_use]
    pub fn spec(&self) -> FilterSpec {
        FilterSpec::new(self.key.clone(), self.capacity, self.error_rate).with_db(self.db)
    }

    /// Bind the filter to an existing store handle.
    ///
    /// # Errors
    ///
    /// See [`RemoteBloomFilter::with_store`].
    pub fn build_with_store<S: BitStore>(self, store: S) -> Result<RemoteBloomFilter<S>> {
        let filter = RemoteBloomFilter::with_store(self.spec(), store)?;
        Ok(filter.with_batch_limits(self.limits))
    }

    /// Connect to Redis with the configured [`ConnectionOptions`].
    ///
    /// # Errors
    ///
    /// See [`RemoteBloomFilter::connect`].
    #[cfg(feature = "redis")]
    #[cfg_attr(docsrs, doc(cfg(feature = "redis")))]
    pub fn connect(self) -> Result<RemoteBloomFilter<RedisStore>> {
        let spec = self.spec();
        spec.validate()?;
        let store = RedisStore::connect(&self.options, spec.db())?;
        let filter = RemoteBloomFilter::with_store(spec, store)?;
        Ok(filter.with_batch_limits(self.limits))
    }
}
