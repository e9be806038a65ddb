//! Bloom filter whose bit array lives in a shared store.
//!
//! A [`RemoteBloomFilter`] is a thin, stateless view over `{key}.0 … {key}.(s-1)`
//! in one database of a [`BitStore`]. It keeps no bits locally: every
//! operation is one pipelined round-trip, and any number of processes holding a
//! filter with the same `(key, capacity, error_rate, db)` see one filter.
//!
//! # Examples
//!
//! ```
//! use redbloom::{FilterSpec, MemoryStore, RemoteBloomFilter};
//!
//! # fn main() -> redbloom::Result<()> {
//! let store = MemoryStore::new();
//! let filter = RemoteBloomFilter::with_store(FilterSpec::new("users", 10_000, 0.01), store.clone())?;
//!
//! assert!(filter.add("alice")?);
//! assert!(!filter.add("alice")?);
//! assert_eq!(filter.update(&["bob", "carol", "alice"])?, 2);
//!
//! assert!(filter.contains("bob")?);
//! assert_eq!(filter.intersection(&["alice", "mallory", "carol"])?, vec!["alice", "carol"]);
//!
//! // A second handle on the same store sees the same bits.
//! let other = RemoteBloomFilter::with_store(FilterSpec::new("users", 10_000, 0.01), store)?;
//! assert!(other.contains("carol")?);
//!
//! filter.delete()?;
//! assert!(!other.contains("carol")?);
//! # Ok(())
//! # }
//! ```

use super::health::FilterHealth;
use crate::batch::CommandBatcher;
use crate::core::layout::SegmentLayout;
use crate::core::params::{self, FilterParams};
use crate::core::spec::FilterSpec;
use crate::error::Result;
use crate::store::{BatchLimits, BitStore};
use parking_lot::Mutex;
use tracing::{debug, warn};

#[cfg(feature = "metrics")]
use crate::metrics::FilterMetrics;

#[cfg(feature = "redis")]
use crate::store::{ConnectionOptions, RedisStore};

/// A Bloom filter stored in a [`BitStore`].
///
/// All operations take `&self`; the store handle is behind a mutex, so a
/// filter can be shared between threads with `Arc`.
#[derive(Debug)]
pub struct RemoteBloomFilter<S> {
    spec: FilterSpec,
    params: FilterParams,
    batcher: CommandBatcher,
    store: Mutex<S>,
    #[cfg(feature = "metrics")]
    metrics: FilterMetrics,
}

#[cfg(feature = "redis")]
impl RemoteBloomFilter<RedisStore> {
    /// Connect to Redis and bind to the filter stored under `key` in `db`.
    ///
    /// Parameters are validated before any connection is attempted.
    ///
    /// # Errors
    ///
    /// A validation error for bad parameters, [`RedBloomError::Connection`](crate::RedBloomError::Connection)
    /// if the server is unreachable or rejects the password.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use redbloom::{store::ConnectionOptions, RemoteBloomFilter};
    ///
    /// # fn main() -> redbloom::Result<()> {
    /// let options = ConnectionOptions::default().password("s3cret");
    /// let filter = RemoteBloomFilter::connect("visited", 1_000_000, 0.001, 0, &options)?;
    /// filter.add("https://example.com")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn connect(
        key: impl Into<Vec<u8>>,
        capacity: u64,
        error_rate: f64,
        db: i64,
        options: &ConnectionOptions,
    ) -> Result<Self> {
        let spec = FilterSpec::new(key, capacity, error_rate).with_db(db);
        spec.validate()?;
        let store = RedisStore::connect(options, db)?;
        Self::with_store(spec, store)
    }
}

impl<S: BitStore> RemoteBloomFilter<S> {
    /// Bind to the filter described by `spec` using `store`.
    ///
    /// Validates `spec`, derives size and hash count, selects the database
    /// and pings the store.
    ///
    /// # Errors
    ///
    /// Validation errors for `spec`, or any store error from `SELECT`/`PING`.
    pub fn with_store(spec: FilterSpec, mut store: S) -> Result<Self> {
        let params = spec.plan()?;
        let layout = SegmentLayout::new(params.bit_size, store.max_string_bytes())?;

        store.select(spec.db())?;
        store.ping()?;

        debug!(
            key = %String::from_utf8_lossy(spec.key()),
            db = spec.db(),
            capacity = spec.capacity(),
            error_rate = spec.error_rate(),
            bit_size = params.bit_size,
            hash_count = params.hash_count,
            segments = layout.segment_count(),
            "Bound remote Bloom filter"
        );

        Ok(Self {
            batcher: CommandBatcher::new(spec.key(), layout, params.hash_count),
            spec,
            params,
            store: Mutex::new(store),
            #[cfg(feature = "metrics")]
            metrics: FilterMetrics::new(),
        })
    }

    /// Limit the number of offsets per bulk command.
    #[must_use]
    pub fn with_batch_limits(mut self, limits: BatchLimits) -> Self {
        self.batcher = self.batcher.with_limits(limits);
        self
    }

    /// Add one item. Returns `true` if it was not already present.
    ///
    /// # Errors
    ///
    /// Any store error; see [`RemoteBloomFilter::update`].
    pub fn add(&self, item: impl AsRef<[u8]>) -> Result<bool> {
        Ok(self.add_batch(&[item])?.first().copied().unwrap_or(false))
    }

    /// Add every item in one round-trip. Returns how many were new.
    ///
    /// An item repeated within `items` counts once. An empty slice costs
    /// nothing.
    ///
    /// # Errors
    ///
    /// [`RedBloomError::TypeMismatch`](crate::RedBloomError::TypeMismatch) if a
    /// segment key holds a non-string value, connection and protocol errors
    /// from the store. Bits written before the failure stay set, so the call
    /// can be repeated.
    pub fn update<T: AsRef<[u8]>>(&self, items: &[T]) -> Result<usize> {
        Ok(self.add_batch(items)?.into_iter().filter(|&new| new).count())
    }

    /// Add every item in one round-trip, reporting per item whether it was new.
    ///
    /// # Errors
    ///
    /// As [`RemoteBloomFilter::update`].
    pub fn add_batch<T: AsRef<[u8]>>(&self, items: &[T]) -> Result<Vec<bool>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let outcome = self.batcher.add_all(&mut *self.store.lock(), items);
        self.observe(&outcome);

        #[cfg(feature = "metrics")]
        if let Ok(new) = &outcome {
            let fresh = new.iter().filter(|&&n| n).count();
            self.metrics.record_add(items.len() as u64, fresh as u64);
        }
        outcome
    }

    /// Whether `item` may be in the filter. `false` is definitive.
    ///
    /// # Errors
    ///
    /// Any store error.
    pub fn contains(&self, item: impl AsRef<[u8]>) -> Result<bool> {
        Ok(self.contains_batch(&[item])?.first().copied().unwrap_or(false))
    }

    /// Membership of every item, in one round-trip.
    ///
    /// # Errors
    ///
    /// Any store error.
    pub fn contains_batch<T: AsRef<[u8]>>(&self, items: &[T]) -> Result<Vec<bool>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let outcome = self.batcher.contains_all(&mut *self.store.lock(), items);
        self.observe(&outcome);

        #[cfg(feature = "metrics")]
        if let Ok(present) = &outcome {
            let hits = present.iter().filter(|&&p| p).count();
            self.metrics.record_query(items.len() as u64, hits as u64);
        }
        outcome
    }

    /// The items that may be in the filter, in their original order.
    ///
    /// # Errors
    ///
    /// Any store error.
    pub fn intersection<T: AsRef<[u8]> + Clone>(&self, items: &[T]) -> Result<Vec<T>> {
        let present = self.contains_batch(items)?;
        Ok(items
            .iter()
            .zip(present)
            .filter_map(|(item, hit)| hit.then(|| item.clone()))
            .collect())
    }

    /// Remove every segment of the filter. It reads as empty afterwards.
    ///
    /// # Errors
    ///
    /// Any store error.
    pub fn delete(&self) -> Result<()> {
        let outcome = self.store.lock().delete(self.keys());
        self.observe(&outcome);
        let removed = outcome?;

        #[cfg(feature = "metrics")]
        self.metrics.record_delete();
        debug!(
            key = %String::from_utf8_lossy(self.spec.key()),
            removed,
            "Deleted remote Bloom filter"
        );
        Ok(())
    }

    /// Names of all segment keys, `{key}.0 … {key}.(s-1)`, whether or not they
    /// exist yet.
    #[must_use]
    pub fn keys(&self) -> &[Vec<u8>] {
        self.batcher.keys()
    }

    /// Number of bits set across all segments.
    ///
    /// # Errors
    ///
    /// Any store error.
    pub fn count_set_bits(&self) -> Result<u64> {
        let outcome = self.store.lock().count_bits(self.keys());
        self.observe(&outcome);
        Ok(outcome?.into_iter().sum())
    }

    /// Estimated number of distinct items added, from the number of set bits.
    ///
    /// # Errors
    ///
    /// Any store error.
    pub fn estimated_len(&self) -> Result<u64> {
        let set = self.count_set_bits()?;
        Ok(params::estimate_cardinality(self.bit_size(), self.hash_count(), set))
    }

    /// False positive rate implied by the current fill.
    ///
    /// # Errors
    ///
    /// Any store error.
    pub fn current_fp_rate(&self) -> Result<f64> {
        let set = self.count_set_bits()?;
        Ok(params::fp_rate_from_fill(self.bit_size(), set, self.hash_count()))
    }

    /// Compare the filter's fill with its design error rate.
    ///
    /// # Errors
    ///
    /// Any store error.
    pub fn health_check(&self) -> Result<FilterHealth> {
        let set = self.count_set_bits()?;
        let (m, k) = (self.bit_size(), self.hash_count());
        let health = FilterHealth::classify(
            set.min(m) as f64 / m as f64,
            params::fp_rate_from_fill(m, set, k),
            self.spec.error_rate(),
            params::estimate_cardinality(m, k, set),
        );
        if !health.is_healthy() {
            warn!(key = %String::from_utf8_lossy(self.spec.key()), %health, "Remote Bloom filter is saturating");
        }
        Ok(health)
    }

    fn observe<R>(&self, outcome: &Result<R>) {
        #[cfg(feature = "metrics")]
        {
            self.metrics.record_round_trip();
            if outcome.is_err() {
                self.metrics.record_error();
            }
        }
        #[cfg(not(feature = "metrics"))]
        let _ = outcome;
    }
}

impl<S> RemoteBloomFilter<S> {
    /// Parameters this filter was created with.
    #[must_use]
    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Derived size and hash count.
    #[must_use]
    pub fn params(&self) -> FilterParams {
        self.params
    }

    /// Logical size `m` in bits.
    #[must_use]
    pub fn bit_size(&self) -> u64 {
        self.params.bit_size
    }

    /// Bits set per item, `k`.
    #[must_use]
    pub fn hash_count(&self) -> u32 {
        self.params.hash_count
    }

    /// Number of segment keys.
    #[must_use]
    pub fn segment_count(&self) -> u64 {
        self.batcher.layout().segment_count()
    }

    /// How bits are split over segments.
    #[must_use]
    pub fn layout(&self) -> &SegmentLayout {
        self.batcher.layout()
    }

    /// Operation counters.
    #[cfg(feature = "metrics")]
    #[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
    #[must_use]
    pub fn metrics(&self) -> &FilterMetrics {
        &self.metrics
    }

    /// Give back the store handle.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store.into_inner()
    }
}
