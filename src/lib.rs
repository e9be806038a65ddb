//! redbloom: Bloom filters stored in Redis and shared between processes.
//!
//! The bit array of a [`RemoteBloomFilter`] lives in one or more Redis strings
//! instead of local memory. Any number of processes that open the same
//! `(key, capacity, error_rate, db)` share one filter, and every operation,
//! whether it touches one item or a million, is a single pipelined
//! round-trip.
//!
//! # What are Bloom Filters?
//!
//! A Bloom filter is a space-efficient probabilistic data structure that tests whether
//! an element is a member of a set. It can produce:
//! - **False positives**: May indicate an element is in the set when it isn't
//! - **Zero false negatives**: If it says an element isn't in the set, it definitely isn't
//!
//! # Quick Start
//!
//! ```no_run
//! use redbloom::store::ConnectionOptions;
//! use redbloom::RemoteBloomFilter;
//!
//! # fn main() -> redbloom::Result<()> {
//! // 100k items at 1% false positives, stored under "seen" in db 0
//! let filter = RemoteBloomFilter::connect("seen", 100_000, 0.01, 0, &ConnectionOptions::default())?;
//!
//! filter.add("hello")?;
//! filter.update(&["world", "again"])?;
//!
//! assert!(filter.contains("hello")?);
//! assert_eq!(filter.intersection(&["hello", "nope"])?, vec!["hello"]);
//! # Ok(())
//! # }
//! ```
//!
//! The same API works on any [`BitStore`](store::BitStore); [`MemoryStore`]
//! reproduces Redis semantics in-process:
//!
//! ```
//! use redbloom::{FilterSpec, MemoryStore, RemoteBloomFilter};
//!
//! let filter = RemoteBloomFilter::with_store(FilterSpec::new("seen", 1000, 0.01), MemoryStore::new()).unwrap();
//! assert!(filter.add("hello").unwrap());
//! assert!(filter.contains("hello").unwrap());
//! ```
//!
//! # Layout in the Store
//!
//! | Parameter | Value |
//! |-----------|-------|
//! | bits `m` | `ceil(-n·ln p / (ln 2)²)` |
//! | hashes `k` | `round(m/n · ln 2)`, at least 1 |
//! | segment size | 512 MiB = 2³² bits |
//! | keys | `{key}.0 … {key}.(s-1)` |
//! | bit `i` | key `{key}.(i / 2³²)`, offset `i mod 2³²` |
//!
//! Bit positions come from XXH3-128 (seed 0) with exact double hashing; see
//! [`hash`] for the golden vector other implementations can check against.
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `redis` | yes | [`RedisStore`] and `connect` constructors |
//! | `serde` | no | Serialize/deserialize specs, parameters and options |
//! | `rayon` | no | Parallel hashing for large batches |
//! | `metrics` | no | Per-filter operation counters |
//!
//! # Errors
//!
//! Nothing is retried and there is no local fallback: an unreachable store is a
//! [`RedBloomError::Connection`], a segment key holding a hash or list is a
//! [`RedBloomError::TypeMismatch`]. See [`error`].
//!
//! # Logging
//!
//! Events are emitted through `tracing`; install a subscriber to see them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::bool_assert_comparison)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_root_url = "https://docs.rs/redbloom/0.1.0")]

/// Sizing, layout and filter description
pub mod core;

/// Error types and result aliases
pub mod error;

/// The filter façade
pub mod filters;

/// Item hashing and bit addressing
pub mod hash;

/// Grouping item batches into bulk commands
pub mod batch;

/// Backing stores
pub mod store;

/// Type-safe builder
pub mod builder;

/// Operation counters (requires `metrics` feature)
#[cfg(feature = "metrics")]
#[cfg_attr(docsrs, doc(cfg(feature = "metrics")))]
pub mod metrics;

pub use error::{ErrorKind, RedBloomError, Result};

pub use crate::core::{FilterParams, FilterSpec, SegmentLayout};

pub use filters::{FilterHealth, RemoteBloomFilter};

pub use builder::RemoteBloomFilterBuilder;

pub use store::{BitStore, ConnectionOptions, MemoryStore};

#[cfg(feature = "redis")]
pub use store::RedisStore;

#[cfg(feature = "metrics")]
pub use metrics::{FilterMetrics, MetricsSnapshot};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use redbloom::prelude::*;
///
/// let filter = RemoteBloomFilterBuilder::new("p")
///     .capacity(100)
///     .error_rate(0.01)
///     .build_with_store(MemoryStore::new())
///     .unwrap();
/// assert!(filter.add("x").unwrap());
/// ```
pub mod prelude {
    pub use crate::builder::RemoteBloomFilterBuilder;
    pub use crate::core::{FilterParams, FilterSpec};
    pub use crate::error::{RedBloomError, Result};
    pub use crate::filters::{FilterHealth, RemoteBloomFilter};
    pub use crate::store::{BitStore, ConnectionOptions, MemoryStore};

    #[cfg(feature = "redis")]
    pub use crate::store::RedisStore;

    #[cfg(feature = "metrics")]
    pub use crate::metrics::FilterMetrics;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_prelude_imports() {
        let filter = RemoteBloomFilter::with_store(FilterSpec::new("t", 100, 0.01), MemoryStore::new()).unwrap();
        filter.add("test").unwrap();
        assert!(filter.contains("test").unwrap());
    }

    #[test]
    fn test_filter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RemoteBloomFilter<MemoryStore>>();
        #[cfg(feature = "redis")]
        assert_send_sync::<RemoteBloomFilter<RedisStore>>();
    }

    #[test]
    fn test_shared_across_threads() {
        let filter = Arc::new(
            RemoteBloomFilter::with_store(FilterSpec::new("th", 10_000, 0.01), MemoryStore::new()).unwrap(),
        );

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let filter = Arc::clone(&filter);
                std::thread::spawn(move || {
                    let items: Vec<String> = (0..100).map(|i| format!("{t}-{i}")).collect();
                    filter.update(&items).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for t in 0..4 {
            assert!(filter.contains(format!("{t}-99")).unwrap());
        }
    }

    #[test]
    fn test_boxed_store() {
        let store: Box<dyn BitStore> = Box::new(MemoryStore::new());
        let filter = RemoteBloomFilter::with_store(FilterSpec::new("b", 100, 0.01), store).unwrap();
        assert!(filter.add("x").unwrap());
    }
}
