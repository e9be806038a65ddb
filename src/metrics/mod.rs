//! Observability for remote filters.
//!
//! Enabled with the `metrics` feature. A [`RemoteBloomFilter`](crate::RemoteBloomFilter)
//! then carries a [`FilterMetrics`] updated on every operation:
//!
//! ```text
//! add/update ─────► items_added, items_new
//! contains/... ───► queries, positives
//! every request ──► round_trips
//! failures ───────► errors
//! ```
//!
//! Counters are relaxed atomics; a snapshot is consistent per counter, not
//! across counters.

mod collector;

pub use collector::{FilterMetrics, MetricsSnapshot};
