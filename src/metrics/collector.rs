//! Operation counters for a remote filter.
//!
//! # Examples
//!
//! ```
//! use redbloom::metrics::FilterMetrics;
//!
//! let metrics = FilterMetrics::new();
//! metrics.record_add(3, 2);
//! metrics.record_query(4, 1);
//! metrics.record_round_trip();
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.items_added, 3);
//! assert_eq!(snapshot.items_new, 2);
//! assert_eq!(snapshot.queries, 4);
//! assert_eq!(snapshot.positives, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Lock-free counters updated by every façade operation.
#[derive(Debug)]
pub struct FilterMetrics {
    items_added: AtomicU64,
    items_new: AtomicU64,
    queries: AtomicU64,
    positives: AtomicU64,
    round_trips: AtomicU64,
    errors: AtomicU64,
    deletes: AtomicU64,
    start_time: Instant,
}

impl Default for FilterMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterMetrics {
    /// Zeroed counters; uptime starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items_added: AtomicU64::new(0),
            items_new: AtomicU64::new(0),
            queries: AtomicU64::new(0),
            positives: AtomicU64::new(0),
            round_trips: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record an add/update of `items` items, `new` of which were absent.
    pub fn record_add(&self, items: u64, new: u64) {
        self.items_added.fetch_add(items, Ordering::Relaxed);
        self.items_new.fetch_add(new, Ordering::Relaxed);
    }

    /// Record a membership check of `items` items with `positives` hits.
    pub fn record_query(&self, items: u64, positives: u64) {
        self.queries.fetch_add(items, Ordering::Relaxed);
        self.positives.fetch_add(positives, Ordering::Relaxed);
    }

    /// Record one request to the store.
    pub fn record_round_trip(&self) {
        self.round_trips.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed operation.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a delete of the whole filter.
    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    /// Time since the counters were created.
    #[must_use]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Point-in-time copy of all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            items_added: self.items_added.load(Ordering::Relaxed),
            items_new: self.items_new.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            positives: self.positives.load(Ordering::Relaxed),
            round_trips: self.round_trips.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            uptime: self.uptime(),
        }
    }

    /// Zero every counter. Uptime is not reset.
    pub fn reset(&self) {
        for counter in [
            &self.items_added,
            &self.items_new,
            &self.queries,
            &self.positives,
            &self.round_trips,
            &self.errors,
            &self.deletes,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Copy of [`FilterMetrics`] at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    /// Items passed to `add`/`update`.
    pub items_added: u64,
    /// Of those, items that were not already present.
    pub items_new: u64,
    /// Items passed to `contains`/`contains_batch`/`intersection`.
    pub queries: u64,
    /// Of those, items reported present.
    pub positives: u64,
    /// Requests sent to the store.
    pub round_trips: u64,
    /// Operations that returned an error.
    pub errors: u64,
    /// Calls to `delete`.
    pub deletes: u64,
    /// Time since the counters were created.
    pub uptime: Duration,
}

impl MetricsSnapshot {
    /// Fraction of queried items reported present.
    #[must_use]
    pub fn hit_ratio(&self) -> f64 {
        if self.queries == 0 {
            return 0.0;
        }
        self.positives as f64 / self.queries as f64
    }

    /// Round-trips per second since creation.
    #[must_use]
    pub fn round_trips_per_second(&self) -> f64 {
        let secs = self.uptime.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.round_trips as f64 / secs
    }

    /// Render as Prometheus text exposition, each metric named `{prefix}_...`.
    #[must_use]
    pub fn to_prometheus_format(&self, prefix: &str) -> String {
        let counters = [
            ("items_added_total", "Items passed to add or update", self.items_added),
            ("items_new_total", "Added items that were not already present", self.items_new),
            ("queries_total", "Items checked for membership", self.queries),
            ("positives_total", "Checked items reported present", self.positives),
            ("round_trips_total", "Requests sent to the backing store", self.round_trips),
            ("errors_total", "Operations that failed", self.errors),
            ("deletes_total", "Filter deletions", self.deletes),
        ];

        let mut lines = Vec::with_capacity(counters.len() * 3 + 3);
        for (name, help, value) in counters {
            lines.push(format!("# HELP {prefix}_{name} {help}"));
            lines.push(format!("# TYPE {prefix}_{name} counter"));
            lines.push(format!("{prefix}_{name} {value}"));
        }
        lines.push(format!("# HELP {prefix}_hit_ratio Fraction of checked items reported present"));
        lines.push(format!("# TYPE {prefix}_hit_ratio gauge"));
        lines.push(format!("{prefix}_hit_ratio {:.6}", self.hit_ratio()));

        lines.join("\n")
    }
}
