//! Fluent construction of remote filters.
//!
//! The builder uses the type-state pattern: required parameters (capacity and
//! error rate) are enforced at compile time, invalid values are reported when
//! the filter is built.
//!
//! | Required | Optional |
//! |----------|----------|
//! | key, capacity, error rate | db, batch limits, connection options |

pub mod remote;

pub use remote::RemoteBloomFilterBuilder;
