//! Core types shared by every part of the crate.
//!
//! # Module Organization
//!
//! ```text
//! core/
//! ├── params.rs    - Capacity planner (m, k) and derived statistics
//! ├── spec.rs      - FilterSpec: key, capacity, error rate, db
//! ├── layout.rs    - Segment layout and bit addressing
//! └── mod.rs       - This file (public API)
//! ```
//!
//! Everything here is pure and deterministic: two processes given the same
//! [`FilterSpec`] and the same store size limit derive the same
//! [`SegmentLayout`], which is what lets them share a filter without
//! exchanging metadata.

pub mod layout;
pub mod params;
pub mod spec;

pub use layout::{segment_key, BitAddress, SegmentLayout, REDIS_MAX_STRING_BYTES};
pub use params::{plan, FilterParams};
pub use spec::FilterSpec;
