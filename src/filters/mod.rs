//! Filters backed by a shared store.
//!
//! - [`RemoteBloomFilter`]: the filter façade, generic over its [`BitStore`](crate::store::BitStore)
//! - [`FilterHealth`]: fill-based saturation report

pub mod health;
pub mod remote;

pub use health::FilterHealth;
pub use remote::RemoteBloomFilter;
