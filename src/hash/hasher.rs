//! Base hash trait for item addressing.
//!
//! # Separation of Concerns
//!
//! - **`ItemHasher`**: turns item bytes into two base hash values
//! - **`DoubleHashing`**: derives k indices from those values (see `strategies`)
//! - **Batcher / filter**: maps indices to segments and remote commands
//!
//! Items are plain byte slices. Callers decide how their values are encoded,
//! which is what lets processes written in different languages share a filter.

/// Produces the two base hashes that drive double hashing.
///
/// Implementations must be fully specified and portable: the same bytes give
/// the same pair on every platform, process and release. A process-seeded
/// hash such as `std::collections::hash_map::DefaultHasher` must never be used,
/// because filters outlive the processes that write them.
///
/// # Examples
///
/// ```
/// use redbloom::hash::{ItemHasher, Xxh3Hasher};
///
/// let hasher = Xxh3Hasher;
/// assert_eq!(hasher.hash_pair(b"hello"), hasher.hash_pair(b"hello"));
/// assert_ne!(hasher.hash_pair(b"hello"), hasher.hash_pair(b"hellp"));
/// ```
pub trait ItemHasher: Send + Sync {
    /// Hash `bytes` to `(h1, h2)`.
    fn hash_pair(&self, bytes: &[u8]) -> (u64, u64);

    /// Human-readable name for logs.
    fn name(&self) -> &'static str;
}
