//! The backing-store capability.
//!
//! A remote filter never owns its bits. It talks to a store through the
//! [`BitStore`] trait, which captures exactly what the filter needs:
//! bulk bit-set and bit-get over named byte strings executed as one ordered
//! round-trip, bit counting, key deletion, database selection, and the
//! store's maximum string size.
//!
//! # Implementations
//!
//! | Store | Feature | Use |
//! |-------|---------|-----|
//! | [`RedisStore`] | `redis` (default) | Shared filters across processes and hosts |
//! | [`MemoryStore`] | always | Tests, single-process embedding |
//!
//! Bit order inside a string follows Redis `SETBIT`: offset 0 is the most
//! significant bit of the first byte.

pub mod memory;
pub mod options;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryStore;
pub use options::{BatchLimits, ConnectionOptions};
#[cfg(feature = "redis")]
pub use self::redis::RedisStore;

use crate::error::Result;

/// One bulk bit command against a single key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitCommand {
    /// Set every listed offset to 1. The reply holds each bit's previous value.
    SetBits {
        /// Segment key.
        key: Vec<u8>,
        /// Bit offsets, applied in order.
        offsets: Vec<u64>,
    },
    /// Read every listed offset. Missing keys read as all zeros.
    GetBits {
        /// Segment key.
        key: Vec<u8>,
        /// Bit offsets, read in order.
        offsets: Vec<u64>,
    },
}

impl BitCommand {
    /// The key this command targets.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        match self {
            Self::SetBits { key, .. } | Self::GetBits { key, .. } => key,
        }
    }

    /// The offsets this command touches.
    #[must_use]
    pub fn offsets(&self) -> &[u64] {
        match self {
            Self::SetBits { offsets, .. } | Self::GetBits { offsets, .. } => offsets,
        }
    }

    /// Whether the command writes.
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(self, Self::SetBits { .. })
    }
}

/// A byte-string store with atomic bit operations and numbered databases.
///
/// Every method is one request/response exchange with the store. Implementors
/// must surface failures instead of retrying: a wrong value type at a key is
/// [`RedBloomError::TypeMismatch`](crate::RedBloomError::TypeMismatch),
/// an unreachable or timed-out store is
/// [`RedBloomError::Connection`](crate::RedBloomError::Connection).
pub trait BitStore: Send {
    /// Largest string the store accepts, in bytes. Bounds segment size.
    fn max_string_bytes(&self) -> u64;

    /// Switch this handle to database `db`.
    fn select(&mut self, db: i64) -> Result<()>;

    /// Check that the store is reachable.
    fn ping(&mut self) -> Result<()>;

    /// Run `commands` in order as a single pipelined round-trip.
    ///
    /// Returns one reply per command with one bit per offset. A failing
    /// command does not stop the others; the first error is returned and
    /// every other command may have been applied.
    fn execute(&mut self, commands: &[BitCommand]) -> Result<Vec<Vec<bool>>>;

    /// Number of set bits in each key, pipelined. Missing keys count 0.
    fn count_bits(&mut self, keys: &[Vec<u8>]) -> Result<Vec<u64>>;

    /// Remove `keys`, returning how many existed.
    fn delete(&mut self, keys: &[Vec<u8>]) -> Result<u64>;
}

impl<S: BitStore + ?Sized> BitStore for Box<S> {
    fn max_string_bytes(&self) -> u64 {
        (**self).max_string_bytes()
    }

    fn select(&mut self, db: i64) -> Result<()> {
        (**self).select(db)
    }

    fn ping(&mut self) -> Result<()> {
        (**self).ping()
    }

    fn execute(&mut self, commands: &[BitCommand]) -> Result<Vec<Vec<bool>>> {
        (**self).execute(commands)
    }

    fn count_bits(&mut self, keys: &[Vec<u8>]) -> Result<Vec<u64>> {
        (**self).count_bits(keys)
    }

    fn delete(&mut self, keys: &[Vec<u8>]) -> Result<u64> {
        (**self).delete(keys)
    }
}
