//! Error types for redbloom operations.
//!
//! Every public operation either returns its declared result or fails with a
//! [`RedBloomError`]. Errors are grouped into four kinds (see [`ErrorKind`]):
//! the store could not be reached, a segment key holds a value of the wrong
//! type, the store answered with something unexpected, or the filter was
//! configured with invalid parameters.
//!
//! Nothing is retried and nothing is swallowed. A failed batched write may have
//! already set some bits; because setting a bit is idempotent, repeating a
//! failed `add`/`update` is safe (see [`RedBloomError::is_retryable_for_writes`]).
//!
//! # Error Propagation
//!
//! ```
//! use redbloom::{Result, RedBloomError};
//! use redbloom::core::params::plan;
//!
//! fn bits_for(n: u64, fp: f64) -> Result<u64> {
//!     let params = plan(n, fp)?;
//!     Ok(params.bit_size)
//! }
//! # assert!(bits_for(1000, 0.01).is_ok());
//! # assert!(matches!(bits_for(0, 0.01), Err(RedBloomError::InvalidCapacity { .. })));
//! ```

use thiserror::Error;

/// Result type alias for redbloom operations.
pub type Result<T> = std::result::Result<T, RedBloomError>;

/// Coarse classification of a [`RedBloomError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backing store could not be reached, authenticated against, or
    /// timed out.
    Connection,
    /// A segment key holds a value that is not a byte string.
    TypeMismatch,
    /// The store returned a malformed or unexpected response.
    Protocol,
    /// The filter was configured with invalid parameters.
    Validation,
}

impl ErrorKind {
    /// Stable upper-case code for logs and bindings.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Connection => "CONNECTION",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::Protocol => "PROTOCOL",
            Self::Validation => "VALIDATION",
        }
    }
}

/// Errors that can occur while building or using a remote Bloom filter.
///
/// `Clone` + `PartialEq` keep errors easy to compare in tests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RedBloomError {
    /// The backing store is unreachable, refused authentication, dropped the
    /// connection, or a call timed out.
    #[error("Cannot reach backing store: {message}.")]
    Connection {
        /// Description from the client library or the store.
        message: String,
    },

    /// A segment key holds a value of the wrong type (for example a hash
    /// where a string is expected).
    #[error("Segment holds a value of the wrong type: {message}.")]
    TypeMismatch {
        /// Store error text, including the key when known.
        message: String,
    },

    /// The store answered with an error reply or a response whose shape does
    /// not match the request.
    #[error("Unexpected response from backing store: {message}.")]
    Protocol {
        /// What was expected and what arrived.
        message: String,
    },

    /// Capacity must be greater than zero.
    #[error("Invalid capacity: {capacity}. Expected items must be greater than 0.")]
    InvalidCapacity {
        /// The invalid capacity that was provided.
        capacity: u64,
    },

    /// Error rate outside the open interval (0, 1).
    #[error("Error rate {error_rate} is out of bounds. Must be in range (0, 1).")]
    ErrorRateOutOfBounds {
        /// The invalid error rate that was provided.
        error_rate: f64,
    },

    /// Database index below zero.
    #[error("Invalid database index: {db}. Must be non-negative.")]
    InvalidDatabase {
        /// The invalid database index.
        db: i64,
    },

    /// Any other parameter combination that cannot produce a usable filter.
    #[error("Invalid filter parameters: {message}.")]
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },
}

impl RedBloomError {
    /// Create a `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a `TypeMismatch` error.
    #[must_use]
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    /// Create a `Protocol` error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Create an `InvalidCapacity` error.
    #[must_use]
    pub fn invalid_capacity(capacity: u64) -> Self {
        Self::InvalidCapacity { capacity }
    }

    /// Create an `ErrorRateOutOfBounds` error.
    #[must_use]
    pub fn error_rate_out_of_bounds(error_rate: f64) -> Self {
        Self::ErrorRateOutOfBounds { error_rate }
    }

    /// Create an `InvalidDatabase` error.
    #[must_use]
    pub fn invalid_database(db: i64) -> Self {
        Self::InvalidDatabase { db }
    }

    /// Create an `InvalidParameters` error.
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::Protocol { .. } => ErrorKind::Protocol,
            Self::InvalidCapacity { .. }
            | Self::ErrorRateOutOfBounds { .. }
            | Self::InvalidDatabase { .. }
            | Self::InvalidParameters { .. } => ErrorKind::Validation,
        }
    }

    /// Whether a failed `add`/`update` may simply be repeated.
    ///
    /// Only connectivity failures qualify: bit-sets are idempotent, so
    /// replaying the whole batch converges. Type and protocol errors will fail
    /// again.
    #[must_use]
    pub fn is_retryable_for_writes(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for RedBloomError {
    fn from(err: redis::RedisError) -> Self {
        let message = err.to_string();
        if err.code() == Some("WRONGTYPE") || message.contains("WRONGTYPE") {
            return Self::type_mismatch(message);
        }
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
            || err.kind() == redis::ErrorKind::AuthenticationFailed
        {
            return Self::connection(message);
        }
        Self::protocol(message)
    }
}
