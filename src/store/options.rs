//! Connection and batching configuration.

use crate::core::layout::REDIS_MAX_STRING_BYTES;
use std::time::Duration;

/// Default connect timeout: 1.5 seconds.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(1500);

/// Default largest number of offsets carried by one bulk command.
pub const DEFAULT_MAX_BITS_PER_COMMAND: usize = 65_536;

/// How to reach a Redis server.
///
/// # Examples
///
/// ```
/// use redbloom::store::ConnectionOptions;
/// use std::time::Duration;
///
/// let options = ConnectionOptions::default()
///     .host("cache.internal")
///     .port(6380)
///     .password("s3cret")
///     .io_timeout(Duration::from_secs(2));
///
/// assert_eq!(options.redis_url(), "redis://cache.internal:6380");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConnectionOptions {
    /// Server host name or address.
    pub host: String,
    /// Server TCP port.
    pub port: u16,
    /// ACL user name, if any.
    pub username: Option<String>,
    /// Password sent with `AUTH`, if any.
    pub password: Option<String>,
    /// Limit on establishing the connection.
    pub connect_timeout: Duration,
    /// Read/write timeout for every call; `None` blocks indefinitely.
    pub io_timeout: Option<Duration>,
    /// Largest string the server accepts (`proto-max-bulk-len`).
    pub max_string_bytes: u64,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            username: None,
            password: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            io_timeout: None,
            max_string_bytes: REDIS_MAX_STRING_BYTES,
        }
    }
}

impl ConnectionOptions {
    /// Set the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the ACL user name.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the read/write timeout.
    #[must_use]
    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = Some(timeout);
        self
    }

    /// Override the server's string size limit.
    #[must_use]
    pub fn max_string_bytes(mut self, bytes: u64) -> Self {
        self.max_string_bytes = bytes;
        self
    }

    /// `redis://host:port` without credentials, for logs.
    #[must_use]
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

/// Bounds on the size of a single bulk command.
///
/// Splitting only changes how many commands go into the pipeline, never the
/// number of round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchLimits {
    /// Largest number of offsets in one command (at least 1).
    pub max_bits_per_command: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_bits_per_command: DEFAULT_MAX_BITS_PER_COMMAND,
        }
    }
}
