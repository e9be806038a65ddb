//! Redis-backed [`BitStore`].
//!
//! Bulk bit commands are sent as `BITFIELD` calls, all of them in one
//! pipeline:
//!
//! ```text
//! BITFIELD {key}.0 SET u1 <off> 1 SET u1 <off> 1 ...   -> previous values
//! BITFIELD {key}.1 GET u1 <off> GET u1 <off> ...       -> current values
//! ```
//!
//! `BITFIELD SET` replies with the old bit, which is what lets `add` report
//! whether an item was new without a second round-trip.
//!
//! The connection is blocking and not shared. Put a `RedisStore` behind the
//! filter's own lock, or open one per thread.

use super::options::ConnectionOptions;
use super::{BitCommand, BitStore};
use crate::error::{RedBloomError, Result};
use ::redis::{Client, Connection, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use std::fmt;
use tracing::{debug, trace};

/// A single blocking connection to a Redis server.
pub struct RedisStore {
    connection: Connection,
    url: String,
    db: i64,
    max_string_bytes: u64,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("url", &self.url)
            .field("db", &self.db)
            .field("max_string_bytes", &self.max_string_bytes)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect to the server described by `options`, authenticate if a
    /// password is set, and select database `db`.
    ///
    /// # Errors
    ///
    /// [`RedBloomError::Connection`] if the server cannot be reached within
    /// `options.connect_timeout` or rejects the credentials.
    pub fn connect(options: &ConnectionOptions, db: i64) -> Result<Self> {
        if db < 0 {
            return Err(RedBloomError::invalid_database(db));
        }
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(options.host.clone(), options.port),
            redis: RedisConnectionInfo {
                db,
                username: options.username.clone(),
                password: options.password.clone(),
                ..RedisConnectionInfo::default()
            },
        };
        Self::open(Client::open(info)?, options.redis_url(), options)
    }

    /// Connect using a `redis://[user:password@]host:port[/db]` URL.
    ///
    /// Timeouts and the string size limit still come from `options`; its
    /// address and credentials are ignored.
    ///
    /// # Errors
    ///
    /// [`RedBloomError::Connection`] if the server is unreachable,
    /// [`RedBloomError::Protocol`] if the URL cannot be parsed.
    pub fn from_url(url: &str, options: &ConnectionOptions) -> Result<Self> {
        let client = Client::open(url)?;
        let info = client.get_connection_info();
        let display = match &info.addr {
            ConnectionAddr::Tcp(host, port) => format!("redis://{host}:{port}"),
            other => format!("{other:?}"),
        };
        Self::open(client, display, options)
    }

    fn open(client: Client, url: String, options: &ConnectionOptions) -> Result<Self> {
        let db = client.get_connection_info().redis.db;
        debug!(url = %url, db, timeout = ?options.connect_timeout, "Connecting to Redis");

        let connection = client.get_connection_with_timeout(options.connect_timeout)?;
        connection.set_read_timeout(options.io_timeout)?;
        connection.set_write_timeout(options.io_timeout)?;

        let mut store = Self {
            connection,
            url,
            db,
            max_string_bytes: options.max_string_bytes,
        };
        store.ping()?;
        Ok(store)
    }

    /// Address of the server, without credentials.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Currently selected database.
    #[must_use]
    pub fn db(&self) -> i64 {
        self.db
    }
}

/// Append one `BITFIELD` call for `command` to `pipe`.
fn push_bitfield(pipe: &mut ::redis::Pipeline, command: &BitCommand) {
    let call = pipe.cmd("BITFIELD").arg(command.key());
    match command {
        BitCommand::SetBits { offsets, .. } => {
            for &offset in offsets {
                call.arg("SET").arg("u1").arg(offset).arg(1);
            }
        }
        BitCommand::GetBits { offsets, .. } => {
            for &offset in offsets {
                call.arg("GET").arg("u1").arg(offset);
            }
        }
    }
}

impl BitStore for RedisStore {
    fn max_string_bytes(&self) -> u64 {
        self.max_string_bytes
    }

    fn select(&mut self, db: i64) -> Result<()> {
        if db == self.db {
            return Ok(());
        }
        ::redis::cmd("SELECT").arg(db).query::<()>(&mut self.connection)?;
        debug!(url = %self.url, db, "Selected database");
        self.db = db;
        Ok(())
    }

    fn ping(&mut self) -> Result<()> {
        let reply: String = ::redis::cmd("PING").query(&mut self.connection)?;
        if reply != "PONG" {
            return Err(RedBloomError::protocol(format!(
                "expected PONG, got {reply:?}"
            )));
        }
        Ok(())
    }

    fn execute(&mut self, commands: &[BitCommand]) -> Result<Vec<Vec<bool>>> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = ::redis::pipe();
        for command in commands {
            push_bitfield(&mut pipe, command);
        }
        trace!(commands = commands.len(), "Sending BITFIELD pipeline");

        let replies: Vec<Vec<i64>> = pipe.query(&mut self.connection)?;
        if replies.len() != commands.len() {
            return Err(RedBloomError::protocol(format!(
                "pipeline of {} commands returned {} replies",
                commands.len(),
                replies.len()
            )));
        }

        Ok(replies
            .into_iter()
            .map(|reply| reply.into_iter().map(|bit| bit != 0).collect())
            .collect())
    }

    fn count_bits(&mut self, keys: &[Vec<u8>]) -> Result<Vec<u64>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = ::redis::pipe();
        for key in keys {
            pipe.cmd("BITCOUNT").arg(key.as_slice());
        }
        let counts: Vec<u64> = pipe.query(&mut self.connection)?;
        if counts.len() != keys.len() {
            return Err(RedBloomError::protocol(format!(
                "BITCOUNT over {} keys returned {} replies",
                keys.len(),
                counts.len()
            )));
        }
        Ok(counts)
    }

    fn delete(&mut self, keys: &[Vec<u8>]) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let removed: u64 = ::redis::cmd("DEL").arg(keys).query(&mut self.connection)?;
        Ok(removed)
    }
}
