//! In-process store with Redis string and bit semantics.
//!
//! `MemoryStore` behaves like a single Redis server as far as a remote filter
//! can tell: numbered databases, lazily created strings that grow to the
//! highest byte written, a maximum string size, `WRONGTYPE` errors for keys that
//! hold something other than a string, and one "round-trip" per request.
//!
//! Handles are cheap to clone and share one server state, so two filters built
//! from clones of the same store see each other's writes, exactly like two
//! processes connected to the same Redis.
//!
//! Bits are stored sparsely, so a multi-gigabit layout costs memory only for
//! the bits actually set.
//!
//! # Examples
//!
//! ```
//! use redbloom::store::{BitCommand, BitStore, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! let replies = store
//!     .execute(&[
//!         BitCommand::SetBits { key: b"f.0".to_vec(), offsets: vec![3, 3] },
//!         BitCommand::GetBits { key: b"f.0".to_vec(), offsets: vec![2, 3] },
//!     ])
//!     .unwrap();
//!
//! assert_eq!(replies, vec![vec![false, true], vec![false, true]]);
//! assert_eq!(store.string_len(b"f.0"), Some(1));
//! ```

use super::{BitCommand, BitStore};
use crate::core::layout::REDIS_MAX_STRING_BYTES;
use crate::error::{RedBloomError, Result};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Number of databases, as in a default Redis configuration.
pub const DEFAULT_DATABASES: i64 = 16;

/// A value held at a key.
#[derive(Debug, Clone)]
enum Value {
    /// A byte string, kept as the set of bits that are 1 plus its byte length.
    Bits { ones: HashSet<u64>, len: u64 },
    /// Any non-string value (hash, list, ...), by type name.
    Other(&'static str),
}

#[derive(Debug, Default)]
struct ServerState {
    databases: HashMap<i64, HashMap<Vec<u8>, Value>>,
    unavailable: bool,
    round_trips: u64,
}

/// Shared in-memory bit store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<ServerState>>,
    db: i64,
    databases: i64,
    max_string_bytes: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// A fresh server with 16 databases and Redis' 512 MiB string limit,
    /// with this handle on database 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ServerState::default())),
            db: 0,
            databases: DEFAULT_DATABASES,
            max_string_bytes: REDIS_MAX_STRING_BYTES,
        }
    }

    /// Use a different string size limit (affects this handle and later clones).
    #[must_use]
    pub fn with_max_string_bytes(mut self, bytes: u64) -> Self {
        self.max_string_bytes = bytes;
        self
    }

    /// Database this handle currently addresses.
    #[must_use]
    pub fn db(&self) -> i64 {
        self.db
    }

    /// Requests served so far by the shared server, across all handles.
    #[must_use]
    pub fn round_trips(&self) -> u64 {
        self.state.lock().round_trips
    }

    /// Make every following request fail with a connection error, or undo it.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unavailable = unavailable;
    }

    /// Store a non-string value of type `type_name` at `key` in this handle's
    /// database, replacing whatever was there.
    pub fn insert_foreign(&self, key: impl Into<Vec<u8>>, type_name: &'static str) {
        self.state
            .lock()
            .databases
            .entry(self.db)
            .or_default()
            .insert(key.into(), Value::Other(type_name));
    }

    /// Whether `key` exists in this handle's database.
    #[must_use]
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.state
            .lock()
            .databases
            .get(&self.db)
            .is_some_and(|db| db.contains_key(key))
    }

    /// Byte length of the string at `key` (`STRLEN`), `None` if absent or not a string.
    #[must_use]
    pub fn string_len(&self, key: &[u8]) -> Option<u64> {
        match self.state.lock().databases.get(&self.db)?.get(key)? {
            Value::Bits { len, .. } => Some(*len),
            Value::Other(_) => None,
        }
    }

    /// All keys in this handle's database, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<Vec<u8>> {
        let state = self.state.lock();
        let mut keys: Vec<Vec<u8>> = state
            .databases
            .get(&self.db)
            .map(|db| db.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Start a request: fail if the server is "down", otherwise count it.
    fn begin(&self, state: &mut ServerState) -> Result<()> {
        if state.unavailable {
            return Err(RedBloomError::connection(
                "memory store is unavailable (simulated)",
            ));
        }
        state.round_trips += 1;
        Ok(())
    }

    fn check_offsets(&self, offsets: &[u64]) -> Result<()> {
        let limit = self.max_string_bytes.saturating_mul(8);
        if let Some(&bad) = offsets.iter().find(|&&o| o >= limit) {
            return Err(RedBloomError::protocol(format!(
                "ERR bit offset {bad} is not an integer or out of range"
            )));
        }
        Ok(())
    }

    fn apply(&self, db: &mut HashMap<Vec<u8>, Value>, command: &BitCommand) -> Result<Vec<bool>> {
        self.check_offsets(command.offsets())?;
        match command {
            BitCommand::SetBits { key, offsets } => {
                let value = db.entry(key.clone()).or_insert_with(|| Value::Bits {
                    ones: HashSet::new(),
                    len: 0,
                });
                let (ones, len) = match value {
                    Value::Bits { ones, len } => (ones, len),
                    Value::Other(type_name) => return Err(wrong_type(key, type_name)),
                };
                Ok(offsets
                    .iter()
                    .map(|&offset| {
                        *len = (*len).max(offset / 8 + 1);
                        !ones.insert(offset)
                    })
                    .collect())
            }
            BitCommand::GetBits { key, offsets } => match db.get(key) {
                None => Ok(vec![false; offsets.len()]),
                Some(Value::Bits { ones, .. }) => Ok(offsets.iter().map(|offset| ones.contains(offset)).collect()),
                Some(Value::Other(type_name)) => Err(wrong_type(key, type_name)),
            },
        }
    }
}

fn wrong_type(key: &[u8], type_name: &str) -> RedBloomError {
    RedBloomError::type_mismatch(format!(
        "WRONGTYPE Operation against a key holding the wrong kind of value ('{}' is a {type_name})",
        String::from_utf8_lossy(key)
    ))
}

impl BitStore for MemoryStore {
    fn max_string_bytes(&self) -> u64 {
        self.max_string_bytes
    }

    fn select(&mut self, db: i64) -> Result<()> {
        let mut state = self.state.lock();
        self.begin(&mut state)?;
        if !(0..self.databases).contains(&db) {
            return Err(RedBloomError::protocol("ERR DB index is out of range"));
        }
        self.db = db;
        Ok(())
    }

    fn ping(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        self.begin(&mut state)
    }

    fn execute(&mut self, commands: &[BitCommand]) -> Result<Vec<Vec<bool>>> {
        let mut state = self.state.lock();
        self.begin(&mut state)?;
        let db = state.databases.entry(self.db).or_default();

        let mut replies = Vec::with_capacity(commands.len());
        let mut first_error = None;
        for command in commands {
            // A failing command does not stop the rest of the pipeline.
            match self.apply(db, command) {
                Ok(reply) => replies.push(reply),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(replies),
        }
    }

    fn count_bits(&mut self, keys: &[Vec<u8>]) -> Result<Vec<u64>> {
        let mut state = self.state.lock();
        self.begin(&mut state)?;
        let db = state.databases.get(&self.db);

        keys.iter()
            .map(|key| match db.and_then(|db| db.get(key)) {
                None => Ok(0),
                Some(Value::Bits { ones, .. }) => Ok(ones.len() as u64),
                Some(Value::Other(type_name)) => Err(wrong_type(key, type_name)),
            })
            .collect()
    }

    fn delete(&mut self, keys: &[Vec<u8>]) -> Result<u64> {
        let mut state = self.state.lock();
        self.begin(&mut state)?;
        let Some(db) = state.databases.get_mut(&self.db) else {
            return Ok(0);
        };

        Ok(keys.iter().filter(|key| db.remove(key.as_slice()).is_some()).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(key: &str, offsets: &[u64]) -> BitCommand {
        BitCommand::SetBits {
            key: key.as_bytes().to_vec(),
            offsets: offsets.to_vec(),
        }
    }

    fn get(key: &str, offsets: &[u64]) -> BitCommand {
        BitCommand::GetBits {
            key: key.as_bytes().to_vec(),
            offsets: offsets.to_vec(),
        }
    }

    #[test]
    fn test_set_reports_previous_values() {
        let mut store = MemoryStore::new();
        let replies = store.execute(&[set("k", &[1, 2]), set("k", &[2, 3])]).unwrap();
        assert_eq!(replies, vec![vec![false, false], vec![true, false]]);
    }

    #[test]
    fn test_missing_key_reads_zero_and_is_not_created() {
        let mut store = MemoryStore::new();
        let replies = store.execute(&[get("absent", &[0, 100])]).unwrap();
        assert_eq!(replies, vec![vec![false, false]]);
        assert!(!store.contains_key(b"absent"));
    }

    #[test]
    fn test_string_grows_to_highest_byte() {
        let mut store = MemoryStore::new();
        store.execute(&[set("k", &[0])]).unwrap();
        assert_eq!(store.string_len(b"k"), Some(1));
        store.execute(&[set("k", &[8 * 99 + 7])]).unwrap();
        assert_eq!(store.string_len(b"k"), Some(100));
    }

    #[test]
    fn test_offset_beyond_limit_is_rejected() {
        let mut store = MemoryStore::new().with_max_string_bytes(2);
        assert!(store.execute(&[set("k", &[15])]).is_ok());
        let err = store.execute(&[set("k", &[16])]).unwrap_err();
        assert!(matches!(err, RedBloomError::Protocol { .. }));
    }

    #[test]
    fn test_wrong_type_on_read_and_write() {
        let mut store = MemoryStore::new();
        store.insert_foreign("h", "hash");

        for command in [set("h", &[1]), get("h", &[1])] {
            let err = store.execute(&[command]).unwrap_err();
            assert!(matches!(err, RedBloomError::TypeMismatch { .. }));
            assert!(err.to_string().contains("WRONGTYPE"));
        }
        assert!(matches!(
            store.count_bits(&[b"h".to_vec()]),
            Err(RedBloomError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_commands_around_failure_stay_applied() {
        let mut store = MemoryStore::new();
        store.insert_foreign("bad", "list");
        let err = store
            .execute(&[set("good", &[4]), set("bad", &[1]), set("after", &[2])])
            .unwrap_err();
        assert!(err.to_string().contains("'bad'"));
        assert_eq!(
            store.execute(&[get("good", &[4]), get("after", &[2])]).unwrap(),
            vec![vec![true], vec![true]]
        );
    }

    #[test]
    fn test_databases_are_isolated() {
        let mut db0 = MemoryStore::new();
        let mut db1 = db0.clone();
        db1.select(1).unwrap();

        db0.execute(&[set("k", &[7])]).unwrap();
        assert_eq!(db1.execute(&[get("k", &[7])]).unwrap(), vec![vec![false]]);
        assert_eq!(db0.execute(&[get("k", &[7])]).unwrap(), vec![vec![true]]);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut store = MemoryStore::new();
        assert!(store.select(DEFAULT_DATABASES).is_err());
        assert!(store.select(-1).is_err());
        assert_eq!(store.db(), 0);
    }

    #[test]
    fn test_count_and_delete() {
        let mut store = MemoryStore::new();
        store.execute(&[set("a", &[1, 2, 3]), set("b", &[9])]).unwrap();

        let keys = [b"a".to_vec(), b"b".to_vec(), b"c".to_vec()];
        assert_eq!(store.count_bits(&keys).unwrap(), vec![3, 1, 0]);
        assert_eq!(store.delete(&keys).unwrap(), 2);
        assert!(store.keys().is_empty());
        assert_eq!(store.delete(&keys).unwrap(), 0);
    }

    #[test]
    fn test_unavailable_store() {
        let mut store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.ping(), Err(RedBloomError::Connection { .. })));
        assert!(matches!(
            store.execute(&[get("k", &[0])]),
            Err(RedBloomError::Connection { .. })
        ));
        store.set_unavailable(false);
        assert!(store.ping().is_ok());
    }

    #[test]
    fn test_round_trips_are_counted_per_request() {
        let mut store = MemoryStore::new();
        let before = store.round_trips();
        store
            .execute(&[set("a", &[1]), set("b", &[2]), get("a", &[1])])
            .unwrap();
        assert_eq!(store.round_trips() - before, 1);
    }
}
