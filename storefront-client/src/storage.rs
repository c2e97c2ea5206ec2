//! redb-based local key-value store
//!
//! Durable string-keyed storage surviving application restarts. Holds the
//! session token, the session user, and the cart as serialized records in a
//! single `state` table.
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `state` | `&str` | `&[u8]` | Persisted client state (token, user, cart) |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate` by default: the write is
//! persistent as soon as `commit()` returns, and the database file is always
//! in a consistent state (copy-on-write with atomic pointer swap).
//!
//! # Atomicity
//!
//! redb allows a single write transaction at a time, so every
//! read-modify-write cycle performed inside one `WriteTransaction` is atomic
//! with respect to all other store operations. The cart and session engines
//! rely on this as their explicit critical section.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Single state table: key = record name, value = serialized record
const STATE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("state");

/// Key for the opaque bearer token
pub const TOKEN_KEY: &str = "token";
/// Key for the serialized session user
pub const USER_KEY: &str = "user";
/// Key for the serialized cart
pub const CART_KEY: &str = "cart";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Local key-value store backed by redb
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Database>,
}

impl LocalStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;

        // Create the table so first reads don't fail on a fresh database
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(STATE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(STATE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    ///
    /// Only one write transaction exists at a time; a read-modify-write cycle
    /// performed inside it cannot observe a stale value.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Raw Operations ==========

    /// Read a raw value
    pub fn get_raw(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(STATE_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    /// Read a raw value within a write transaction
    pub fn get_raw_txn(
        &self,
        txn: &WriteTransaction,
        key: &str,
    ) -> StorageResult<Option<Vec<u8>>> {
        let table = txn.open_table(STATE_TABLE)?;
        Ok(table.get(key)?.map(|guard| guard.value().to_vec()))
    }

    /// Write a raw value (own transaction, committed on return)
    pub fn put_raw(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(STATE_TABLE)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Write a raw value within a write transaction
    pub fn put_raw_txn(
        &self,
        txn: &WriteTransaction,
        key: &str,
        value: &[u8],
    ) -> StorageResult<()> {
        let mut table = txn.open_table(STATE_TABLE)?;
        table.insert(key, value)?;
        Ok(())
    }

    /// Remove a value
    pub fn delete(&self, key: &str) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(STATE_TABLE)?;
            table.remove(key)?;
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Multi-Key Operations ==========

    /// Write several values in ONE transaction
    ///
    /// Used by the session store so token and user land together.
    pub fn put_many(&self, entries: &[(&str, &[u8])]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(STATE_TABLE)?;
            for (key, value) in entries {
                table.insert(*key, *value)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Remove several values in ONE transaction
    pub fn delete_many(&self, keys: &[&str]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(STATE_TABLE)?;
            for key in keys {
                table.remove(*key)?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    // ========== JSON Operations ==========

    /// Read and deserialize a JSON value
    ///
    /// Malformed stored JSON surfaces as `StorageError::Serialization`;
    /// callers that recover with a default should use [`get_raw`] and parse
    /// themselves, or match on the error.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Serialize and write a JSON value
    pub fn put_json<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let bytes = serde_json::to_vec(value)?;
        self.put_raw(key, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_round_trip() {
        let store = LocalStore::open_in_memory().unwrap();

        assert!(store.get_raw("missing").unwrap().is_none());

        store.put_raw("k", b"value").unwrap();
        assert_eq!(store.get_raw("k").unwrap().unwrap(), b"value");

        store.delete("k").unwrap();
        assert!(store.get_raw("k").unwrap().is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let store = LocalStore::open_in_memory().unwrap();

        let value = vec!["a".to_string(), "b".to_string()];
        store.put_json("list", &value).unwrap();

        let loaded: Vec<String> = store.get_json("list").unwrap().unwrap();
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_malformed_json_is_a_serialization_error() {
        let store = LocalStore::open_in_memory().unwrap();
        store.put_raw("bad", b"{not json").unwrap();

        let result: StorageResult<Option<Vec<String>>> = store.get_json("bad");
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_put_many_delete_many() {
        let store = LocalStore::open_in_memory().unwrap();

        store
            .put_many(&[("a", b"1".as_slice()), ("b", b"2".as_slice())])
            .unwrap();
        assert_eq!(store.get_raw("a").unwrap().unwrap(), b"1");
        assert_eq!(store.get_raw("b").unwrap().unwrap(), b"2");

        store.delete_many(&["a", "b"]).unwrap();
        assert!(store.get_raw("a").unwrap().is_none());
        assert!(store.get_raw("b").unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_key_is_ok() {
        let store = LocalStore::open_in_memory().unwrap();
        store.delete("never-written").unwrap();
    }

    #[test]
    fn test_rmw_within_one_transaction() {
        let store = LocalStore::open_in_memory().unwrap();
        store.put_raw("counter", b"1").unwrap();

        let txn = store.begin_write().unwrap();
        let current = store.get_raw_txn(&txn, "counter").unwrap().unwrap();
        assert_eq!(current, b"1");
        store.put_raw_txn(&txn, "counter", b"2").unwrap();
        txn.commit().unwrap();

        assert_eq!(store.get_raw("counter").unwrap().unwrap(), b"2");
    }
}
