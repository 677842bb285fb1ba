//! Snapshot slot repository contracts and implementations.
//!
//! # Responsibility
//! - Load and overwrite the serialized document stored under one slot key.
//! - Provide a SQLite backend for real use and an in-memory backend for tests.
//!
//! # Invariants
//! - `save_slot` is last-write-wins; a later `load_slot` observes it.
//! - Repositories store opaque text and never parse the payload.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for slot persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Stored row cannot be read back as text.
    InvalidData(String),
    /// Backend refused the write (full, read-only, ...).
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted slot data: {message}"),
            Self::Unavailable(message) => write!(f, "slot storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable key -> text storage used by the store service.
pub trait SlotRepository {
    fn load_slot(&self, key: &str) -> RepoResult<Option<String>>;
    fn save_slot(&self, key: &str, payload: &str) -> RepoResult<()>;
    fn clear_slot(&self, key: &str) -> RepoResult<()>;
}

impl<T: SlotRepository + ?Sized> SlotRepository for &T {
    fn load_slot(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).load_slot(key)
    }

    fn save_slot(&self, key: &str, payload: &str) -> RepoResult<()> {
        (**self).save_slot(key, payload)
    }

    fn clear_slot(&self, key: &str) -> RepoResult<()> {
        (**self).clear_slot(key)
    }
}

/// SQLite-backed slot repository.
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn load_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM snapshot_slots WHERE slot_key = ?1;",
                [key],
                |row| row.get::<_, rusqlite::types::Value>(0),
            )
            .optional()?;

        match payload {
            None => Ok(None),
            Some(rusqlite::types::Value::Text(text)) => Ok(Some(text)),
            Some(other) => Err(RepoError::InvalidData(format!(
                "slot `{key}` holds non-text payload of type {:?}",
                other.data_type()
            ))),
        }
    }

    fn save_slot(&self, key: &str, payload: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO snapshot_slots (slot_key, payload, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(slot_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![key, payload],
        )?;
        Ok(())
    }

    fn clear_slot(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM snapshot_slots WHERE slot_key = ?1;", [key])?;
        Ok(())
    }
}

/// In-process slot repository for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySlotRepository {
    slots: RefCell<HashMap<String, String>>,
    reject_writes: Cell<bool>,
}

impl MemorySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent writes fail, as a full storage quota would.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    /// Stores a raw payload without going through the store service.
    pub fn insert_raw(&self, key: &str, payload: &str) {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), payload.to_string());
    }
}

impl SlotRepository for MemorySlotRepository {
    fn load_slot(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn save_slot(&self, key: &str, payload: &str) -> RepoResult<()> {
        if self.reject_writes.get() {
            return Err(RepoError::Unavailable("quota exceeded".to_string()));
        }
        self.insert_raw(key, payload);
        Ok(())
    }

    fn clear_slot(&self, key: &str) -> RepoResult<()> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}
