//! Key-value slot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide local-storage style `get`/`put` over named string slots.
//! - Offer a compare-and-swap write so several processes sharing one
//!   database cannot silently overwrite each other.
//!
//! # Invariants
//! - An absent slot reports revision `0`; the first write yields `1`.
//! - `put_slot_if_revision` checks and writes inside one IMMEDIATE
//!   transaction.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Monotonic per-slot write counter.
pub type Revision = i64;

/// Revision reported for a slot that was never written.
pub const ABSENT_REVISION: Revision = 0;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for slot reads/writes and drafts (de)serialization.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Another writer changed the slot since it was read.
    RevisionConflict {
        key: String,
        expected: Revision,
        actual: Revision,
    },
    /// The drafts collection could not be serialized.
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::RevisionConflict {
                key,
                expected,
                actual,
            } => write!(
                f,
                "slot `{key}` changed concurrently (expected revision {expected}, found {actual})"
            ),
            Self::Encode(err) => write!(f, "failed to encode drafts: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::RevisionConflict { .. } => None,
            Self::Encode(err) => Some(err),
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

/// Stored slot value with its current revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub value: String,
    pub revision: Revision,
}

/// Repository interface for named string slots.
pub trait SlotRepository {
    /// Reads one slot; `None` when it was never written.
    fn get_slot(&self, key: &str) -> RepoResult<Option<Slot>>;
    /// Overwrites one slot unconditionally and returns the new revision.
    fn put_slot(&self, key: &str, value: &str) -> RepoResult<Revision>;
    /// Overwrites one slot only if its revision still equals `expected`.
    fn put_slot_if_revision(
        &mut self,
        key: &str,
        value: &str,
        expected: Revision,
    ) -> RepoResult<Revision>;
}

/// SQLite-backed slot repository over the `kv_slots` table.
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    /// Wraps a migrated connection (see `db::open_db`).
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn get_slot(&self, key: &str) -> RepoResult<Option<Slot>> {
        let slot = self
            .conn
            .query_row(
                "SELECT value, revision FROM kv_slots WHERE key = ?1;",
                [key],
                |row| {
                    Ok(Slot {
                        value: row.get("value")?,
                        revision: row.get("revision")?,
                    })
                },
            )
            .optional()?;
        Ok(slot)
    }

    fn put_slot(&self, key: &str, value: &str) -> RepoResult<Revision> {
        let revision = self.conn.query_row(
            "INSERT INTO kv_slots (key, value, revision, updated_at)
             VALUES (?1, ?2, 1, CAST(strftime('%s', 'now') AS INTEGER) * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                revision = kv_slots.revision + 1,
                updated_at = excluded.updated_at
             RETURNING revision;",
            params![key, value],
            |row| row.get(0),
        )?;
        Ok(revision)
    }

    fn put_slot_if_revision(
        &mut self,
        key: &str,
        value: &str,
        expected: Revision,
    ) -> RepoResult<Revision> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let actual = tx
            .query_row(
                "SELECT revision FROM kv_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, Revision>(0),
            )
            .optional()?
            .unwrap_or(ABSENT_REVISION);

        if actual != expected {
            return Err(RepoError::RevisionConflict {
                key: key.to_string(),
                expected,
                actual,
            });
        }

        let next = actual + 1;
        if actual == ABSENT_REVISION {
            tx.execute(
                "INSERT INTO kv_slots (key, value, revision, updated_at)
                 VALUES (?1, ?2, ?3, CAST(strftime('%s', 'now') AS INTEGER) * 1000);",
                params![key, value, next],
            )?;
        } else {
            tx.execute(
                "UPDATE kv_slots
                 SET
                    value = ?2,
                    revision = ?3,
                    updated_at = CAST(strftime('%s', 'now') AS INTEGER) * 1000
                 WHERE key = ?1;",
                params![key, value, next],
            )?;
        }
        tx.commit()?;
        Ok(next)
    }
}
