//! Drafts collection store over one named slot.
//!
//! # Responsibility
//! - Decode the persisted JSON array into `DraftRecord`s, strictly.
//! - Encode and write the whole collection back in a single slot write.
//!
//! # Invariants
//! - A missing slot loads as an empty collection without a warning.
//! - A malformed slot loads as an empty collection WITH a warning, and its
//!   raw text is preserved under `<key>.malformed` before any later save can
//!   overwrite it.
//! - Non-array payloads are rejected, never wrapped into a one-element array.
//! - Storage I/O failures propagate; only data-shape problems degrade.

use crate::model::draft::{DraftId, DraftRecord};
use crate::repo::slot_repo::{RepoError, RepoResult, Revision, SlotRepository, ABSENT_REVISION};
use log::{info, warn};
use serde_json::Value;
use std::collections::HashSet;

/// Slot key holding the drafts collection.
pub const DEFAULT_STORAGE_KEY: &str = "esDrafts";

const MALFORMED_BACKUP_SUFFIX: &str = ".malformed";

/// Recoverable warning: the stored blob could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedDrafts {
    /// Human-readable decode failure.
    pub reason: String,
    /// Slot that now holds the raw, undecodable text.
    pub backup_key: String,
}

/// Result of one full read of the drafts slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSnapshot {
    /// Most-recent-first.
    pub records: Vec<DraftRecord>,
    /// Slot revision the records were read at.
    pub revision: Revision,
    pub warning: Option<MalformedDrafts>,
}

impl DraftSnapshot {
    pub fn find(&self, id: DraftId) -> Option<&DraftRecord> {
        self.records.iter().find(|record| record.id == id)
    }
}

/// Serialize/deserialize boundary between drafts and their slot.
pub struct DraftStore<R: SlotRepository> {
    repo: R,
    key: String,
}

impl<R: SlotRepository> DraftStore<R> {
    /// Store using the default `esDrafts` slot.
    pub fn new(repo: R) -> Self {
        Self::with_key(repo, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(repo: R, key: impl Into<String>) -> Self {
        Self {
            repo,
            key: key.into(),
        }
    }

    /// Loads the full collection.
    ///
    /// # Errors
    /// - Only storage failures. Malformed content is reported through
    ///   `DraftSnapshot::warning`.
    pub fn load(&self) -> RepoResult<DraftSnapshot> {
        let Some(slot) = self.repo.get_slot(&self.key)? else {
            return Ok(DraftSnapshot {
                records: Vec::new(),
                revision: ABSENT_REVISION,
                warning: None,
            });
        };

        match decode_drafts(&slot.value) {
            Ok(records) => Ok(DraftSnapshot {
                records,
                revision: slot.revision,
                warning: None,
            }),
            Err(reason) => {
                let backup_key = self.preserve_malformed(&slot.value, slot.revision)?;
                warn!(
                    "event=drafts_load module=store status=malformed key={} backup_key={} bytes={} reason={}",
                    self.key,
                    backup_key,
                    slot.value.len(),
                    reason
                );
                Ok(DraftSnapshot {
                    records: Vec::new(),
                    revision: slot.revision,
                    warning: Some(MalformedDrafts { reason, backup_key }),
                })
            }
        }
    }

    /// Overwrites the collection unconditionally (last writer wins).
    pub fn save(&self, records: &[DraftRecord]) -> RepoResult<Revision> {
        let encoded = encode_drafts(records)?;
        let revision = self.repo.put_slot(&self.key, &encoded)?;
        info!(
            "event=drafts_save module=store status=ok mode=overwrite count={} revision={}",
            records.len(),
            revision
        );
        Ok(revision)
    }

    /// Overwrites the collection only if nobody wrote since `expected`.
    ///
    /// # Errors
    /// - `RepoError::RevisionConflict` when the slot moved on.
    pub fn save_if_unchanged(
        &mut self,
        records: &[DraftRecord],
        expected: Revision,
    ) -> RepoResult<Revision> {
        let encoded = encode_drafts(records)?;
        let revision = self
            .repo
            .put_slot_if_revision(&self.key, &encoded, expected)?;
        info!(
            "event=drafts_save module=store status=ok mode=checked count={} revision={}",
            records.len(),
            revision
        );
        Ok(revision)
    }

    /// Copies `raw` to `<key>.malformed`, or to `<key>.malformed.<revision>`
    /// when the first backup already holds different text. Existing backups
    /// are never overwritten.
    fn preserve_malformed(&self, raw: &str, revision: Revision) -> RepoResult<String> {
        let first_key = format!("{}{MALFORMED_BACKUP_SUFFIX}", self.key);
        let backup_key = match self.repo.get_slot(&first_key)? {
            None => first_key,
            Some(slot) if slot.value == raw => return Ok(first_key),
            Some(_) => format!("{first_key}.{revision}"),
        };
        if self.repo.get_slot(&backup_key)?.is_none() {
            self.repo.put_slot(&backup_key, raw)?;
        }
        Ok(backup_key)
    }
}

/// Encodes the collection as a compact JSON array.
pub fn encode_drafts(records: &[DraftRecord]) -> RepoResult<String> {
    serde_json::to_string(records).map_err(RepoError::Encode)
}

/// Strictly decodes a stored blob.
///
/// Returns a reason string on failure: invalid JSON, a non-array root, an
/// entry with the wrong shape or blank required fields, or duplicate ids.
pub fn decode_drafts(raw: &str) -> Result<Vec<DraftRecord>, String> {
    let root: Value =
        serde_json::from_str(raw).map_err(|err| format!("invalid JSON: {err}"))?;
    let Value::Array(items) = root else {
        return Err(format!("expected a JSON array, found {}", value_kind(&root)));
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let record: DraftRecord =
            serde_json::from_value(item).map_err(|err| format!("entry {index}: {err}"))?;
        if !seen.insert(record.id) {
            return Err(format!("entry {index}: duplicate id {}", record.id));
        }
        records.push(record);
    }
    Ok(records)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
