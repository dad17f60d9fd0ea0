//! Draft form controller.
//!
//! # Responsibility
//! - Drive create/edit/delete use-cases against a caller-owned `FormState`.
//! - Run every mutation as load → transform in memory → checked save.
//!
//! # Invariants
//! - New drafts go to the front of the collection; edits keep position.
//! - Draft ids are unique and strictly greater than every existing id.
//! - A failed submit never writes; a declined delete never writes.
//! - The form never stays bound to an id that is no longer persisted.
//!
//! # See also
//! - `crate::repo::draft_store` for the collection encoding.

use crate::model::draft::{validate_required, DraftId, DraftRecord, DraftValidationError};
use crate::model::form::{FormState, QuestionIndexOutOfRange};
use crate::render::list_view::EntryTrigger;
use crate::repo::draft_store::{DraftSnapshot, DraftStore};
use crate::repo::slot_repo::{RepoError, RepoResult, SlotRepository};
use chrono::Utc;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Read-modify-write attempts before a revision conflict is surfaced.
const MAX_SAVE_ATTEMPTS: usize = 3;

/// Service error for draft use-cases.
#[derive(Debug)]
pub enum DraftServiceError {
    /// Required field empty at submit time. Nothing was written.
    Validation(DraftValidationError),
    /// Referenced draft does not exist (stale or unknown id).
    NotFound(DraftId),
    /// Question section position does not exist.
    QuestionIndex(QuestionIndexOutOfRange),
    /// Stored ids already reach `DraftId::MAX`; no larger id exists.
    IdsExhausted,
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for DraftServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::NotFound(id) => write!(f, "draft not found: {id}"),
            Self::QuestionIndex(err) => write!(f, "{err}"),
            Self::IdsExhausted => write!(f, "no draft id left above the largest stored id"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DraftServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::QuestionIndex(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NotFound(_) | Self::IdsExhausted => None,
        }
    }
}

impl From<RepoError> for DraftServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<DraftValidationError> for DraftServiceError {
    fn from(value: DraftValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<QuestionIndexOutOfRange> for DraftServiceError {
    fn from(value: QuestionIndexOutOfRange) -> Self {
        Self::QuestionIndex(value)
    }
}

/// What a successful submit persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(DraftRecord),
    Updated(DraftRecord),
}

impl SubmitOutcome {
    pub fn record(&self) -> &DraftRecord {
        match self {
            Self::Created(record) | Self::Updated(record) => record,
        }
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(DraftRecord),
    /// User answered "no"; nothing changed.
    Declined,
}

/// Controller transition performed for a list-entry trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The form is now editing this draft.
    Selected(DraftId),
    Delete(DeleteOutcome),
}

/// Interactive yes/no gate consulted before a delete is written.
pub trait DeleteConfirmation {
    fn confirm_delete(&mut self, record: &DraftRecord) -> bool;
}

impl<F> DeleteConfirmation for F
where
    F: FnMut(&DraftRecord) -> bool,
{
    fn confirm_delete(&mut self, record: &DraftRecord) -> bool {
        self(record)
    }
}

/// Form controller over a drafts store.
pub struct DraftService<R: SlotRepository> {
    store: DraftStore<R>,
    clock: fn() -> i64,
}

impl<R: SlotRepository> DraftService<R> {
    /// Creates a controller using wall-clock epoch milliseconds.
    pub fn new(store: DraftStore<R>) -> Self {
        Self::with_clock(store, now_epoch_ms)
    }

    /// Creates a controller with an injected epoch-millisecond clock.
    pub fn with_clock(store: DraftStore<R>, clock: fn() -> i64) -> Self {
        Self { store, clock }
    }

    /// Reads the current collection, most-recent-first.
    pub fn list(&self) -> RepoResult<DraftSnapshot> {
        self.store.load()
    }

    /// Reads one draft by id.
    pub fn get(&self, id: DraftId) -> RepoResult<Option<DraftRecord>> {
        let snapshot = self.store.load()?;
        Ok(snapshot.find(id).cloned())
    }

    /// Switches the form to new-entry mode and clears every live value.
    pub fn start_create(&self, state: &mut FormState) {
        state.clear();
    }

    /// Binds the form to draft `id` and loads its content into live fields.
    ///
    /// # Errors
    /// - `NotFound` when `id` is not persisted; `state` is left untouched.
    pub fn start_edit(&self, state: &mut FormState, id: DraftId) -> Result<(), DraftServiceError> {
        let snapshot = self.store.load()?;
        let Some(record) = snapshot.find(id) else {
            warn!("event=draft_edit_start module=service status=not_found draft_id={id}");
            return Err(DraftServiceError::NotFound(id));
        };

        state.load_record(record);
        info!(
            "event=draft_edit_start module=service status=ok draft_id={id} questions={}",
            record.additional_questions.len()
        );
        Ok(())
    }

    /// Validates and persists the live form, then resets it to create mode.
    ///
    /// # Errors
    /// - `Validation` when company name or motivation text is blank; the
    ///   store and `state` are unchanged.
    /// - `NotFound` when the edited draft vanished; the form falls back to
    ///   create mode but keeps its live values so they can be resubmitted.
    /// - `Repo` on storage failure or a persistent revision conflict.
    pub fn submit(&mut self, state: &mut FormState) -> Result<SubmitOutcome, DraftServiceError> {
        if let Err(err) = validate_required(&state.company_name, &state.motivation_text) {
            warn!("event=draft_submit module=service status=invalid reason={err}");
            return Err(err.into());
        }

        let outcome = match state.session().editing_id() {
            Some(id) => {
                let result = self.update_from_form(state, id);
                if matches!(result, Err(DraftServiceError::NotFound(_))) {
                    state.detach_session();
                }
                result?
            }
            None => self.create_from_form(state)?,
        };

        self.start_create(state);
        Ok(outcome)
    }

    /// Deletes draft `id` after explicit confirmation.
    ///
    /// If the form was editing `id`, it falls back to create mode; this also
    /// happens when `id` turns out to be missing already.
    ///
    /// # Errors
    /// - `NotFound` when `id` is not persisted.
    pub fn delete_record(
        &mut self,
        state: &mut FormState,
        id: DraftId,
        confirm: &mut impl DeleteConfirmation,
    ) -> Result<DeleteOutcome, DraftServiceError> {
        let snapshot = self.store.load()?;
        let Some(record) = snapshot.find(id).cloned() else {
            release_if_editing(state, id);
            warn!("event=draft_delete module=service status=not_found draft_id={id}");
            return Err(DraftServiceError::NotFound(id));
        };

        if !confirm.confirm_delete(&record) {
            info!("event=draft_delete module=service status=declined draft_id={id}");
            return Ok(DeleteOutcome::Declined);
        }

        let removed = self.mutate(Some(snapshot), |records| {
            let index = records
                .iter()
                .position(|r| r.id == id)
                .ok_or(DraftServiceError::NotFound(id))?;
            Ok(records.remove(index))
        });
        if matches!(removed, Ok(_) | Err(DraftServiceError::NotFound(_))) {
            release_if_editing(state, id);
        }
        let removed = removed?;

        info!("event=draft_delete module=service status=ok draft_id={id}");
        Ok(DeleteOutcome::Deleted(removed))
    }

    /// Routes one list-entry trigger to exactly one controller operation.
    pub fn handle_trigger(
        &mut self,
        state: &mut FormState,
        trigger: EntryTrigger,
        confirm: &mut impl DeleteConfirmation,
    ) -> Result<TriggerOutcome, DraftServiceError> {
        match trigger {
            EntryTrigger::Select(id) => {
                self.start_edit(state, id)?;
                Ok(TriggerOutcome::Selected(id))
            }
            EntryTrigger::Delete(id) => self
                .delete_record(state, id, confirm)
                .map(TriggerOutcome::Delete),
        }
    }

    fn create_from_form(&mut self, state: &FormState) -> Result<SubmitOutcome, DraftServiceError> {
        let now = (self.clock)();
        let record = self.mutate(None, |records| {
            let id = next_draft_id(records, now).ok_or(DraftServiceError::IdsExhausted)?;
            let record = DraftRecord::new(
                id,
                &state.company_name,
                &state.motivation_text,
                state.collect_questions(),
                now,
            )?;
            records.insert(0, record.clone());
            Ok(record)
        })?;

        info!(
            "event=draft_submit module=service status=ok mode=create draft_id={} questions={}",
            record.id,
            record.additional_questions.len()
        );
        Ok(SubmitOutcome::Created(record))
    }

    fn update_from_form(
        &mut self,
        state: &FormState,
        id: DraftId,
    ) -> Result<SubmitOutcome, DraftServiceError> {
        let now = (self.clock)();
        let record = self.mutate(None, |records| {
            let record = records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(DraftServiceError::NotFound(id))?;
            record.apply_edit(
                &state.company_name,
                &state.motivation_text,
                state.collect_questions(),
                now,
            )?;
            Ok(record.clone())
        });

        match &record {
            Ok(record) => info!(
                "event=draft_submit module=service status=ok mode=update draft_id={} questions={}",
                record.id,
                record.additional_questions.len()
            ),
            Err(DraftServiceError::NotFound(_)) => {
                warn!("event=draft_submit module=service status=not_found draft_id={id}")
            }
            Err(_) => {}
        }
        Ok(SubmitOutcome::Updated(record?))
    }

    /// Runs `change` on a fresh copy of the collection and writes it back
    /// with a revision check, retrying on concurrent writes.
    ///
    /// `first` lets callers reuse a snapshot they already loaded.
    fn mutate<T>(
        &mut self,
        first: Option<DraftSnapshot>,
        mut change: impl FnMut(&mut Vec<DraftRecord>) -> Result<T, DraftServiceError>,
    ) -> Result<T, DraftServiceError> {
        let mut preloaded = first;
        let mut attempt = 1;
        loop {
            let snapshot = match preloaded.take() {
                Some(snapshot) => snapshot,
                None => self.store.load()?,
            };
            let mut records = snapshot.records;
            let value = change(&mut records)?;

            match self.store.save_if_unchanged(&records, snapshot.revision) {
                Ok(_) => return Ok(value),
                Err(RepoError::RevisionConflict { .. }) if attempt < MAX_SAVE_ATTEMPTS => {
                    warn!(
                        "event=drafts_save module=service status=retry attempt={attempt} reason=revision_conflict"
                    );
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Picks a creation-time id that is strictly greater than every existing id.
/// `None` when the largest stored id is already `DraftId::MAX`.
pub fn next_draft_id(records: &[DraftRecord], now: i64) -> Option<DraftId> {
    match records.iter().map(|record| record.id).max() {
        Some(max) if max >= now => max.checked_add(1),
        _ => Some(now),
    }
}

fn release_if_editing(state: &mut FormState, id: DraftId) {
    if state.session().editing_id() == Some(id) {
        state.detach_session();
    }
}

fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}
