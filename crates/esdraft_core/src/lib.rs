//! Core logic for the motivation-letter draft keeper.
//! This crate is the single source of truth for draft invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError, ConfigOverrides};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::draft::{DraftId, DraftRecord, DraftValidationError, QuestionAnswer};
pub use model::form::{
    CharCount, EditingSession, FormState, QuestionIndexOutOfRange, QuestionSection, CHAR_LIMIT,
};
pub use render::list_view::{
    render_drafts, DraftEntryView, DraftListView, EntryTrigger, QuestionBlock, EMPTY_PLACEHOLDER,
};
pub use repo::draft_store::{DraftSnapshot, DraftStore, MalformedDrafts, DEFAULT_STORAGE_KEY};
pub use repo::slot_repo::{RepoError, RepoResult, Revision, SlotRepository, SqliteSlotRepository};
pub use service::draft_service::{
    DeleteConfirmation, DeleteOutcome, DraftService, DraftServiceError, SubmitOutcome,
    TriggerOutcome,
};
