//! Domain model for motivation-letter drafts and the transient edit form.
//!
//! # Responsibility
//! - Define the persisted `DraftRecord` shape and its invariants.
//! - Define the in-memory `FormState` owned by the host for one UI session.
//!
//! # Invariants
//! - Every persisted draft is identified by a unique, immutable `DraftId`.
//! - Form state is never persisted; it always starts in create mode.

pub mod draft;
pub mod form;
