//! Draft domain model.
//!
//! # Responsibility
//! - Define the canonical record persisted in the drafts slot.
//! - Validate required fields on construction and on decode.
//!
//! # Invariants
//! - `id` is stable and never reused for another draft.
//! - `company_name` and `motivation_text` are never blank.
//! - `saved_at` is fixed at creation; `updated_at` stays `None` until the
//!   first edit.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier of one draft, derived from its creation time in epoch
/// milliseconds.
pub type DraftId = i64;

/// Validation failures for draft records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftValidationError {
    /// Company name is empty after trimming.
    EmptyCompanyName,
    /// Motivation text is empty after trimming.
    EmptyMotivationText,
}

impl Display for DraftValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCompanyName => write!(f, "companyName must not be empty"),
            Self::EmptyMotivationText => write!(f, "motivationText must not be empty"),
        }
    }
}

impl Error for DraftValidationError {}

/// One supplementary question/answer pair attached to a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

impl QuestionAnswer {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Canonical persisted draft.
///
/// Serialized with camelCase names so the stored blob reads
/// `{id, companyName, motivationText, additionalQuestions, savedAt, updatedAt?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDraftRecord")]
pub struct DraftRecord {
    pub id: DraftId,
    pub company_name: String,
    pub motivation_text: String,
    /// Display order is sequence order.
    pub additional_questions: Vec<QuestionAnswer>,
    /// Unix epoch milliseconds.
    pub saved_at: i64,
    /// Unix epoch milliseconds of the last edit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl DraftRecord {
    /// Creates a never-edited draft.
    ///
    /// Required fields are trimmed before validation and storage.
    ///
    /// # Errors
    /// - Returns `DraftValidationError` when a required field is blank.
    pub fn new(
        id: DraftId,
        company_name: &str,
        motivation_text: &str,
        additional_questions: Vec<QuestionAnswer>,
        saved_at: i64,
    ) -> Result<Self, DraftValidationError> {
        let record = Self {
            id,
            company_name: company_name.trim().to_string(),
            motivation_text: motivation_text.trim().to_string(),
            additional_questions,
            saved_at,
            updated_at: None,
        };
        record.validate()?;
        Ok(record)
    }

    /// Replaces the editable content and stamps `updated_at`.
    ///
    /// `id` and `saved_at` are left untouched. On error the record is not
    /// modified.
    pub fn apply_edit(
        &mut self,
        company_name: &str,
        motivation_text: &str,
        additional_questions: Vec<QuestionAnswer>,
        updated_at: i64,
    ) -> Result<(), DraftValidationError> {
        let company_name = company_name.trim();
        let motivation_text = motivation_text.trim();
        validate_required(company_name, motivation_text)?;

        self.company_name = company_name.to_string();
        self.motivation_text = motivation_text.to_string();
        self.additional_questions = additional_questions;
        self.updated_at = Some(updated_at);
        Ok(())
    }

    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), DraftValidationError> {
        validate_required(&self.company_name, &self.motivation_text)
    }
}

/// Checks the two required text fields in form order.
pub fn validate_required(
    company_name: &str,
    motivation_text: &str,
) -> Result<(), DraftValidationError> {
    if company_name.trim().is_empty() {
        return Err(DraftValidationError::EmptyCompanyName);
    }
    if motivation_text.trim().is_empty() {
        return Err(DraftValidationError::EmptyMotivationText);
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDraftRecord {
    id: DraftId,
    company_name: String,
    motivation_text: String,
    #[serde(default)]
    additional_questions: Vec<QuestionAnswer>,
    saved_at: i64,
    #[serde(default)]
    updated_at: Option<i64>,
}

impl TryFrom<RawDraftRecord> for DraftRecord {
    type Error = DraftValidationError;

    fn try_from(raw: RawDraftRecord) -> Result<Self, Self::Error> {
        let record = Self {
            id: raw.id,
            company_name: raw.company_name,
            motivation_text: raw.motivation_text,
            additional_questions: raw.additional_questions,
            saved_at: raw.saved_at,
            updated_at: raw.updated_at,
        };
        record.validate()?;
        Ok(record)
    }
}
