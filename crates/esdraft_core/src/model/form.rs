//! Transient form state for one editing session.
//!
//! # Responsibility
//! - Hold live (unsaved) field values, including dynamically added question
//!   sections, as first-class state independent of any rendering.
//! - Track whether the form creates a new draft or edits an existing one.
//!
//! # Invariants
//! - A fresh `FormState` is always in create mode with empty fields.
//! - Question sections are addressed by position; positions are recomputed
//!   after removal and never used as identity.
//! - Character counts are advisory and never block submission.

use crate::model::draft::{DraftId, DraftRecord, QuestionAnswer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Advisory length threshold for every live text field.
pub const CHAR_LIMIT: usize = 400;

/// Whether the form is drafting a new record or editing an existing one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditingSession {
    /// New-entry mode.
    #[default]
    None,
    /// Bound to exactly one persisted draft.
    Editing(DraftId),
}

impl EditingSession {
    /// Returns the bound draft id in edit mode.
    pub fn editing_id(self) -> Option<DraftId> {
        match self {
            Self::None => None,
            Self::Editing(id) => Some(id),
        }
    }
}

/// Live length echo for one text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCount {
    /// Length in Unicode scalar values.
    pub length: usize,
    /// `true` once `length` exceeds `CHAR_LIMIT`.
    pub over_limit: bool,
}

impl CharCount {
    pub fn of(text: &str) -> Self {
        let length = text.chars().count();
        Self {
            length,
            over_limit: length > CHAR_LIMIT,
        }
    }
}

impl Display for CharCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "chars: {}", self.length)?;
        if self.over_limit {
            write!(f, " (over the {CHAR_LIMIT} character limit)")?;
        }
        Ok(())
    }
}

/// One live question/answer section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionSection {
    pub question: String,
    pub answer: String,
}

impl QuestionSection {
    /// Counter for the answer text, independent of the main text counter.
    pub fn answer_count(&self) -> CharCount {
        CharCount::of(&self.answer)
    }

    fn to_pair(&self) -> QuestionAnswer {
        QuestionAnswer::new(self.question.clone(), self.answer.clone())
    }
}

impl From<&QuestionAnswer> for QuestionSection {
    fn from(value: &QuestionAnswer) -> Self {
        Self {
            question: value.question.clone(),
            answer: value.answer.clone(),
        }
    }
}

/// Position passed to a section operation does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionIndexOutOfRange {
    /// 0-based; displayed 1-based.
    pub index: usize,
    pub len: usize,
}

impl Display for QuestionIndexOutOfRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "question section {} does not exist (form has {})",
            self.index + 1,
            self.len
        )
    }
}

impl Error for QuestionIndexOutOfRange {}

/// Live form values plus the editing session they belong to.
///
/// The host owns exactly one instance for the lifetime of its UI session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    session: EditingSession,
    pub company_name: String,
    pub motivation_text: String,
    questions: Vec<QuestionSection>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> EditingSession {
        self.session
    }

    pub fn questions(&self) -> &[QuestionSection] {
        &self.questions
    }

    /// Drops the session binding and every live value.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Returns to create mode without touching live values.
    pub(crate) fn detach_session(&mut self) {
        self.session = EditingSession::None;
    }

    /// Binds the form to `record` and mirrors its content into live fields.
    pub(crate) fn load_record(&mut self, record: &DraftRecord) {
        self.session = EditingSession::Editing(record.id);
        self.company_name = record.company_name.clone();
        self.motivation_text = record.motivation_text.clone();
        self.questions = record
            .additional_questions
            .iter()
            .map(QuestionSection::from)
            .collect();
    }

    pub fn set_company_name(&mut self, value: impl Into<String>) -> CharCount {
        self.company_name = value.into();
        CharCount::of(&self.company_name)
    }

    pub fn set_motivation_text(&mut self, value: impl Into<String>) -> CharCount {
        self.motivation_text = value.into();
        CharCount::of(&self.motivation_text)
    }

    pub fn motivation_count(&self) -> CharCount {
        CharCount::of(&self.motivation_text)
    }

    /// Appends one empty section and returns its position.
    pub fn add_question_section(&mut self) -> usize {
        self.questions.push(QuestionSection::default());
        self.questions.len() - 1
    }

    /// Removes the section at `index`; later sections shift down by one.
    pub fn remove_question_section(
        &mut self,
        index: usize,
    ) -> Result<QuestionSection, QuestionIndexOutOfRange> {
        self.check_index(index)?;
        Ok(self.questions.remove(index))
    }

    pub fn set_question(
        &mut self,
        index: usize,
        value: impl Into<String>,
    ) -> Result<CharCount, QuestionIndexOutOfRange> {
        self.check_index(index)?;
        let section = &mut self.questions[index];
        section.question = value.into();
        Ok(CharCount::of(&section.question))
    }

    pub fn set_answer(
        &mut self,
        index: usize,
        value: impl Into<String>,
    ) -> Result<CharCount, QuestionIndexOutOfRange> {
        self.check_index(index)?;
        let section = &mut self.questions[index];
        section.answer = value.into();
        Ok(section.answer_count())
    }

    /// Live sections in current order; empty sections are included.
    pub fn collect_questions(&self) -> Vec<QuestionAnswer> {
        self.questions.iter().map(QuestionSection::to_pair).collect()
    }

    fn check_index(&self, index: usize) -> Result<(), QuestionIndexOutOfRange> {
        if index >= self.questions.len() {
            return Err(QuestionIndexOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        Ok(())
    }
}
