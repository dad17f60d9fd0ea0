//! Draft list view model.
//!
//! # Responsibility
//! - Turn stored drafts into display entries in collection order.
//! - Expose per-entry triggers (select, delete) for the host to wire back
//!   into the form controller.
//!
//! # Invariants
//! - An empty collection renders as `DraftListView::Empty`, never as an
//!   empty entry list.
//! - Question blocks carry 1-based positions in persisted order.
//! - `\r\n`, `\r` and `\n` all render as line breaks.

use crate::model::draft::{DraftId, DraftRecord};
use chrono::{Local, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\n|\r|\n").expect("valid line break regex"));

/// Placeholder shown when nothing has been saved.
pub const EMPTY_PLACEHOLDER: &str = "No saved drafts yet.";

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Interactive affordance attached to one rendered entry.
///
/// Each trigger maps to exactly one controller operation; a delete never
/// also selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTrigger {
    /// Anywhere on the entry except its delete control: start editing.
    Select(DraftId),
    /// The entry's delete control.
    Delete(DraftId),
}

/// One rendered question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBlock {
    /// 1-based position label.
    pub position: usize,
    pub question_lines: Vec<String>,
    pub answer_lines: Vec<String>,
}

/// One rendered draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftEntryView {
    pub id: DraftId,
    pub company_name: String,
    pub saved_at_label: String,
    pub updated_at_label: Option<String>,
    pub body_lines: Vec<String>,
    pub questions: Vec<QuestionBlock>,
}

impl DraftEntryView {
    pub fn select_trigger(&self) -> EntryTrigger {
        EntryTrigger::Select(self.id)
    }

    pub fn delete_trigger(&self) -> EntryTrigger {
        EntryTrigger::Delete(self.id)
    }
}

/// Rendered drafts list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftListView {
    Empty,
    Entries(Vec<DraftEntryView>),
}

impl DraftListView {
    pub fn entries(&self) -> &[DraftEntryView] {
        match self {
            Self::Empty => &[],
            Self::Entries(entries) => entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Renders the collection in its stored order.
pub fn render_drafts(records: &[DraftRecord]) -> DraftListView {
    if records.is_empty() {
        return DraftListView::Empty;
    }
    DraftListView::Entries(records.iter().map(render_entry).collect())
}

fn render_entry(record: &DraftRecord) -> DraftEntryView {
    DraftEntryView {
        id: record.id,
        company_name: record.company_name.clone(),
        saved_at_label: format_timestamp(record.saved_at),
        updated_at_label: record.updated_at.map(format_timestamp),
        body_lines: split_lines(&record.motivation_text),
        questions: record
            .additional_questions
            .iter()
            .enumerate()
            .map(|(index, pair)| QuestionBlock {
                position: index + 1,
                question_lines: split_lines(&pair.question),
                answer_lines: split_lines(&pair.answer),
            })
            .collect(),
    }
}

/// Splits text on any newline convention.
pub fn split_lines(text: &str) -> Vec<String> {
    LINE_BREAK_RE.split(text).map(str::to_string).collect()
}

/// Formats epoch milliseconds in local time as `YYYY/MM/DD HH:MM:SS`.
///
/// Out-of-range values fall back to the raw number.
pub fn format_timestamp(epoch_ms: i64) -> String {
    match Local.timestamp_millis_opt(epoch_ms).single() {
        Some(at) => at.format(TIMESTAMP_FORMAT).to_string(),
        None => format!("@{epoch_ms}"),
    }
}

impl Display for DraftEntryView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[{}] {}", self.id, self.company_name)?;
        write!(f, "  saved: {}", self.saved_at_label)?;
        if let Some(updated) = &self.updated_at_label {
            write!(f, "  updated: {updated}")?;
        }
        writeln!(f)?;
        for line in &self.body_lines {
            writeln!(f, "  {line}")?;
        }
        for block in &self.questions {
            let mut question = block.question_lines.iter();
            writeln!(
                f,
                "  Q{}. {}",
                block.position,
                question.next().map(String::as_str).unwrap_or_default()
            )?;
            for line in question {
                writeln!(f, "      {line}")?;
            }
            for line in &block.answer_lines {
                writeln!(f, "      {line}")?;
            }
        }
        Ok(())
    }
}

impl Display for DraftListView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => writeln!(f, "{EMPTY_PLACEHOLDER}"),
            Self::Entries(entries) => {
                for (index, entry) in entries.iter().enumerate() {
                    if index > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{entry}")?;
                }
                Ok(())
            }
        }
    }
}
