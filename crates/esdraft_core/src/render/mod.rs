//! Projection of the drafts collection into display-ready entries.
//!
//! The renderer owns no state: output is a pure function of the records.

pub mod list_view;
