//! Persistence layer: named key-value slots and the drafts store on top.
//!
//! # Responsibility
//! - `slot_repo`: opaque string slots with revision-checked writes.
//! - `draft_store`: (de)serialization of the whole drafts collection.
//!
//! # Invariants
//! - The drafts collection is always read and written as one blob.
//! - Every successful slot write bumps that slot's revision by one.

pub mod draft_store;
pub mod slot_repo;
