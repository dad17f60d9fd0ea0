//! Use-case services.
//!
//! # Responsibility
//! - Translate form actions into store read-modify-write cycles.
//! - Keep the host decoupled from storage details.

pub mod draft_service;
