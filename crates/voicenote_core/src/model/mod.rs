//! Domain model for persisted notes.
//!
//! # Responsibility
//! - Define the canonical note record shared by store, search and capture.
//! - Own the persisted wire shape of a single note.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId` that is never reused.
//! - Notes are immutable after creation; deletion is a hard removal.

pub mod note;
