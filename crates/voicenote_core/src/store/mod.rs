//! Note store: the single owner of the in-memory note list.
//!
//! # Responsibility
//! - Load the persisted collection once and keep memory and storage mirrored.
//! - Expose create/delete/search to presentation and capture layers.
//!
//! # Invariants
//! - Newest note is always at index 0.
//! - No two notes share an `id`.
//! - Every mutation rewrites the full collection before returning.

pub mod note_store;
pub mod sources;

pub use note_store::{NoteStore, StoreConfig, StoreError, StoreResult, DEFAULT_STORAGE_KEY};
pub use sources::{Clock, IdGenerator, SystemClock, UuidV4Generator};
