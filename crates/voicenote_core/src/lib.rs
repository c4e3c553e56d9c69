//! Core domain logic for VoiceNote.
//! This crate is the single source of truth for note and capture invariants.

pub mod capture;
pub mod db;
pub mod logging;
pub mod model;
pub mod search;
pub mod storage;
pub mod store;

pub use capture::{
    CaptureError, CaptureMode, CaptureSession, CaptureUpdate, DictationConfig, DictationEngine,
    DictationError, DictationEvent, DictationStream, HostDictationEngine, LogNotifier, Notifier,
    RecognitionErrorCode, RecognitionResult, SaveOutcome, StopReason,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::note::{Note, NoteId, NoteValidationError};
pub use search::filter::filter_notes;
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage, StorageError, StorageResult};
pub use store::{
    Clock, IdGenerator, NoteStore, StoreConfig, StoreError, StoreResult, SystemClock,
    UuidV4Generator, DEFAULT_STORAGE_KEY,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
