//! Capture session: turning keystrokes or dictation into note content.
//!
//! # Responsibility
//! - Model the dictation capability as a cancellable event stream.
//! - Drive the idle/editing/recording state machine and hand finished
//!   content to the note store.
//!
//! # Invariants
//! - The active dictation stream is owned by exactly one session.
//! - Recognition results replace content; they never append across events.

pub mod dictation;
pub mod host_engine;
pub mod notifier;
pub mod session;

pub use dictation::{
    dictation_channel, reconstruct_transcript, DictationConfig, DictationEngine, DictationError,
    DictationEvent, DictationFeed, DictationStream, RecognitionAlternative, RecognitionErrorCode,
    RecognitionResult,
};
pub use host_engine::HostDictationEngine;
pub use notifier::{LogNotifier, Notifier, DICTATION_UNAVAILABLE_MESSAGE, NOTE_SAVED_MESSAGE};
pub use session::{CaptureError, CaptureMode, CaptureSession, CaptureUpdate, SaveOutcome, StopReason};
