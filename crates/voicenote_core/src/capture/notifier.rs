//! User-facing notices emitted by the capture session.
//!
//! The toast and dialog widgets live in the host; the session only reports
//! what to show through this trait.

use log::{info, warn};

/// Acknowledgment shown after a note is saved.
pub const NOTE_SAVED_MESSAGE: &str = "Note saved successfully!";
/// Blocking notice shown when dictation cannot start.
pub const DICTATION_UNAVAILABLE_MESSAGE: &str =
    "Speech recognition is not supported in this environment.";

/// Host presentation hooks.
pub trait Notifier {
    /// Non-blocking success acknowledgment (toast).
    fn success(&self, message: &str);
    /// Blocking notice the user must dismiss (alert).
    fn blocking_notice(&self, message: &str);
}

/// Writes notices to the log instead of a UI.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!("event=notice module=capture kind=success message={message:?}");
    }

    fn blocking_notice(&self, message: &str) {
        warn!("event=notice module=capture kind=blocking message={message:?}");
    }
}
