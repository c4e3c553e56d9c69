//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Let the UI host forward speech-recognition callbacks into core.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One `NoteApp` owns one note store and one capture session; no
//!   process-wide session state exists.
//! - Timestamps cross the boundary as ISO-8601 strings.

use log::warn;
use std::sync::{Arc, Mutex};
use voicenote_core::capture::RecognitionAlternative;
use voicenote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CaptureError, CaptureMode, CaptureSession, DictationConfig, HostDictationEngine,
    LoggingConfig, Note, NoteStore, Notifier, RecognitionErrorCode, RecognitionResult,
    SaveOutcome, SqliteStorage, StoreConfig,
};

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let config = LoggingConfig::new(log_dir.trim()).with_level(level);
    match init_logging_inner(&config) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Note projection for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    /// ISO-8601 UTC with millisecond precision.
    pub created_at: String,
    pub content: String,
}

/// Snapshot of the capture dialog state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureView {
    /// `idle` or `editing`.
    pub mode: String,
    pub content: String,
    pub is_recording: bool,
    pub shows_onboarding: bool,
}

/// One recognizer segment forwarded by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct DictationSegment {
    pub transcript: String,
    pub confidence: f32,
    pub is_final: bool,
}

/// Notice the host should present (`success` toast or `blocking` alert).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeItem {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
struct QueuedNotifier {
    queue: Arc<Mutex<Vec<NoticeItem>>>,
}

impl QueuedNotifier {
    fn push(&self, kind: &str, message: &str) {
        let mut queue = self
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        queue.push(NoticeItem {
            kind: kind.to_string(),
            message: message.to_string(),
        });
    }

    fn drain(&self) -> Vec<NoticeItem> {
        let mut queue = self
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *queue)
    }
}

impl Notifier for QueuedNotifier {
    fn success(&self, message: &str) {
        self.push("success", message);
    }

    fn blocking_notice(&self, message: &str) {
        self.push("blocking", message);
    }
}

/// Application handle held by the Dart side.
#[flutter_rust_bridge::frb(opaque)]
pub struct NoteApp {
    store: NoteStore<SqliteStorage>,
    capture: CaptureSession<HostDictationEngine, QueuedNotifier>,
    engine: HostDictationEngine,
    notices: QueuedNotifier,
}

impl NoteApp {
    /// Opens the note database and loads persisted notes.
    ///
    /// - `db_path`: SQLite file; empty string opens an in-memory store.
    /// - `origin`: storage scope, e.g. the app bundle id.
    /// - `dictation_available`: whether the host has speech recognition.
    /// - `locale`: recognition language; `None` keeps the default.
    #[flutter_rust_bridge::frb(sync)]
    pub fn open(
        db_path: String,
        origin: String,
        dictation_available: bool,
        locale: Option<String>,
    ) -> Result<NoteApp, String> {
        let db_path = db_path.trim();
        let storage = if db_path.is_empty() {
            SqliteStorage::open_in_memory(origin)
        } else {
            SqliteStorage::open(db_path, origin)
        }
        .map_err(|err| format!("note_app_open failed: {err}"))?;

        let mut config = DictationConfig::default();
        if let Some(locale) = locale.filter(|value| !value.trim().is_empty()) {
            config.locale = locale.trim().to_string();
        }

        let engine = HostDictationEngine::new(dictation_available);
        let notices = QueuedNotifier::default();
        Ok(Self {
            store: NoteStore::initialize(storage, StoreConfig::default()),
            capture: CaptureSession::new(engine.clone(), notices.clone(), config),
            engine,
            notices,
        })
    }

    /// Full note list, newest first.
    #[flutter_rust_bridge::frb(sync)]
    pub fn notes(&self) -> Vec<NoteItem> {
        self.store.notes().iter().map(to_note_item).collect()
    }

    /// Filtered list for the search field; empty query returns all notes.
    #[flutter_rust_bridge::frb(sync)]
    pub fn search(&self, query: String) -> Vec<NoteItem> {
        self.store
            .search(query.as_str())
            .into_iter()
            .map(to_note_item)
            .collect()
    }

    /// Deletes a note by id; unknown ids are not an error.
    #[flutter_rust_bridge::frb(sync)]
    pub fn delete_note(&mut self, id: String) -> Result<Vec<NoteItem>, String> {
        self.store
            .delete(id.as_str())
            .map(|notes| notes.iter().map(to_note_item).collect())
            .map_err(|err| format!("delete_note failed: {err}"))
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn capture_state(&self) -> CaptureView {
        CaptureView {
            mode: match self.capture.mode() {
                CaptureMode::Idle => "idle",
                CaptureMode::Editing => "editing",
            }
            .to_string(),
            content: self.capture.content().to_string(),
            is_recording: self.capture.is_recording(),
            shows_onboarding: self.capture.shows_onboarding(),
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn start_editor(&mut self) -> CaptureView {
        self.capture.start_editor();
        self.capture_state()
    }

    /// Applies a text-field edit.
    #[flutter_rust_bridge::frb(sync)]
    pub fn set_content(&mut self, content: String) -> CaptureView {
        self.capture.set_content(content);
        self.capture_state()
    }

    /// Starts dictation. Unavailability is reported through the notice
    /// queue and leaves the state unchanged.
    #[flutter_rust_bridge::frb(sync)]
    pub fn start_recording(&mut self) -> Result<CaptureView, String> {
        match self.capture.start_recording() {
            Ok(()) | Err(CaptureError::DictationUnavailable) => Ok(self.capture_state()),
            Err(err) => Err(format!("start_recording failed: {err}")),
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn stop_recording(&mut self) -> CaptureView {
        self.capture.stop_recording();
        self.capture_state()
    }

    /// Forwards a recognizer result callback (all segments so far).
    #[flutter_rust_bridge::frb(sync)]
    pub fn push_dictation_results(&mut self, segments: Vec<DictationSegment>) -> CaptureView {
        let results = segments.into_iter().map(to_recognition_result).collect();
        if !self.engine.push_results(results) {
            warn!("event=ffi_dictation module=ffi status=dropped reason=no_session");
        }
        self.capture.pump_pending();
        self.capture_state()
    }

    /// Forwards a recognizer error callback, e.g. `no-speech`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn push_dictation_error(&mut self, code: String) -> CaptureView {
        if !self.engine.push_error(RecognitionErrorCode::parse(code.as_str())) {
            warn!("event=ffi_dictation module=ffi status=dropped reason=no_session");
        }
        self.capture.pump_pending();
        self.capture_state()
    }

    /// Forwards the recognizer's own end-of-session callback.
    #[flutter_rust_bridge::frb(sync)]
    pub fn end_dictation(&mut self) -> CaptureView {
        self.engine.end();
        self.capture.pump_pending();
        self.capture_state()
    }

    /// Saves current content. Returns `None` when content was empty.
    #[flutter_rust_bridge::frb(sync)]
    pub fn save(&mut self) -> Result<Option<NoteItem>, String> {
        match self.capture.save(&mut self.store) {
            Ok(SaveOutcome::Saved(note)) => Ok(Some(to_note_item(&note))),
            Ok(SaveOutcome::Rejected) => Ok(None),
            Err(err) => Err(format!("save failed: {err}")),
        }
    }

    /// Drains notices queued since the last call.
    #[flutter_rust_bridge::frb(sync)]
    pub fn take_notices(&self) -> Vec<NoticeItem> {
        self.notices.drain()
    }
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.clone(),
        created_at: note
            .created_at
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        content: note.content.clone(),
    }
}

fn to_recognition_result(segment: DictationSegment) -> RecognitionResult {
    RecognitionResult {
        alternatives: vec![RecognitionAlternative {
            transcript: segment.transcript,
            confidence: segment.confidence,
        }],
        is_final: segment.is_final,
    }
}

#[cfg(test)]
mod tests {
    use super::{core_version, init_logging, ping, DictationSegment, NoteApp};

    fn segment(transcript: &str, is_final: bool) -> DictationSegment {
        DictationSegment {
            transcript: transcript.to_string(),
            confidence: 0.9,
            is_final,
        }
    }

    fn app(dictation_available: bool) -> NoteApp {
        NoteApp::open(String::new(), "test".to_string(), dictation_available, None)
            .expect("in-memory app should open")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn core_version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_dir() {
        let error = init_logging("info".to_string(), "relative/logs".to_string());
        assert!(error.contains("absolute"));
    }

    #[test]
    fn typed_note_flow_creates_searches_and_deletes() {
        let mut app = app(true);
        app.start_editor();
        app.set_content("buy milk".to_string());
        let saved = app.save().unwrap().expect("note saved");
        app.set_content("call mom".to_string());
        app.save().unwrap();

        assert_eq!(app.notes().len(), 2);
        assert_eq!(app.notes()[0].content, "call mom");
        assert!(saved.created_at.ends_with('Z'));
        assert_eq!(app.search("MILK".to_string()), vec![saved.clone()]);

        let notices = app.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|notice| notice.kind == "success"));
        assert!(app.take_notices().is_empty());

        let call_mom = app.notes()[0].id.clone();
        assert_eq!(app.delete_note(call_mom).unwrap(), vec![saved]);
    }

    #[test]
    fn dictation_flow_replaces_content_per_callback() {
        let mut app = app(true);
        let view = app.start_recording().unwrap();
        assert!(view.is_recording);
        assert_eq!(view.mode, "editing");

        app.push_dictation_results(vec![segment("hel", false)]);
        app.push_dictation_results(vec![segment("hello wor", false)]);
        let view = app.push_dictation_results(vec![segment("hello world", false)]);
        assert_eq!(view.content, "hello world");

        let view = app.stop_recording();
        assert!(!view.is_recording);
        assert_eq!(view.content, "hello world");
    }

    #[test]
    fn missing_dictation_queues_blocking_notice() {
        let mut app = app(false);
        let view = app.start_recording().unwrap();
        assert!(!view.is_recording);
        assert!(view.shows_onboarding);

        let notices = app.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, "blocking");
    }

    #[test]
    fn fatal_error_and_engine_end_stop_recording() {
        let mut app = app(true);
        app.start_recording().unwrap();
        app.push_dictation_results(vec![segment("keep", true)]);
        let view = app.push_dictation_error("audio-capture".to_string());
        assert!(!view.is_recording);
        assert_eq!(view.content, "keep");

        app.start_recording().unwrap();
        let view = app.end_dictation();
        assert!(!view.is_recording);
    }

    #[test]
    fn empty_save_returns_none() {
        let mut app = app(true);
        assert_eq!(app.save().unwrap(), None);
        assert!(app.take_notices().is_empty());
    }
}
