//! Capture session state machine.
//!
//! # Responsibility
//! - Track the composing state (`Idle`/`Editing`) and the parallel
//!   recording flag.
//! - Own the active dictation stream and apply its events.
//! - Hand non-empty content to the note store on save.
//!
//! # Invariants
//! - Each results event replaces `content` with the reconstructed transcript.
//! - Stopping dictation (user, engine end or fatal error) keeps `content`.
//! - Clearing `content` by editing returns the session to `Idle`.
//! - Save with empty content is a silent no-op.

use super::dictation::{
    reconstruct_transcript, DictationConfig, DictationEngine, DictationError, DictationEvent,
    DictationStream, RecognitionErrorCode,
};
use super::notifier::{Notifier, DICTATION_UNAVAILABLE_MESSAGE, NOTE_SAVED_MESSAGE};
use crate::model::note::Note;
use crate::storage::KeyValueStorage;
use crate::store::{NoteStore, StoreError};
use futures::{FutureExt, StreamExt};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Composing state. Recording runs in parallel to this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// No content; the onboarding prompt is shown.
    Idle,
    /// Content is being composed by typing or dictation.
    Editing,
}

/// Why a recording ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    User,
    EngineEnded,
    Error(RecognitionErrorCode),
}

/// Observable effect of one dictation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureUpdate {
    /// Content was replaced with this transcript.
    Transcript(String),
    /// Non-fatal engine error; recording continues.
    ErrorReported(RecognitionErrorCode),
    RecordingStopped(StopReason),
    /// Event arrived while nothing was recording.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(Note),
    /// Content was empty; nothing happened.
    Rejected,
}

#[derive(Debug)]
pub enum CaptureError {
    /// Host has no speech-recognition capability; state is unchanged.
    DictationUnavailable,
    Dictation(DictationError),
    Store(StoreError),
}

impl Display for CaptureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DictationUnavailable => write!(f, "{DICTATION_UNAVAILABLE_MESSAGE}"),
            Self::Dictation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CaptureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DictationUnavailable => None,
            Self::Dictation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for CaptureError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Composes one note at a time from typed text or dictation.
pub struct CaptureSession<E: DictationEngine, N: Notifier> {
    engine: E,
    notifier: N,
    config: DictationConfig,
    mode: CaptureMode,
    content: String,
    recording: Option<DictationStream>,
}

impl<E: DictationEngine, N: Notifier> CaptureSession<E, N> {
    pub fn new(engine: E, notifier: N, config: DictationConfig) -> Self {
        Self {
            engine,
            notifier,
            config,
            mode: CaptureMode::Idle,
            content: String::new(),
            recording: None,
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Whether the host should show the onboarding prompt.
    pub fn shows_onboarding(&self) -> bool {
        self.mode == CaptureMode::Idle
    }

    pub fn config(&self) -> &DictationConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Enters free-text mode.
    pub fn start_editor(&mut self) {
        self.mode = CaptureMode::Editing;
        debug!("event=capture_editor module=capture status=ok");
    }

    /// Starts a dictation session. No-op when already recording.
    ///
    /// # Errors
    /// - [`CaptureError::DictationUnavailable`] after showing a blocking
    ///   notice; the session state is left untouched.
    /// - [`CaptureError::Dictation`] when the engine fails to start.
    pub fn start_recording(&mut self) -> Result<(), CaptureError> {
        if self.is_recording() {
            debug!("event=dictation_start module=capture status=skipped reason=already_recording");
            return Ok(());
        }

        let started = if self.engine.is_available() {
            self.engine.start(&self.config)
        } else {
            Err(DictationError::Unavailable)
        };

        match started {
            Ok(stream) => {
                self.recording = Some(stream);
                self.mode = CaptureMode::Editing;
                info!(
                    "event=capture_recording module=capture status=started locale={}",
                    self.config.locale
                );
                Ok(())
            }
            Err(DictationError::Unavailable) => {
                warn!("event=capture_recording module=capture status=error error_code=unavailable");
                self.notifier.blocking_notice(DICTATION_UNAVAILABLE_MESSAGE);
                Err(CaptureError::DictationUnavailable)
            }
            Err(err) => {
                error!(
                    "event=capture_recording module=capture status=error error_code=start_failed error={}",
                    err
                );
                Err(CaptureError::Dictation(err))
            }
        }
    }

    /// Stops the active dictation session, keeping content.
    ///
    /// Returns `false` when nothing was recording.
    pub fn stop_recording(&mut self) -> bool {
        let Some(mut stream) = self.recording.take() else {
            return false;
        };
        stream.stop();
        info!(
            "event=capture_recording module=capture status=stopped reason=user content_chars={}",
            self.content.chars().count()
        );
        true
    }

    /// Replaces content from a direct text edit.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.mode = if self.content.is_empty() {
            CaptureMode::Idle
        } else {
            CaptureMode::Editing
        };
    }

    /// Applies one dictation event to the session.
    pub fn apply_event(&mut self, event: DictationEvent) -> CaptureUpdate {
        if self.recording.is_none() {
            debug!("event=dictation_event module=capture status=ignored reason=not_recording");
            return CaptureUpdate::Ignored;
        }

        match event {
            DictationEvent::Results(results) => {
                self.content = reconstruct_transcript(&results);
                self.mode = CaptureMode::Editing;
                debug!(
                    "event=dictation_event module=capture status=transcript segments={} content_chars={}",
                    results.len(),
                    self.content.chars().count()
                );
                CaptureUpdate::Transcript(self.content.clone())
            }
            DictationEvent::Error(code) if code.is_fatal() => {
                warn!(
                    "event=dictation_event module=capture status=error fatal=true error_code={}",
                    code
                );
                if let Some(mut stream) = self.recording.take() {
                    stream.stop();
                }
                CaptureUpdate::RecordingStopped(StopReason::Error(code))
            }
            DictationEvent::Error(code) => {
                warn!(
                    "event=dictation_event module=capture status=error fatal=false error_code={}",
                    code
                );
                CaptureUpdate::ErrorReported(code)
            }
            DictationEvent::Ended => {
                self.recording = None;
                info!("event=capture_recording module=capture status=stopped reason=engine_ended");
                CaptureUpdate::RecordingStopped(StopReason::EngineEnded)
            }
        }
    }

    /// Waits for the next dictation event and applies it.
    ///
    /// Returns `None` when nothing is recording.
    pub async fn next_update(&mut self) -> Option<CaptureUpdate> {
        let stream = self.recording.as_mut()?;
        let event = stream.next().await;
        let update = match event {
            Some(event) => self.apply_event(event),
            None => {
                self.recording = None;
                CaptureUpdate::RecordingStopped(StopReason::EngineEnded)
            }
        };
        Some(update)
    }

    /// Applies every event already delivered, without waiting.
    pub fn pump_pending(&mut self) -> Vec<CaptureUpdate> {
        let mut updates = Vec::new();
        while let Some(Some(update)) = self.next_update().now_or_never() {
            updates.push(update);
        }
        updates
    }

    /// Saves content as a new note.
    ///
    /// Empty content is rejected silently. An active recording is stopped
    /// first so no late transcript lands in the cleared editor. On store
    /// failure the content is kept for retry.
    pub fn save<S: KeyValueStorage>(
        &mut self,
        store: &mut NoteStore<S>,
    ) -> Result<SaveOutcome, CaptureError> {
        if self.content.is_empty() {
            debug!("event=capture_save module=capture status=skipped reason=empty_content");
            return Ok(SaveOutcome::Rejected);
        }

        self.stop_recording();

        let Some(note) = store.create_note(self.content.as_str())? else {
            return Ok(SaveOutcome::Rejected);
        };

        self.content.clear();
        self.mode = CaptureMode::Idle;
        self.notifier.success(NOTE_SAVED_MESSAGE);
        info!("event=capture_save module=capture status=ok id={}", note.id);
        Ok(SaveOutcome::Saved(note))
    }
}
