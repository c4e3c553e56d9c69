//! Dictation capability contract.
//!
//! # Responsibility
//! - Define engine configuration, result and error shapes.
//! - Provide the owned, cancellable event stream a capture session consumes.
//!
//! # Invariants
//! - Every `Results` event carries all segments seen so far in the session.
//! - After `DictationStream::stop` (or drop) the stream yields no more events
//!   and the engine's stop hook has run exactly once.

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::Stream;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Recognition session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictationConfig {
    /// BCP 47 language tag.
    pub locale: String,
    /// Keep listening until explicitly stopped.
    pub continuous: bool,
    pub max_alternatives: u32,
    /// Deliver partial (non-final) segments.
    pub interim_results: bool,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            locale: "pt-BR".to_string(),
            continuous: true,
            max_alternatives: 1,
            interim_results: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionAlternative {
    pub transcript: String,
    pub confidence: f32,
}

/// One recognized segment with its ranked alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub alternatives: Vec<RecognitionAlternative>,
    pub is_final: bool,
}

impl RecognitionResult {
    /// Single-alternative partial segment.
    pub fn interim(transcript: impl Into<String>) -> Self {
        Self::single(transcript, false)
    }

    /// Single-alternative finalized segment.
    pub fn finalized(transcript: impl Into<String>) -> Self {
        Self::single(transcript, true)
    }

    fn single(transcript: impl Into<String>, is_final: bool) -> Self {
        Self {
            alternatives: vec![RecognitionAlternative {
                transcript: transcript.into(),
                confidence: 1.0,
            }],
            is_final,
        }
    }

    /// Best-ranked transcript, or `""` when the engine sent no alternative.
    pub fn best_transcript(&self) -> &str {
        self.alternatives
            .first()
            .map_or("", |alternative| alternative.transcript.as_str())
    }
}

/// Rebuilds the full transcript from every segment delivered so far.
pub fn reconstruct_transcript(results: &[RecognitionResult]) -> String {
    results
        .iter()
        .map(RecognitionResult::best_transcript)
        .collect()
}

/// Error codes reported by a recognition engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorCode {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    ServiceNotAllowed,
    BadGrammar,
    LanguageNotSupported,
    Other(String),
}

impl RecognitionErrorCode {
    /// Parses a Web Speech style error code (`no-speech`, `not-allowed`, ...).
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "bad-grammar" => Self::BadGrammar,
            "language-not-supported" => Self::LanguageNotSupported,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio-capture",
            Self::Network => "network",
            Self::NotAllowed => "not-allowed",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::BadGrammar => "bad-grammar",
            Self::LanguageNotSupported => "language-not-supported",
            Self::Other(value) => value.as_str(),
        }
    }

    /// Whether the engine cannot keep producing results after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Aborted
                | Self::AudioCapture
                | Self::NotAllowed
                | Self::ServiceNotAllowed
                | Self::LanguageNotSupported
        )
    }
}

impl Display for RecognitionErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event delivered by an active dictation session.
#[derive(Debug, Clone, PartialEq)]
pub enum DictationEvent {
    /// Full set of finalized and interim segments seen so far.
    Results(Vec<RecognitionResult>),
    Error(RecognitionErrorCode),
    /// Engine ended the session on its own.
    Ended,
}

/// Failure to start a dictation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationError {
    /// Host exposes no speech-recognition capability.
    Unavailable,
    StartFailed(String),
}

impl Display for DictationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "speech recognition is not available"),
            Self::StartFailed(message) => write!(f, "failed to start dictation: {message}"),
        }
    }
}

impl Error for DictationError {}

/// Host speech-recognition capability.
pub trait DictationEngine {
    fn is_available(&self) -> bool;

    /// Starts a session; the returned stream is its only handle.
    fn start(&mut self, config: &DictationConfig) -> Result<DictationStream, DictationError>;
}

type StopHook = Box<dyn FnOnce() + Send>;

/// Owned handle of one running dictation session.
pub struct DictationStream {
    events: UnboundedReceiver<DictationEvent>,
    stop_hook: Option<StopHook>,
}

impl DictationStream {
    /// Cancels the session. Idempotent.
    pub fn stop(&mut self) {
        if let Some(hook) = self.stop_hook.take() {
            hook();
        }
        self.events.close();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_hook.is_none()
    }
}

impl Stream for DictationStream {
    type Item = DictationEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.is_stopped() {
            return Poll::Ready(None);
        }
        Pin::new(&mut self.events).poll_next(cx)
    }
}

impl Drop for DictationStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Producer side of a dictation stream, held by the engine.
#[derive(Debug, Clone)]
pub struct DictationFeed {
    events: UnboundedSender<DictationEvent>,
}

impl DictationFeed {
    /// Sends an event; returns `false` once the consumer stopped listening.
    pub fn send(&self, event: DictationEvent) -> bool {
        self.events.unbounded_send(event).is_ok()
    }

    pub fn push_results(&self, results: Vec<RecognitionResult>) -> bool {
        self.send(DictationEvent::Results(results))
    }

    pub fn push_error(&self, code: RecognitionErrorCode) -> bool {
        self.send(DictationEvent::Error(code))
    }

    /// Sends `Ended` and closes the channel.
    pub fn end(&self) -> bool {
        let delivered = self.send(DictationEvent::Ended);
        self.events.close_channel();
        delivered
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

/// Creates a connected feed/stream pair.
///
/// `stop_hook` runs once when the consumer stops or drops the stream.
pub fn dictation_channel(
    stop_hook: impl FnOnce() + Send + 'static,
) -> (DictationFeed, DictationStream) {
    let (tx, rx) = unbounded();
    (
        DictationFeed { events: tx },
        DictationStream {
            events: rx,
            stop_hook: Some(Box::new(stop_hook)),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::{
        dictation_channel, reconstruct_transcript, DictationEvent, RecognitionErrorCode,
        RecognitionResult,
    };
    use futures::executor::block_on;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn reconstruct_concatenates_best_alternatives() {
        let results = vec![
            RecognitionResult::finalized("hello "),
            RecognitionResult::interim("world"),
            RecognitionResult {
                alternatives: Vec::new(),
                is_final: false,
            },
        ];
        assert_eq!(reconstruct_transcript(&results), "hello world");
    }

    #[test]
    fn error_codes_parse_web_vocabulary() {
        assert_eq!(
            RecognitionErrorCode::parse("no-speech"),
            RecognitionErrorCode::NoSpeech
        );
        assert_eq!(
            RecognitionErrorCode::parse("not-allowed"),
            RecognitionErrorCode::NotAllowed
        );
        let other = RecognitionErrorCode::parse("mystery");
        assert_eq!(other.as_str(), "mystery");
        assert!(!other.is_fatal());
        assert!(RecognitionErrorCode::AudioCapture.is_fatal());
        assert!(!RecognitionErrorCode::Network.is_fatal());
    }

    #[test]
    fn stream_delivers_events_in_order_and_ends_with_feed() {
        let (feed, mut stream) = dictation_channel(|| {});
        assert!(feed.push_results(vec![RecognitionResult::interim("a")]));
        assert!(feed.end());

        let events = block_on(async {
            let mut events = Vec::new();
            while let Some(event) = stream.next().await {
                events.push(event);
            }
            events
        });
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], DictationEvent::Ended);
    }

    #[test]
    fn stop_runs_hook_once_and_closes_feed() {
        let stops = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&stops);
        let (feed, mut stream) = dictation_channel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        stream.stop();
        stream.stop();
        drop(stream);

        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(!feed.push_results(vec![RecognitionResult::interim("late")]));
    }

    #[test]
    fn dropping_stream_runs_hook() {
        let stops = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&stops);
        let (_feed, stream) = dictation_channel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(stream);
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }
}
