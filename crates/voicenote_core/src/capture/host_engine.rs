//! Dictation engine driven by the embedding host.
//!
//! # Responsibility
//! - Let a UI host (FFI bridge, terminal front end) forward recognizer
//!   callbacks into the capture session's stream.
//!
//! # Invariants
//! - At most one session is live; starting a new one ends the previous feed.
//! - A stale stream's stop hook never detaches a newer session.

use super::dictation::{
    dictation_channel, DictationConfig, DictationEngine, DictationError, DictationFeed,
    DictationStream, RecognitionErrorCode, RecognitionResult,
};
use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct HostFeedState {
    generation: u64,
    feed: Option<DictationFeed>,
    config: Option<DictationConfig>,
}

/// Cloneable engine handle; every clone addresses the same live session.
#[derive(Debug, Clone)]
pub struct HostDictationEngine {
    available: bool,
    state: Arc<Mutex<HostFeedState>>,
}

impl HostDictationEngine {
    /// Creates an engine; `available = false` models a host without
    /// speech recognition.
    pub fn new(available: bool) -> Self {
        Self {
            available,
            state: Arc::new(Mutex::new(HostFeedState::default())),
        }
    }

    /// Whether a session is currently accepting events.
    pub fn is_listening(&self) -> bool {
        self.lock_state()
            .feed
            .as_ref()
            .is_some_and(|feed| !feed.is_closed())
    }

    /// Configuration of the most recently started session.
    pub fn active_config(&self) -> Option<DictationConfig> {
        self.lock_state().config.clone()
    }

    /// Forwards the full segment list; `false` when no session listens.
    pub fn push_results(&self, results: Vec<RecognitionResult>) -> bool {
        self.with_feed(|feed| feed.push_results(results))
    }

    pub fn push_error(&self, code: RecognitionErrorCode) -> bool {
        self.with_feed(|feed| feed.push_error(code))
    }

    /// Reports that the host engine ended the session on its own.
    pub fn end(&self) -> bool {
        let mut state = self.lock_state();
        match state.feed.take() {
            Some(feed) => feed.end(),
            None => false,
        }
    }

    fn with_feed(&self, send: impl FnOnce(&DictationFeed) -> bool) -> bool {
        let state = self.lock_state();
        match state.feed.as_ref() {
            Some(feed) => send(feed),
            None => false,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, HostFeedState> {
        // A panic while holding the lock leaves plain data behind; keep using it.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DictationEngine for HostDictationEngine {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&mut self, config: &DictationConfig) -> Result<DictationStream, DictationError> {
        if !self.available {
            return Err(DictationError::Unavailable);
        }

        let mut state = self.lock_state();
        if let Some(previous) = state.feed.take() {
            warn!("event=dictation_start module=capture status=replacing_live_session");
            previous.end();
        }
        state.generation += 1;
        let generation = state.generation;

        let shared = Arc::clone(&self.state);
        let (feed, stream) = dictation_channel(move || {
            let mut state = shared
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if state.generation == generation {
                state.feed = None;
            }
        });
        state.feed = Some(feed);
        state.config = Some(config.clone());

        info!(
            "event=dictation_start module=capture status=ok engine=host locale={} continuous={} interim={}",
            config.locale, config.continuous, config.interim_results
        );
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::HostDictationEngine;
    use crate::capture::dictation::{
        DictationConfig, DictationEngine, DictationError, DictationEvent, RecognitionResult,
    };
    use futures::executor::block_on;
    use futures::StreamExt;

    #[test]
    fn unavailable_engine_refuses_to_start() {
        let mut engine = HostDictationEngine::new(false);
        let err = engine
            .start(&DictationConfig::default())
            .err()
            .expect("start must fail");
        assert_eq!(err, DictationError::Unavailable);
        assert!(!engine.push_results(vec![RecognitionResult::interim("x")]));
    }

    #[test]
    fn pushes_reach_the_started_stream() {
        let mut engine = HostDictationEngine::new(true);
        let host = engine.clone();
        let mut stream = engine.start(&DictationConfig::default()).unwrap();

        assert!(host.is_listening());
        assert!(host.push_results(vec![RecognitionResult::interim("hi")]));
        let event = block_on(stream.next()).expect("event expected");
        assert!(matches!(event, DictationEvent::Results(ref results) if results.len() == 1));
        assert_eq!(host.active_config(), Some(DictationConfig::default()));
    }

    #[test]
    fn stopping_stream_detaches_feed() {
        let mut engine = HostDictationEngine::new(true);
        let host = engine.clone();
        let mut stream = engine.start(&DictationConfig::default()).unwrap();
        stream.stop();

        assert!(!host.is_listening());
        assert!(!host.push_results(vec![RecognitionResult::interim("late")]));
    }

    #[test]
    fn stale_stream_drop_keeps_newer_session() {
        let mut engine = HostDictationEngine::new(true);
        let host = engine.clone();
        let stale = engine.start(&DictationConfig::default()).unwrap();
        let _fresh = engine.start(&DictationConfig::default()).unwrap();
        drop(stale);

        assert!(host.is_listening());
        assert!(host.push_results(vec![RecognitionResult::interim("ok")]));
    }
}
