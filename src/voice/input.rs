//! Voice capture

use crate::Result;
use crate::config::SpeechConfig;

/// Settings handed to the recognizer on every activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    /// Input locale (e.g. "en-US")
    pub lang: String,
    /// Keep listening after the first result
    pub continuous: bool,
    /// Report partial transcripts while the user speaks
    pub interim_results: bool,
}

impl RecognitionConfig {
    /// One-shot recognition: a single final transcript, no interim results
    #[must_use]
    pub fn one_shot(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            continuous: false,
            interim_results: false,
        }
    }
}

/// Event reported by the host's recognizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Final transcript of the utterance
    Transcript(String),
    /// Recognition failed or was aborted
    Error(String),
    /// Recognizer stopped listening
    End,
}

/// Host voice-capture capability
pub trait SpeechRecognizer: Send {
    /// Whether the host can capture voice at all
    fn is_available(&self) -> bool;

    /// Begin one activation; results arrive later as [`CaptureEvent`]s
    ///
    /// # Errors
    ///
    /// Returns error if the host refuses to start recognition
    fn start(&mut self, config: &RecognitionConfig) -> Result<()>;

    /// Abort the current activation
    fn stop(&mut self);
}

/// Capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Listening,
}

/// Drives the recognizer through `Idle → Listening → Idle`
pub struct SpeechInputManager {
    recognizer: Box<dyn SpeechRecognizer>,
    config: RecognitionConfig,
    enabled: bool,
    state: CaptureState,
}

impl SpeechInputManager {
    /// Create a manager capturing in `config.input_lang`
    ///
    /// With `config.enabled` off the manager never reports itself available.
    #[must_use]
    pub fn new(recognizer: Box<dyn SpeechRecognizer>, config: &SpeechConfig) -> Self {
        Self {
            recognizer,
            config: RecognitionConfig::one_shot(config.input_lang.clone()),
            enabled: config.enabled,
            state: CaptureState::Idle,
        }
    }

    /// Whether voice capture is offered at all
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.enabled && self.recognizer.is_available()
    }

    #[must_use]
    pub const fn state(&self) -> CaptureState {
        self.state
    }

    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state == CaptureState::Listening
    }

    /// Start listening
    ///
    /// Returns `false` if capture is unavailable or the host refused to start.
    pub fn start_capture(&mut self) -> bool {
        if !self.is_available() {
            return false;
        }
        if self.is_listening() {
            return true;
        }

        match self.recognizer.start(&self.config) {
            Ok(()) => {
                self.state = CaptureState::Listening;
                tracing::debug!(lang = %self.config.lang, "voice capture started");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to start voice capture");
                false
            }
        }
    }

    /// Stop listening without waiting for a transcript
    pub fn stop_capture(&mut self) {
        if self.is_listening() {
            self.recognizer.stop();
            self.state = CaptureState::Idle;
            tracing::debug!("voice capture stopped");
        }
    }

    /// Accept the final transcript of the current activation
    ///
    /// Returns the text to send, or `None` if no capture was active or the
    /// transcript was blank.
    pub fn on_transcript(&mut self, text: &str) -> Option<String> {
        if !self.is_listening() {
            tracing::debug!("ignoring transcript outside of a capture");
            return None;
        }
        self.state = CaptureState::Idle;

        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        tracing::info!(transcript = %text, "voice transcript received");
        Some(text.to_string())
    }

    /// Recognition failed; the user has to start again
    pub fn on_error(&mut self, reason: &str) {
        if self.is_listening() {
            tracing::debug!(reason, "voice capture error");
        }
        self.state = CaptureState::Idle;
    }

    /// Recognizer ended on its own
    pub fn on_end(&mut self) {
        self.state = CaptureState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::Error;

    #[derive(Default)]
    struct Calls {
        starts: Vec<RecognitionConfig>,
        stops: usize,
    }

    struct Recorder {
        available: bool,
        refuse: bool,
        calls: Arc<Mutex<Calls>>,
    }

    impl SpeechRecognizer for Recorder {
        fn is_available(&self) -> bool {
            self.available
        }

        fn start(&mut self, config: &RecognitionConfig) -> Result<()> {
            if self.refuse {
                return Err(Error::Speech("not allowed".to_string()));
            }
            self.calls.lock().unwrap().starts.push(config.clone());
            Ok(())
        }

        fn stop(&mut self) {
            self.calls.lock().unwrap().stops += 1;
        }
    }

    fn manager_with(
        available: bool,
        refuse: bool,
        enabled: bool,
    ) -> (SpeechInputManager, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let recorder = Recorder {
            available,
            refuse,
            calls: Arc::clone(&calls),
        };
        let config = SpeechConfig {
            enabled,
            input_lang: "fr-FR".to_string(),
            ..SpeechConfig::default()
        };
        (SpeechInputManager::new(Box::new(recorder), &config), calls)
    }

    fn manager(available: bool, refuse: bool) -> (SpeechInputManager, Arc<Mutex<Calls>>) {
        manager_with(available, refuse, true)
    }

    #[test]
    fn disabled_capture_never_starts() {
        let (mut input, calls) = manager_with(true, false, false);
        assert!(!input.is_available());
        assert!(!input.start_capture());
        assert!(!input.is_listening());
        assert!(calls.lock().unwrap().starts.is_empty());
    }

    #[test]
    fn start_uses_one_shot_config() {
        let (mut input, calls) = manager(true, false);
        assert!(input.start_capture());
        assert!(input.is_listening());

        let calls = calls.lock().unwrap();
        assert_eq!(calls.starts, vec![RecognitionConfig::one_shot("fr-FR")]);
        assert!(!calls.starts[0].continuous);
        assert!(!calls.starts[0].interim_results);
    }

    #[test]
    fn unavailable_capture_is_a_no_op() {
        let (mut input, calls) = manager(false, false);
        assert!(!input.start_capture());
        input.stop_capture();
        assert_eq!(input.on_transcript("hello"), None);
        assert_eq!(input.state(), CaptureState::Idle);
        assert!(calls.lock().unwrap().starts.is_empty());
    }

    #[test]
    fn refused_start_stays_idle() {
        let (mut input, _) = manager(true, true);
        assert!(!input.start_capture());
        assert_eq!(input.state(), CaptureState::Idle);
    }

    #[test]
    fn transcript_is_delivered_once() {
        let (mut input, _) = manager(true, false);
        input.start_capture();
        assert_eq!(input.on_transcript("  bonjour  "), Some("bonjour".to_string()));
        assert_eq!(input.state(), CaptureState::Idle);
        assert_eq!(input.on_transcript("again"), None);
    }

    #[test]
    fn error_and_end_return_to_idle() {
        let (mut input, _) = manager(true, false);
        input.start_capture();
        input.on_error("no-speech");
        assert_eq!(input.state(), CaptureState::Idle);

        input.start_capture();
        input.on_end();
        assert_eq!(input.state(), CaptureState::Idle);
    }

    #[test]
    fn stop_only_calls_host_when_listening() {
        let (mut input, calls) = manager(true, false);
        input.stop_capture();
        assert_eq!(calls.lock().unwrap().stops, 0);

        input.start_capture();
        input.stop_capture();
        assert_eq!(calls.lock().unwrap().stops, 1);
    }
}
