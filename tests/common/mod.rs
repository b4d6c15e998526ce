//! Shared test utilities

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use edurise_chat::config::{SpeechConfig, WidgetConfig};
use edurise_chat::voice::{
    RecognitionConfig, SpeechInputManager, SpeechOutputManager, SpeechRecognizer,
    SpeechSynthesizer, Utterance, Voice,
};
use edurise_chat::{ChatReply, ChatSession, ChatTransport, Element, Message, Result, WidgetSurface};
use tokio::sync::Notify;

/// Transport answering from a script, recording every query
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ChatReply>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(replies: impl IntoIterator<Item = ChatReply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            queries: Mutex::new(Vec::new()),
        })
    }

    /// Every query fails with "script exhausted"
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, query: &str) -> ChatReply {
        self.queries.lock().unwrap().push(query.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ChatReply::Failure("script exhausted".to_string()))
    }
}

/// Shorthand for a successful reply
pub fn answer(text: &str) -> ChatReply {
    ChatReply::Answer {
        text: text.to_string(),
        sources: Vec::new(),
    }
}

/// Everything the fake voice host was asked to do
#[derive(Debug, Default)]
pub struct VoiceLog {
    pub capture_starts: Vec<RecognitionConfig>,
    pub capture_stops: usize,
    pub spoken: Vec<Utterance>,
    pub cancels: usize,
}

pub type SharedVoiceLog = Arc<Mutex<VoiceLog>>;

pub struct FakeRecognizer {
    available: bool,
    log: SharedVoiceLog,
}

impl SpeechRecognizer for FakeRecognizer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&mut self, config: &RecognitionConfig) -> Result<()> {
        self.log.lock().unwrap().capture_starts.push(config.clone());
        Ok(())
    }

    fn stop(&mut self) {
        self.log.lock().unwrap().capture_stops += 1;
    }
}

pub struct FakeSynthesizer {
    available: bool,
    voices: Vec<Voice>,
    log: SharedVoiceLog,
}

impl SpeechSynthesizer for FakeSynthesizer {
    fn is_available(&self) -> bool {
        self.available
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&mut self, utterance: Utterance) -> Result<()> {
        self.log.lock().unwrap().spoken.push(utterance);
        Ok(())
    }

    fn cancel(&mut self) {
        self.log.lock().unwrap().cancels += 1;
    }
}

pub fn widget_config() -> WidgetConfig {
    WidgetConfig::default()
}

/// Session over `transport` with a fake voice host
pub fn session_with(
    transport: Arc<dyn ChatTransport>,
    voice: bool,
    config: &WidgetConfig,
) -> (ChatSession, SharedVoiceLog) {
    session_with_speech(transport, voice, &SpeechConfig::default(), config)
}

/// Like [`session_with`], with explicit speech settings
pub fn session_with_speech(
    transport: Arc<dyn ChatTransport>,
    voice: bool,
    speech: &SpeechConfig,
    config: &WidgetConfig,
) -> (ChatSession, SharedVoiceLog) {
    let log = SharedVoiceLog::default();
    let recognizer = FakeRecognizer {
        available: voice,
        log: Arc::clone(&log),
    };
    let synthesizer = FakeSynthesizer {
        available: voice,
        voices: vec![
            Voice::new("Alex", "en-US"),
            Voice::new("Google US English", "en-US"),
        ],
        log: Arc::clone(&log),
    };

    let session = ChatSession::new(
        transport,
        SpeechInputManager::new(Box::new(recognizer), speech),
        SpeechOutputManager::new(Box::new(synthesizer), speech),
        config,
    );
    (session, log)
}

/// Session with voice and the default widget config
pub fn session(transport: Arc<dyn ChatTransport>) -> (ChatSession, SharedVoiceLog) {
    session_with(transport, true, &widget_config())
}

/// What the fake surface currently shows
#[derive(Debug, Default)]
pub struct SurfaceState {
    pub visible: HashMap<Element, bool>,
    pub focus_count: usize,
    pub input: String,
    pub placeholder: String,
    pub busy: bool,
    pub messages: Vec<Message>,
    pub scrolls: usize,
}

impl SurfaceState {
    pub fn is_visible(&self, element: Element) -> bool {
        self.visible.get(&element).copied().unwrap_or(true)
    }
}

/// In-memory surface; state stays observable after the controller takes it
pub struct FakeSurface {
    elements: HashSet<Element>,
    state: Arc<Mutex<SurfaceState>>,
    appended: Arc<Notify>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::with_elements(&Element::REQUIRED)
    }

    pub fn with_elements(elements: &[Element]) -> Self {
        Self {
            elements: elements.iter().copied().collect(),
            state: Arc::default(),
            appended: Arc::default(),
        }
    }

    pub fn state(&self) -> Arc<Mutex<SurfaceState>> {
        Arc::clone(&self.state)
    }

    /// Notified whenever a message is appended
    pub fn appended(&self) -> Arc<Notify> {
        Arc::clone(&self.appended)
    }
}

impl WidgetSurface for FakeSurface {
    fn has_element(&self, element: Element) -> bool {
        self.elements.contains(&element)
    }

    fn set_visible(&mut self, element: Element, visible: bool) {
        self.state.lock().unwrap().visible.insert(element, visible);
    }

    fn focus_input(&mut self) {
        self.state.lock().unwrap().focus_count += 1;
    }

    fn input_value(&self) -> String {
        self.state.lock().unwrap().input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        self.state.lock().unwrap().input = value.to_string();
    }

    fn set_placeholder(&mut self, text: &str) {
        self.state.lock().unwrap().placeholder = text.to_string();
    }

    fn set_busy(&mut self, busy: bool) {
        self.state.lock().unwrap().busy = busy;
    }

    fn append_message(&mut self, message: &Message) {
        self.state.lock().unwrap().messages.push(message.clone());
        self.appended.notify_one();
    }

    fn scroll_to_bottom(&mut self) {
        self.state.lock().unwrap().scrolls += 1;
    }
}
