//! Chat widget
//!
//! The widget binds a [`WidgetSurface`] (the host's rendering of the chat
//! window) to a [`ChatSession`](crate::session::ChatSession). Everything the
//! host observes (clicks, key presses, recognizer and synthesizer callbacks)
//! is posted as a [`UiEvent`] to one channel that the
//! [`ChatUiController`] drains.

mod controller;
mod terminal;

pub use controller::ChatUiController;
pub use terminal::TerminalSurface;

use uuid::Uuid;

use crate::session::Message;
use crate::transport::ChatReply;
use crate::voice::{CaptureEvent, PlaybackEvent};

/// Named elements the surface must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Toggle,
    Window,
    Close,
    Input,
    Send,
    Messages,
    Mic,
    StopSpeech,
}

impl Element {
    /// Every element the widget needs to activate
    pub const REQUIRED: [Self; 8] = [
        Self::Toggle,
        Self::Window,
        Self::Close,
        Self::Input,
        Self::Send,
        Self::Messages,
        Self::Mic,
        Self::StopSpeech,
    ];

    /// Element id on the host page
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Toggle => "chatbot-toggle",
            Self::Window => "chatbot-window",
            Self::Close => "chatbot-close",
            Self::Input => "chatbot-input",
            Self::Send => "chatbot-send",
            Self::Messages => "chatbot-messages",
            Self::Mic => "chatbot-mic",
            Self::StopSpeech => "chatbot-stop-speech",
        }
    }
}

/// Host rendering of the chat window
pub trait WidgetSurface: Send {
    fn has_element(&self, element: Element) -> bool;

    fn set_visible(&mut self, element: Element, visible: bool);

    fn focus_input(&mut self);

    /// Current content of the input field
    fn input_value(&self) -> String;

    fn set_input_value(&mut self, value: &str);

    fn set_placeholder(&mut self, text: &str);

    /// Show or hide the "assistant is typing" indicator
    fn set_busy(&mut self, busy: bool);

    /// Add a message to the end of the message list
    fn append_message(&mut self, message: &Message);

    fn scroll_to_bottom(&mut self);
}

/// Keyboard shortcuts handled by the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Submit the current input
    Enter,
    /// Close the window
    Escape,
}

/// Everything that can happen to the widget
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Toggle control clicked
    Toggle,
    /// Close control clicked
    Close,
    /// Send control clicked
    Send,
    /// Key pressed in the window
    Key(Key),
    /// Microphone control clicked
    Mic,
    /// Stop-speech control clicked
    StopSpeech,
    /// Input field edited
    Input(String),
    /// Recognizer callback
    Capture(CaptureEvent),
    /// Synthesizer callback
    Playback(PlaybackEvent),
    /// Transport finished a request
    Reply { request_id: Uuid, reply: ChatReply },
    /// Stop the event loop
    Shutdown,
}
