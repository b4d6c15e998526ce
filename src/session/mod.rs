//! Conversation session
//!
//! [`ChatSession`] owns the message log and the widget state and is the only
//! thing that mutates them. It is sans-IO: [`ChatSession::send`] hands back a
//! [`Dispatch`] describing the request to issue, and the caller reports the
//! outcome through [`ChatSession::complete`]. Only one request is in flight at
//! a time; further sends wait in a bounded FIFO queue and are dispatched as
//! earlier replies complete.
//!
//! ```text
//!            open                 send
//!   Closed ───────▶ Idle ───────────────────▶ AwaitingReply
//!     ▲              │ ▲                            │
//!     │ close        │ │ finished / error           │ reply
//!     └──────────────┘ └─────── Speaking ◀──────────┘
//! ```

mod message;

use std::collections::VecDeque;
use std::sync::Arc;

use uuid::Uuid;

pub use message::{Message, Sender};

use crate::config::WidgetConfig;
use crate::transport::{ChatReply, ChatTransport};
use crate::voice::{SpeechInputManager, SpeechOutputManager};

/// Snapshot of the widget state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionState {
    pub is_open: bool,
    pub is_listening: bool,
    pub is_speaking: bool,
    pub pending_request: bool,
}

/// Phase of the session state machine, derived from [`SessionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Idle,
    Listening,
    Speaking,
    AwaitingReply,
}

/// A request the caller must issue through the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub request_id: Uuid,
    pub query: String,
}

/// Result of [`ChatSession::send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input or closed window; nothing changed
    Ignored,
    /// User message appended; issue this request now
    Dispatched(Dispatch),
    /// User message appended; the request waits behind the one in flight
    Queued,
    /// Queue full; nothing changed
    Rejected,
}

/// In-memory conversation and widget state
pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    input: SpeechInputManager,
    output: SpeechOutputManager,
    messages: Vec<Message>,
    is_open: bool,
    in_flight: Option<Uuid>,
    queue: VecDeque<Dispatch>,
    max_queued: usize,
    failure_message: String,
    error_prefix: String,
}

impl ChatSession {
    #[must_use]
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        input: SpeechInputManager,
        output: SpeechOutputManager,
        config: &WidgetConfig,
    ) -> Self {
        Self {
            transport,
            input,
            output,
            messages: Vec::new(),
            is_open: false,
            in_flight: None,
            queue: VecDeque::new(),
            max_queued: config.max_queued,
            failure_message: config.failure_message.clone(),
            error_prefix: config.error_prefix.clone(),
        }
    }

    /// Messages in creation order
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState {
            is_open: self.is_open,
            is_listening: self.input.is_listening(),
            is_speaking: self.output.is_speaking(),
            pending_request: self.in_flight.is_some(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        let state = self.state();
        if !state.is_open {
            Phase::Closed
        } else if state.is_listening {
            Phase::Listening
        } else if state.is_speaking {
            Phase::Speaking
        } else if state.pending_request {
            Phase::AwaitingReply
        } else {
            Phase::Idle
        }
    }

    /// Sends waiting behind the in-flight request
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn transport(&self) -> Arc<dyn ChatTransport> {
        Arc::clone(&self.transport)
    }

    /// Whether the host offers voice capture
    #[must_use]
    pub fn capture_available(&self) -> bool {
        self.input.is_available()
    }

    /// Whether the host offers voice synthesis
    #[must_use]
    pub fn playback_available(&self) -> bool {
        self.output.is_available()
    }

    pub fn open(&mut self) {
        if !self.is_open {
            self.is_open = true;
            tracing::debug!("chat window opened");
        }
    }

    /// Close the window, cancelling capture and playback
    ///
    /// An in-flight request keeps running; its reply is still logged.
    pub fn close(&mut self) {
        self.input.stop_capture();
        self.output.cancel();
        if self.is_open {
            self.is_open = false;
            tracing::debug!(pending = self.in_flight.is_some(), "chat window closed");
        }
    }

    pub fn toggle(&mut self) {
        if self.is_open {
            self.close();
        } else {
            self.open();
        }
    }

    /// Append a user message and schedule its request
    pub fn send(&mut self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() || !self.is_open {
            return SendOutcome::Ignored;
        }
        if self.in_flight.is_some() && self.queue.len() >= self.max_queued {
            tracing::warn!(queued = self.queue.len(), "send rejected, queue is full");
            return SendOutcome::Rejected;
        }

        self.messages.push(Message::user(text));
        self.input.stop_capture();
        self.output.cancel();

        let dispatch = Dispatch {
            request_id: Uuid::new_v4(),
            query: text.to_string(),
        };

        if self.in_flight.is_some() {
            tracing::debug!(request_id = %dispatch.request_id, "request queued");
            self.queue.push_back(dispatch);
            SendOutcome::Queued
        } else {
            tracing::debug!(request_id = %dispatch.request_id, "request dispatched");
            self.in_flight = Some(dispatch.request_id);
            SendOutcome::Dispatched(dispatch)
        }
    }

    /// Record the reply to the in-flight request
    ///
    /// Returns the next queued request, which is now in flight. Replies to
    /// unknown requests are dropped.
    pub fn complete(&mut self, request_id: Uuid, reply: ChatReply) -> Option<Dispatch> {
        if self.in_flight != Some(request_id) {
            tracing::debug!(%request_id, "dropping reply to unknown request");
            return None;
        }
        self.in_flight = None;

        match reply {
            ChatReply::Answer { text, sources } => {
                tracing::info!(%request_id, sources = sources.len(), "answer received");
                self.messages.push(Message::bot(text.as_str()));
                if !self.is_open {
                    tracing::debug!(%request_id, "window closed, answer logged silently");
                } else if self.input.is_listening() {
                    tracing::debug!(%request_id, "capture active, answer not spoken");
                } else {
                    self.output.speak(&text);
                }
            }
            ChatReply::Remote(error) => {
                tracing::info!(%request_id, %error, "endpoint reported an error");
                self.messages
                    .push(Message::bot(format!("{}{error}", self.error_prefix)));
            }
            ChatReply::Failure(detail) => {
                tracing::warn!(%request_id, %detail, "chat request failed");
                self.messages.push(Message::bot(self.failure_message.as_str()));
            }
        }

        let next = self.queue.pop_front()?;
        self.in_flight = Some(next.request_id);
        tracing::debug!(request_id = %next.request_id, "queued request dispatched");
        Some(next)
    }

    /// Send and await every resulting exchange through the transport
    pub async fn submit(&mut self, text: &str) -> SendOutcome {
        let outcome = self.send(text);
        if let SendOutcome::Dispatched(dispatch) = &outcome {
            let mut next = Some(dispatch.clone());
            while let Some(dispatch) = next {
                let reply = self.transport.send(&dispatch.query).await;
                next = self.complete(dispatch.request_id, reply);
            }
        }
        outcome
    }

    /// Begin voice capture, cancelling playback first
    pub fn start_listening(&mut self) -> bool {
        if !self.is_open {
            return false;
        }
        self.output.cancel();
        self.input.start_capture()
    }

    pub fn stop_listening(&mut self) {
        self.input.stop_capture();
    }

    /// Final transcript from the recognizer; sent like typed text
    pub fn on_transcript(&mut self, text: &str) -> SendOutcome {
        match self.input.on_transcript(text) {
            Some(text) => self.send(&text),
            None => SendOutcome::Ignored,
        }
    }

    pub fn on_capture_error(&mut self, reason: &str) {
        self.input.on_error(reason);
    }

    pub fn on_capture_end(&mut self) {
        self.input.on_end();
    }

    pub fn on_speech_finished(&mut self) {
        self.output.on_finished();
    }

    pub fn on_speech_error(&mut self, reason: &str) {
        self.output.on_error(reason);
    }

    pub fn stop_speaking(&mut self) {
        self.output.cancel();
    }
}
