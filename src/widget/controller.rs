//! Event wiring between the surface and the session

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{Element, Key, UiEvent, WidgetSurface};
use crate::config::WidgetConfig;
use crate::session::{ChatSession, Dispatch, SendOutcome, SessionState};
use crate::voice::{CaptureEvent, PlaybackEvent};
use crate::{Error, Result};

/// Drives a [`ChatSession`] from [`UiEvent`]s and mirrors it onto a surface
pub struct ChatUiController<S: WidgetSurface> {
    surface: S,
    session: ChatSession,
    events: UnboundedSender<UiEvent>,
    shown: SessionState,
    appended: usize,
    placeholder: String,
    listening_placeholder: String,
}

impl<S: WidgetSurface> ChatUiController<S> {
    /// Bind the session to the surface
    ///
    /// Returns the controller and the receiving end of its event channel;
    /// hosts post events through [`Self::sender`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Widget`] if the surface lacks a required element
    pub fn initialize(
        mut surface: S,
        session: ChatSession,
        config: &WidgetConfig,
    ) -> Result<(Self, UnboundedReceiver<UiEvent>)> {
        if let Some(missing) = Element::REQUIRED
            .into_iter()
            .find(|&element| !surface.has_element(element))
        {
            return Err(Error::Widget(format!(
                "missing element #{}",
                missing.id()
            )));
        }

        surface.set_visible(Element::Window, false);
        surface.set_visible(Element::StopSpeech, false);
        surface.set_visible(Element::Mic, session.capture_available());
        surface.set_placeholder(&config.placeholder);
        surface.set_busy(false);

        let (events, receiver) = mpsc::unbounded_channel();
        let mut controller = Self {
            surface,
            session,
            events,
            shown: SessionState::default(),
            appended: 0,
            placeholder: config.placeholder.clone(),
            listening_placeholder: config.listening_placeholder.clone(),
        };
        controller.sync();

        tracing::debug!(
            capture = controller.session.capture_available(),
            playback = controller.session.playback_available(),
            "chat widget initialized"
        );
        Ok((controller, receiver))
    }

    /// Handle for posting events to this controller
    #[must_use]
    pub fn sender(&self) -> UnboundedSender<UiEvent> {
        self.events.clone()
    }

    #[must_use]
    pub const fn session(&self) -> &ChatSession {
        &self.session
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Drain events until [`UiEvent::Shutdown`]
    pub async fn run(mut self, mut events: UnboundedReceiver<UiEvent>) -> Self {
        while let Some(event) = events.recv().await {
            if event == UiEvent::Shutdown {
                break;
            }
            self.handle(event);
        }
        tracing::debug!("chat widget event loop stopped");
        self
    }

    /// Apply one event and bring the surface up to date
    ///
    /// Must be called within a tokio runtime: requests are spawned onto it.
    pub fn handle(&mut self, event: UiEvent) {
        match event {
            UiEvent::Toggle => self.session.toggle(),
            UiEvent::Close | UiEvent::Key(Key::Escape) => self.session.close(),
            UiEvent::Send | UiEvent::Key(Key::Enter) => {
                let text = self.surface.input_value();
                let outcome = self.session.send(&text);
                self.after_send(outcome);
            }
            UiEvent::Mic => {
                if self.session.state().is_listening {
                    self.session.stop_listening();
                } else {
                    self.session.start_listening();
                }
            }
            UiEvent::StopSpeech => self.session.stop_speaking(),
            UiEvent::Input(value) => self.surface.set_input_value(&value),
            UiEvent::Capture(CaptureEvent::Transcript(text)) => {
                let outcome = self.session.on_transcript(&text);
                self.after_send(outcome);
            }
            UiEvent::Capture(CaptureEvent::Error(reason)) => self.session.on_capture_error(&reason),
            UiEvent::Capture(CaptureEvent::End) => self.session.on_capture_end(),
            UiEvent::Playback(PlaybackEvent::Finished) => self.session.on_speech_finished(),
            UiEvent::Playback(PlaybackEvent::Error(reason)) => {
                self.session.on_speech_error(&reason);
            }
            UiEvent::Reply { request_id, reply } => {
                if let Some(next) = self.session.complete(request_id, reply) {
                    self.dispatch(next);
                }
            }
            UiEvent::Shutdown => {}
        }
        self.sync();
    }

    fn after_send(&mut self, outcome: SendOutcome) {
        match outcome {
            SendOutcome::Dispatched(dispatch) => {
                self.surface.set_input_value("");
                self.dispatch(dispatch);
            }
            SendOutcome::Queued => self.surface.set_input_value(""),
            SendOutcome::Ignored | SendOutcome::Rejected => {}
        }
    }

    /// Run the request in the background and post its reply as an event
    fn dispatch(&self, dispatch: Dispatch) {
        let transport = self.session.transport();
        let events = self.events.clone();

        tokio::spawn(async move {
            let reply = transport.send(&dispatch.query).await;
            let event = UiEvent::Reply {
                request_id: dispatch.request_id,
                reply,
            };
            if events.send(event).is_err() {
                tracing::debug!(request_id = %dispatch.request_id, "widget gone, reply dropped");
            }
        });
    }

    fn sync(&mut self) {
        let state = self.session.state();

        if state.is_open != self.shown.is_open {
            self.surface.set_visible(Element::Window, state.is_open);
            if state.is_open {
                self.surface.focus_input();
            }
        }
        if state.is_listening != self.shown.is_listening {
            let placeholder = if state.is_listening {
                &self.listening_placeholder
            } else {
                &self.placeholder
            };
            self.surface.set_placeholder(placeholder);
        }
        if state.is_speaking != self.shown.is_speaking {
            self.surface.set_visible(Element::StopSpeech, state.is_speaking);
        }
        if state.pending_request != self.shown.pending_request {
            self.surface.set_busy(state.pending_request);
        }
        self.shown = state;

        let messages = self.session.messages();
        if messages.len() > self.appended {
            for message in &messages[self.appended..] {
                self.surface.append_message(message);
            }
            self.appended = messages.len();
            self.surface.scroll_to_bottom();
        }
    }
}
