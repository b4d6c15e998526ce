//! Line-oriented terminal surface

use std::io::{self, Write};

use super::{Element, WidgetSurface};
use crate::session::{Message, Sender};
use crate::voice::speakable_text;

/// Renders the chat window as lines of text
///
/// The terminal has every element; the window is "visible" while open and
/// bot messages are printed either as plain prose or as their HTML.
pub struct TerminalSurface<W: Write + Send> {
    out: W,
    input: String,
    html: bool,
    open: bool,
}

impl TerminalSurface<io::Stdout> {
    #[must_use]
    pub fn stdout(html: bool) -> Self {
        Self::new(io::stdout(), html)
    }
}

impl<W: Write + Send> TerminalSurface<W> {
    #[must_use]
    pub const fn new(out: W, html: bool) -> Self {
        Self {
            out,
            input: String::new(),
            html,
            open: false,
        }
    }

    #[must_use]
    pub const fn writer(&self) -> &W {
        &self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write to terminal");
        }
    }
}

impl<W: Write + Send> WidgetSurface for TerminalSurface<W> {
    fn has_element(&self, _element: Element) -> bool {
        true
    }

    fn set_visible(&mut self, element: Element, visible: bool) {
        match element {
            Element::Window if visible != self.open => {
                self.open = visible;
                if !visible {
                    self.line("[chat closed]");
                }
            }
            Element::StopSpeech if visible => self.line("[speaking]"),
            _ => {}
        }
    }

    fn focus_input(&mut self) {}

    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        value.clone_into(&mut self.input);
    }

    fn set_placeholder(&mut self, _text: &str) {}

    fn set_busy(&mut self, busy: bool) {
        if busy {
            self.line("...");
        }
    }

    fn append_message(&mut self, message: &Message) {
        if message.sender() == Sender::User {
            return;
        }
        let text = match message.rendered_html() {
            Some(html) if self.html => html.to_string(),
            _ => speakable_text(message.text()),
        };
        self.line(&format!("bot> {text}"));
    }

    fn scroll_to_bottom(&mut self) {}
}
