//! Voice input and output
//!
//! The widget never talks to audio hardware itself. Voice capture and voice
//! synthesis are host capabilities behind the [`SpeechRecognizer`] and
//! [`SpeechSynthesizer`] traits; the host reports progress by posting
//! [`CaptureEvent`]s and [`PlaybackEvent`]s to the widget's event channel.
//! Hosts without a capability hand in [`Unsupported`] and the widget
//! degrades to text only.

mod input;
mod output;

pub use input::{
    CaptureEvent, CaptureState, RecognitionConfig, SpeechInputManager, SpeechRecognizer,
};
pub use output::{
    PlaybackEvent, SpeechOutputManager, SpeechSynthesizer, Utterance, Voice, select_voice,
    speakable_text,
};

use crate::{Error, Result};

/// Host with neither voice capture nor voice synthesis
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

impl SpeechRecognizer for Unsupported {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&mut self, _config: &RecognitionConfig) -> Result<()> {
        Err(Error::Speech("voice capture is not supported".to_string()))
    }

    fn stop(&mut self) {}
}

impl SpeechSynthesizer for Unsupported {
    fn is_available(&self) -> bool {
        false
    }

    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(&mut self, _utterance: Utterance) -> Result<()> {
        Err(Error::Speech("voice synthesis is not supported".to_string()))
    }

    fn cancel(&mut self) {}
}
