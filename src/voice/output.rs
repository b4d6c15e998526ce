//! Voice synthesis

use std::sync::LazyLock;

use regex::Regex;

use crate::Result;
use crate::config::SpeechConfig;

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*_#`~|]+").expect("valid regex"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// A synthesis voice offered by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    /// Display name (e.g. "Google français")
    pub name: String,
    /// BCP 47 locale (e.g. "fr-FR")
    pub lang: String,
}

impl Voice {
    #[must_use]
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// One unit of synthesized speech
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub lang: String,
    /// `None` leaves the choice to the host default
    pub voice: Option<Voice>,
    pub rate: f32,
}

/// Event reported by the host's synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Utterance played to the end
    Finished,
    /// Playback failed
    Error(String),
}

/// Host voice-synthesis capability
pub trait SpeechSynthesizer: Send {
    /// Whether the host can synthesize speech at all
    fn is_available(&self) -> bool;

    /// Voices currently known to the host
    ///
    /// May be empty on first use while the host is still loading them.
    fn voices(&self) -> Vec<Voice>;

    /// Queue an utterance; completion arrives later as a [`PlaybackEvent`]
    ///
    /// # Errors
    ///
    /// Returns error if the host rejects the utterance
    fn speak(&mut self, utterance: Utterance) -> Result<()>;

    /// Stop the current utterance
    fn cancel(&mut self);
}

/// Speaks bot replies, one utterance at a time
pub struct SpeechOutputManager {
    synthesizer: Box<dyn SpeechSynthesizer>,
    lang: String,
    preferred_voice: String,
    rate: f32,
    enabled: bool,
    speaking: bool,
}

impl SpeechOutputManager {
    #[must_use]
    pub fn new(synthesizer: Box<dyn SpeechSynthesizer>, config: &SpeechConfig) -> Self {
        Self {
            synthesizer,
            lang: config.output_lang.clone(),
            preferred_voice: config.preferred_voice.clone(),
            rate: config.rate,
            enabled: config.enabled,
            speaking: false,
        }
    }

    /// Whether voice synthesis is offered at all
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.enabled && self.synthesizer.is_available()
    }

    #[must_use]
    pub const fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Speak `text` after cancelling whatever is playing
    ///
    /// Markup is stripped first. Returns `true` if playback started.
    pub fn speak(&mut self, text: &str) -> bool {
        if !self.is_available() {
            return false;
        }
        self.cancel();

        let text = speakable_text(text);
        if text.is_empty() {
            return false;
        }

        let voices = self.synthesizer.voices();
        let voice = select_voice(&voices, &self.lang, &self.preferred_voice).cloned();
        tracing::debug!(
            voice = voice.as_ref().map_or("default", |v| v.name.as_str()),
            chars = text.len(),
            "speaking reply"
        );

        let utterance = Utterance {
            text,
            lang: self.lang.clone(),
            voice,
            rate: self.rate,
        };

        match self.synthesizer.speak(utterance) {
            Ok(()) => {
                self.speaking = true;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to start speech playback");
                false
            }
        }
    }

    /// Stop playback
    pub fn cancel(&mut self) {
        if self.speaking {
            self.synthesizer.cancel();
            self.speaking = false;
            tracing::debug!("speech playback cancelled");
        }
    }

    /// Utterance played to the end
    pub fn on_finished(&mut self) {
        self.speaking = false;
    }

    /// Playback failed
    pub fn on_error(&mut self, reason: &str) {
        tracing::debug!(reason, "speech playback error");
        self.speaking = false;
    }
}

/// Pick a voice for `lang`
///
/// A voice of the target language whose name contains `preferred`
/// (case-insensitive) wins, even from another region: a preferred fr-CA
/// voice beats a plain fr-FR one when targeting fr-FR. Among preferred
/// voices the exact locale comes first. Without one, the first voice of the
/// exact locale is used, then the first voice of the same language. `None`
/// means the host default should be used.
#[must_use]
pub fn select_voice<'a>(voices: &'a [Voice], lang: &str, preferred: &str) -> Option<&'a Voice> {
    let preferred = preferred.to_lowercase();
    let is_preferred =
        |voice: &Voice| !preferred.is_empty() && voice.name.to_lowercase().contains(&preferred);

    voices
        .iter()
        .filter_map(|voice| locale_rank(&voice.lang, lang).map(|rank| (voice, rank)))
        .min_by_key(|&(voice, rank)| (!is_preferred(voice), rank))
        .map(|(voice, _)| voice)
}

/// 0 for the same locale, 1 for the same primary language, `None` otherwise
fn locale_rank(voice_lang: &str, target: &str) -> Option<u8> {
    let normalize = |s: &str| s.trim().replace('_', "-").to_lowercase();
    let voice_lang = normalize(voice_lang);
    let target = normalize(target);

    if voice_lang.is_empty() || target.is_empty() {
        return None;
    }
    if voice_lang == target {
        return Some(0);
    }

    let primary = |s: &str| s.split('-').next().unwrap_or_default().to_string();
    (primary(&voice_lang) == primary(&target)).then_some(1)
}

/// Reduce markdown or HTML to plain prose for speech
#[must_use]
pub fn speakable_text(text: &str) -> String {
    let text = TAG_REGEX.replace_all(text, " ");
    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    let text = MARKER_REGEX.replace_all(&text, " ");
    WHITESPACE_REGEX.replace_all(&text, " ").trim().to_string()
}
