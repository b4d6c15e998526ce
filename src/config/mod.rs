//! Configuration management for the chat assistant
//!
//! Every value is resolved as env var > TOML file > default.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result};

use file::ChatConfigFile;

/// Default answering endpoint (the relay's chat route)
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/chat";

/// Default remote RAG service
pub const DEFAULT_UPSTREAM_URL: &str = "https://yessinehakim-edurise.hf.space";

/// Default request timeout, matching the remote service's budget
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Chat assistant configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Answering endpoint configuration
    pub chat: ChatConfig,

    /// Voice input/output configuration
    pub speech: SpeechConfig,

    /// Widget texts and limits
    pub widget: WidgetConfig,

    /// Answering relay configuration
    pub relay: RelayConfig,
}

/// Answering endpoint configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// URL the widget posts `{query}` to
    pub endpoint: String,

    /// Health probe URL (defaults to `{endpoint}/health`)
    pub health_endpoint: String,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            health_endpoint: health_endpoint_for(DEFAULT_ENDPOINT),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Voice input/output configuration
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Enable voice input/output
    pub enabled: bool,

    /// Capture locale
    pub input_lang: String,

    /// Synthesis locale
    pub output_lang: String,

    /// Substring of the preferred voice name
    pub preferred_voice: String,

    /// Speech rate multiplier
    pub rate: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            input_lang: "en-US".to_string(),
            output_lang: "en-US".to_string(),
            preferred_voice: "Google".to_string(),
            rate: 1.0,
        }
    }
}

/// Widget texts and limits
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Input placeholder while idle
    pub placeholder: String,

    /// Input placeholder while listening
    pub listening_placeholder: String,

    /// Bot message shown when the answering endpoint fails
    pub failure_message: String,

    /// Prefix for error texts returned by the answering endpoint
    pub error_prefix: String,

    /// Sends that may wait behind the in-flight request
    pub max_queued: usize,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            placeholder: "Ask me anything...".to_string(),
            listening_placeholder: "Listening...".to_string(),
            failure_message: "Sorry, something went wrong. Please try again.".to_string(),
            error_prefix: "Error: ".to_string(),
            max_queued: 4,
        }
    }
}

/// Answering relay configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Port to listen on
    pub port: u16,

    /// Base URL of the remote RAG service
    pub upstream_url: String,

    /// Upstream request timeout
    pub timeout: Duration,

    /// Directory of static widget assets served as fallback
    pub static_dir: Option<PathBuf>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            static_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if a resolved value is invalid
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::resolve(fc, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with values looked up by `env`
    ///
    /// # Errors
    ///
    /// Returns error if a resolved value is invalid
    pub fn resolve(fc: ChatConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let default = Self::default();

        let endpoint = env("EDURISE_CHAT_ENDPOINT")
            .or(fc.chat.endpoint)
            .unwrap_or(default.chat.endpoint);
        let health_endpoint = env("EDURISE_CHAT_HEALTH_ENDPOINT")
            .or(fc.chat.health_endpoint)
            .unwrap_or_else(|| health_endpoint_for(&endpoint));
        let chat_timeout = env("EDURISE_CHAT_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .or(fc.chat.timeout_secs)
            .map_or(default.chat.timeout, Duration::from_secs);

        let chat = ChatConfig {
            endpoint,
            health_endpoint,
            timeout: chat_timeout,
        };

        // Voice (env > toml > default); a shared `lang` fills both directions
        let speech = {
            let toml_speech = fc.speech;
            let env_lang = env("EDURISE_SPEECH_LANG");

            SpeechConfig {
                enabled: env("EDURISE_SPEECH_ENABLED")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .or(toml_speech.enabled)
                    .unwrap_or(default.speech.enabled),
                input_lang: env_lang
                    .clone()
                    .or(toml_speech.input_lang)
                    .or_else(|| toml_speech.lang.clone())
                    .unwrap_or(default.speech.input_lang),
                output_lang: env_lang
                    .or(toml_speech.output_lang)
                    .or(toml_speech.lang)
                    .unwrap_or(default.speech.output_lang),
                preferred_voice: env("EDURISE_PREFERRED_VOICE")
                    .or(toml_speech.preferred_voice)
                    .unwrap_or(default.speech.preferred_voice),
                rate: toml_speech.rate.unwrap_or(default.speech.rate),
            }
        };

        let widget = {
            let toml_widget = fc.widget;
            WidgetConfig {
                placeholder: toml_widget
                    .placeholder
                    .unwrap_or(default.widget.placeholder),
                listening_placeholder: toml_widget
                    .listening_placeholder
                    .unwrap_or(default.widget.listening_placeholder),
                failure_message: toml_widget
                    .failure_message
                    .unwrap_or(default.widget.failure_message),
                error_prefix: toml_widget
                    .error_prefix
                    .unwrap_or(default.widget.error_prefix),
                max_queued: toml_widget.max_queued.unwrap_or(default.widget.max_queued),
            }
        };

        let relay = RelayConfig {
            port: env("EDURISE_RELAY_PORT")
                .or_else(|| env("PORT"))
                .and_then(|p| p.parse().ok())
                .or(fc.relay.port)
                .unwrap_or(default.relay.port),
            upstream_url: env("HF_SPACE_URL")
                .or(fc.relay.upstream_url)
                .unwrap_or(default.relay.upstream_url),
            timeout: fc
                .relay
                .timeout_secs
                .map_or(default.relay.timeout, Duration::from_secs),
            static_dir: env("EDURISE_STATIC_DIR")
                .or(fc.relay.static_dir)
                .map(PathBuf::from),
        };

        let config = Self {
            chat,
            speech,
            widget,
            relay,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the crate relies on
    ///
    /// # Errors
    ///
    /// Returns error describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("chat endpoint", &self.chat.endpoint),
            ("health endpoint", &self.chat.health_endpoint),
            ("relay upstream", &self.relay.upstream_url),
        ] {
            reqwest::Url::parse(url)
                .map_err(|e| Error::Config(format!("invalid {name} {url:?}: {e}")))?;
        }

        if self.chat.timeout.is_zero() || self.relay.timeout.is_zero() {
            return Err(Error::Config("timeouts must be positive".to_string()));
        }

        if !(0.1..=10.0).contains(&self.speech.rate) {
            return Err(Error::Config(format!(
                "speech rate {} out of range 0.1..=10",
                self.speech.rate
            )));
        }

        Ok(())
    }
}

/// Health probe URL next to an answering endpoint
fn health_endpoint_for(endpoint: &str) -> String {
    format!("{}/health", endpoint.trim_end_matches('/'))
}
