//! TOML configuration file loading
//!
//! Supports `~/.config/edurise/chat.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct ChatConfigFile {
    /// Answering endpoint configuration
    #[serde(default)]
    pub chat: ChatFileConfig,

    /// Voice input/output configuration
    #[serde(default)]
    pub speech: SpeechFileConfig,

    /// Widget texts and limits
    #[serde(default)]
    pub widget: WidgetFileConfig,

    /// Answering relay server configuration
    #[serde(default)]
    pub relay: RelayFileConfig,
}

/// Answering endpoint configuration
#[derive(Debug, Default, Deserialize)]
pub struct ChatFileConfig {
    /// URL the widget posts `{query}` to
    pub endpoint: Option<String>,

    /// Health probe URL
    pub health_endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Voice input/output configuration
#[derive(Debug, Default, Deserialize)]
pub struct SpeechFileConfig {
    /// Enable voice input/output
    pub enabled: Option<bool>,

    /// Locale used for both capture and synthesis unless overridden
    pub lang: Option<String>,

    /// Capture locale (e.g. "fr-FR")
    pub input_lang: Option<String>,

    /// Synthesis locale (e.g. "fr-FR")
    pub output_lang: Option<String>,

    /// Substring of the preferred voice name (e.g. "Google")
    pub preferred_voice: Option<String>,

    /// Speech rate multiplier
    pub rate: Option<f32>,
}

/// Widget texts and limits
#[derive(Debug, Default, Deserialize)]
pub struct WidgetFileConfig {
    pub placeholder: Option<String>,
    pub listening_placeholder: Option<String>,
    pub failure_message: Option<String>,
    pub error_prefix: Option<String>,

    /// Sends that may wait behind the in-flight request
    pub max_queued: Option<usize>,
}

/// Answering relay server configuration
#[derive(Debug, Default, Deserialize)]
pub struct RelayFileConfig {
    /// Port to listen on
    pub port: Option<u16>,

    /// Base URL of the remote RAG service
    pub upstream_url: Option<String>,

    /// Upstream request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Directory of static widget assets
    pub static_dir: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ChatConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ChatConfigFile {
    config_file_path().map_or_else(ChatConfigFile::default, |path| load_config_file_from(&path))
}

/// Load a TOML config file from an explicit path
///
/// Returns `ChatConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file_from(path: &Path) -> ChatConfigFile {
    if !path.exists() {
        return ChatConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ChatConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ChatConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/edurise/chat.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("edurise").join("chat.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config_file_from(Path::new("/nonexistent/edurise/chat.toml"));
        assert!(config.chat.endpoint.is_none());
        assert!(config.relay.port.is_none());
    }

    #[test]
    fn parses_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.toml");
        std::fs::write(
            &path,
            r#"
[chat]
endpoint = "https://edurise.example/api/chat"

[speech]
lang = "fr-FR"
preferred_voice = "Google"

[relay]
port = 9000
"#,
        )
        .unwrap();

        let config = load_config_file_from(&path);
        assert_eq!(
            config.chat.endpoint.as_deref(),
            Some("https://edurise.example/api/chat")
        );
        assert_eq!(config.speech.lang.as_deref(), Some("fr-FR"));
        assert_eq!(config.relay.port, Some(9000));
        assert!(config.widget.max_queued.is_none());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.toml");
        std::fs::write(&path, "[chat\nendpoint = ").unwrap();

        let config = load_config_file_from(&path);
        assert!(config.chat.endpoint.is_none());
    }
}
