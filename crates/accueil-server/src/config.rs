//! Server configuration loading from file and environment variables.

use accueil_agent::LlmConfig;
use accueil_types::{CallScript, KnowledgeBase, SpeechSettings, UrgencyLexicon};
use accueil_voice::SynthesisConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Language-model client settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Streaming synthesis service settings.
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// How replies are voiced and in which locale.
    #[serde(default)]
    pub speech: SpeechSettings,

    /// Fixed lines spoken around the generated reply.
    #[serde(default)]
    pub call: CallScript,

    /// Business facts the assistant may state.
    #[serde(default)]
    pub knowledge_base: KnowledgeBase,

    /// Keywords that trigger escalation.
    #[serde(default)]
    pub urgency: UrgencyLexicon,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally reachable base URL (e.g. "https://accueil.example.fr").
    /// When unset, the request's `Host` header is used to address `/tts`.
    #[serde(default)]
    pub public_url: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "accueil_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides (see [`apply_overrides`]).
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Applies variable overrides read through `lookup`. Blank values are ignored.
///
/// - `PORT` overrides `server.port`
/// - `ACCUEIL_HOST` overrides `server.host`
/// - `ACCUEIL_PUBLIC_URL` overrides `server.public_url`
/// - `ACCUEIL_LOG_LEVEL` overrides `logging.level`
/// - `ACCUEIL_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `OPENAI_API_KEY` overrides `llm.api_key`
/// - `OPENAI_MODEL` overrides `llm.model`
/// - `ELEVENLABS_API_KEY` overrides `synthesis.api_key`
/// - `ELEVENLABS_VOICE_ID` overrides `synthesis.voice_id`
/// - `ACCUEIL_SPEECH_STRATEGY` overrides `speech.strategy` ("gateway" or "provider")
/// - `ACCUEIL_TRANSFER_NUMBER` overrides `call.transfer_number`
pub fn apply_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(port) = var("PORT") {
        match port.trim().parse() {
            Ok(parsed) => config.server.port = parsed,
            Err(_) => tracing::warn!(value = %port, "ignoring invalid PORT"),
        }
    }
    if let Some(host) = var("ACCUEIL_HOST") {
        match host.trim().parse() {
            Ok(parsed) => config.server.host = parsed,
            Err(_) => tracing::warn!(value = %host, "ignoring invalid ACCUEIL_HOST"),
        }
    }
    if let Some(url) = var("ACCUEIL_PUBLIC_URL") {
        config.server.public_url = Some(url);
    }
    if let Some(level) = var("ACCUEIL_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("ACCUEIL_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(key) = var("OPENAI_API_KEY") {
        config.llm.api_key = key;
    }
    if let Some(model) = var("OPENAI_MODEL") {
        config.llm.model = model;
    }
    if let Some(key) = var("ELEVENLABS_API_KEY") {
        config.synthesis.api_key = key;
    }
    if let Some(voice) = var("ELEVENLABS_VOICE_ID") {
        config.synthesis.voice_id = voice;
    }
    if let Some(strategy) = var("ACCUEIL_SPEECH_STRATEGY") {
        match strategy.parse() {
            Ok(parsed) => config.speech.strategy = parsed,
            Err(e) => tracing::warn!("ignoring ACCUEIL_SPEECH_STRATEGY: {}", e),
        }
    }
    if let Some(number) = var("ACCUEIL_TRANSFER_NUMBER") {
        config.call.transfer_number = Some(number);
    }
}
