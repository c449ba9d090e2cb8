use accueil_types::VoiceSettings;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_SYNTHESIS_BASE_URL: &str = "https://api.elevenlabs.io";
pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

fn default_base_url() -> String {
    DEFAULT_SYNTHESIS_BASE_URL.to_string()
}

fn default_voice_id() -> String {
    DEFAULT_VOICE_ID.to_string()
}

fn default_optimize_streaming_latency() -> u8 {
    3
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Settings for the external streaming synthesis service.
///
/// An empty `api_key` means the gateway is not configured; synthesis requests
/// then fail with [`VoiceError::MissingCredential`](crate::VoiceError).
#[derive(Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Voice identity. Blank falls back to [`DEFAULT_VOICE_ID`].
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default)]
    pub voice_settings: VoiceSettings,
    #[serde(default = "default_optimize_streaming_latency")]
    pub optimize_streaming_latency: u8,
    /// Timeout for establishing the upstream stream, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            voice_id: default_voice_id(),
            voice_settings: VoiceSettings::default(),
            optimize_streaming_latency: default_optimize_streaming_latency(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl fmt::Debug for SynthesisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("voice_id", &self.voice_id)
            .field("voice_settings", &self.voice_settings)
            .field("optimize_streaming_latency", &self.optimize_streaming_latency)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl SynthesisConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_voice_id(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// The configured voice, or the default one when blank.
    pub fn effective_voice_id(&self) -> &str {
        let voice = self.voice_id.trim();
        if voice.is_empty() {
            DEFAULT_VOICE_ID
        } else {
            voice
        }
    }
}
