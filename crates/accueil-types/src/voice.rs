//! Speech rendering and synthesis settings.
//!
//! `SpeechSettings` selects how replies reach the caller. `VoiceSettings`
//! and `SynthesisRequest` describe what is sent to the neural synthesis
//! gateway when the gateway strategy is in use.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How generated replies are voiced.
///
/// This is a deployment-time choice; every call on a running process uses
/// the same strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechStrategy {
    /// Play audio fetched from the synthesis resource endpoint.
    #[default]
    Gateway,
    /// Let the telephony provider speak the text with its own voice.
    Provider,
}

impl SpeechStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gateway => "gateway",
            Self::Provider => "provider",
        }
    }
}

impl fmt::Display for SpeechStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a speech strategy string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSpeechStrategyError(pub String);

impl fmt::Display for ParseSpeechStrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown speech strategy: {}", self.0)
    }
}

impl std::error::Error for ParseSpeechStrategyError {}

impl FromStr for SpeechStrategy {
    type Err = ParseSpeechStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gateway" => Ok(Self::Gateway),
            "provider" => Ok(Self::Provider),
            other => Err(ParseSpeechStrategyError(other.to_string())),
        }
    }
}

/// Locale and provider voice used for every spoken line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub strategy: SpeechStrategy,
    /// BCP-47 locale for speech recognition and provider speech.
    pub language: String,
    /// Provider voice name for `Say` lines.
    pub voice: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            strategy: SpeechStrategy::default(),
            language: "fr-FR".to_string(),
            voice: "alice".to_string(),
        }
    }
}

/// Fixed voice-quality parameters sent with every synthesis request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.2,
            use_speaker_boost: true,
        }
    }
}

/// Text to synthesize with a given voice identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    pub settings: VoiceSettings,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            settings: VoiceSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: VoiceSettings) -> Self {
        self.settings = settings;
        self
    }
}
