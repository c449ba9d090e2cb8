//! Per-request call values.

use serde::{Deserialize, Serialize};

/// Provider-supplied context about the call. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerMeta {
    pub from: Option<String>,
    pub to: Option<String>,
    pub call_status: Option<String>,
    /// Transcription confidence as reported by the provider.
    pub confidence: Option<String>,
}

/// One inbound webhook invocation.
///
/// `utterance` is `None` on the turn-start webhook and `Some` (possibly
/// blank) on the turn-continue webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEvent {
    pub call_sid: String,
    pub utterance: Option<String>,
    pub caller: CallerMeta,
}

impl CallEvent {
    /// Event for the first webhook of a call.
    pub fn start(call_sid: impl Into<String>) -> Self {
        Self {
            call_sid: call_sid.into(),
            utterance: None,
            caller: CallerMeta::default(),
        }
    }

    /// Event carrying a transcribed utterance.
    pub fn heard(call_sid: impl Into<String>, utterance: impl Into<String>) -> Self {
        Self {
            call_sid: call_sid.into(),
            utterance: Some(utterance.into()),
            caller: CallerMeta::default(),
        }
    }

    pub fn with_caller(mut self, caller: CallerMeta) -> Self {
        self.caller = caller;
        self
    }
}

/// Outcome of one orchestration pass, consumed by the markup renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnDecision {
    /// Greet the caller and listen.
    Greet,
    /// Ask the caller to repeat and listen again.
    Reprompt,
    /// Speak the reply, optionally escalate, then close.
    Respond { reply_text: String, escalate: bool },
    /// The request could not be interpreted; apologise and end.
    Fail { reason: String },
}

impl TurnDecision {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Greet => "greet",
            Self::Reprompt => "reprompt",
            Self::Respond { .. } => "respond",
            Self::Fail { .. } => "fail",
        }
    }
}
