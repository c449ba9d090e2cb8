//! Per-turn state machine.
//!
//! ```text
//!   event ──► Init ──(greet + listen)──► Init          (provider redirects on silence)
//!         ├─► Empty ─(re-prompt)───────► Init
//!         └─► Heard ─(classify, generate)─► Responding ─(speak, close)─► End
//! ```
//!
//! There is no error state. A failed completion still reaches `Responding`
//! with the fallback reply; an unreadable webhook renders the technical
//! apology and ends the call.

use crate::prompt::build_system_prompt;
use crate::responder::{ModelFailure, ResponseGenerator};
use crate::urgency::UrgencyClassifier;
use accueil_types::{CallEvent, CallScript, KnowledgeBase, TurnDecision, UrgencyLexicon};
use accueil_voice::{Gather, RenderedVia, SpeechRenderer, VoiceResponse};

/// Webhook the provider calls when a call starts, and on silence redirects.
pub const TURN_START_PATH: &str = "/voice";

/// Webhook the listening instruction posts the transcribed utterance to.
pub const TURN_CONTINUE_PATH: &str = "/ai";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallState {
    /// No utterance yet: greet and listen.
    Init,
    /// A non-blank utterance was captured.
    Heard { utterance: String },
    /// The turn-continue webhook arrived with nothing usable.
    Empty,
    /// A reply is ready to be spoken.
    Responding { reply_text: String, escalate: bool },
    /// Terminal: the document holds no further listening instruction.
    End,
}

impl CallState {
    /// Entry state for a webhook event.
    pub fn from_event(event: &CallEvent) -> Self {
        match event.utterance.as_deref().map(str::trim) {
            None => Self::Init,
            Some("") => Self::Empty,
            Some(utterance) => Self::Heard {
                utterance: utterance.to_string(),
            },
        }
    }

    /// State the call is in once `decision`'s document has been played.
    pub fn after(decision: &TurnDecision) -> Self {
        match decision {
            TurnDecision::Greet | TurnDecision::Reprompt => Self::Init,
            TurnDecision::Respond { .. } | TurnDecision::Fail { .. } => Self::End,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Heard { .. } => "heard",
            Self::Empty => "empty",
            Self::Responding { .. } => "responding",
            Self::End => "end",
        }
    }
}

/// Everything one orchestration pass produced.
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub call_sid: String,
    /// States visited, entry first, including the state after this turn.
    pub trail: Vec<&'static str>,
    pub decision: TurnDecision,
    pub rendered_via: Option<RenderedVia>,
    pub model_failure: Option<ModelFailure>,
    /// Time spent waiting on the language model; `None` when it was not called.
    pub model_latency_ms: Option<u64>,
    pub response: VoiceResponse,
}

impl TurnReport {
    pub fn to_xml(&self) -> String {
        self.response.to_xml()
    }
}

/// Drives one webhook invocation from event to call-control document.
#[derive(Debug, Clone)]
pub struct CallTurnController {
    system_prompt: String,
    classifier: UrgencyClassifier,
    responder: ResponseGenerator,
    renderer: SpeechRenderer,
    script: CallScript,
}

impl CallTurnController {
    pub fn new(
        kb: &KnowledgeBase,
        lexicon: &UrgencyLexicon,
        script: CallScript,
        responder: ResponseGenerator,
        renderer: SpeechRenderer,
    ) -> Self {
        Self {
            system_prompt: build_system_prompt(kb),
            classifier: UrgencyClassifier::new(lexicon),
            responder,
            renderer,
            script,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn renderer(&self) -> &SpeechRenderer {
        &self.renderer
    }

    pub fn responder(&self) -> &ResponseGenerator {
        &self.responder
    }

    /// Runs one turn. `request_base` is the public base URL the webhook was
    /// reached on, used to address the synthesis resource.
    pub async fn handle(&self, event: &CallEvent, request_base: Option<&str>) -> TurnReport {
        let mut state = CallState::from_event(event);
        let mut trail = vec![state.name()];
        let mut model_failure = None;
        let mut model_latency_ms = None;

        let decision = loop {
            state = match state {
                CallState::Init => break TurnDecision::Greet,
                CallState::Empty => break TurnDecision::Reprompt,
                CallState::Heard { utterance } => {
                    let escalate = self.classifier.classify(&utterance);
                    let reply = self.responder.generate(&self.system_prompt, &utterance).await;
                    model_failure = reply.failure;
                    model_latency_ms = Some(reply.latency_ms);
                    CallState::Responding {
                        reply_text: reply.text,
                        escalate,
                    }
                }
                CallState::Responding {
                    reply_text,
                    escalate,
                } => {
                    break TurnDecision::Respond {
                        reply_text,
                        escalate,
                    }
                }
                // Never an entry state.
                CallState::End => {
                    break TurnDecision::Fail {
                        reason: "turn started in terminal state".to_string(),
                    }
                }
            };
            trail.push(state.name());
        };

        trail.push(CallState::after(&decision).name());
        let (response, rendered_via) = self.render(&decision, request_base);

        TurnReport {
            call_sid: event.call_sid.clone(),
            trail,
            decision,
            rendered_via,
            model_failure,
            model_latency_ms,
            response,
        }
    }

    /// Report for a webhook whose payload could not be read.
    pub fn fail(&self, call_sid: impl Into<String>, reason: impl Into<String>) -> TurnReport {
        let decision = TurnDecision::Fail {
            reason: reason.into(),
        };
        let (response, rendered_via) = self.render(&decision, None);
        TurnReport {
            call_sid: call_sid.into(),
            trail: vec![CallState::after(&decision).name()],
            decision,
            rendered_via,
            model_failure: None,
            model_latency_ms: None,
            response,
        }
    }

    /// Builds the call-control document for a decision.
    pub fn render(
        &self,
        decision: &TurnDecision,
        request_base: Option<&str>,
    ) -> (VoiceResponse, Option<RenderedVia>) {
        let settings = self.renderer.settings();
        match decision {
            TurnDecision::Greet => {
                let gather = Gather::speech(TURN_CONTINUE_PATH)
                    .language(settings.language.clone())
                    .speech_timeout(self.script.speech_timeout.clone())
                    .prompt(self.renderer.say(self.script.greeting.clone()));
                (
                    VoiceResponse::new().gather(gather).redirect(TURN_START_PATH),
                    None,
                )
            }
            TurnDecision::Reprompt => (
                VoiceResponse::new()
                    .say(self.renderer.say(self.script.reprompt.clone()))
                    .redirect(TURN_START_PATH),
                None,
            ),
            TurnDecision::Respond {
                reply_text,
                escalate,
            } => {
                let (reply, via) = self.renderer.reply(reply_text, request_base);
                let mut response = VoiceResponse::new().verb(reply);
                if *escalate {
                    response = response
                        .pause(self.script.pause_seconds)
                        .say(self.renderer.say(self.script.escalation_notice.clone()));
                    if let Some(number) = self
                        .script
                        .transfer_number
                        .as_deref()
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                    {
                        response = response.dial(number);
                    }
                }
                response = response
                    .pause(self.script.pause_seconds)
                    .say(self.renderer.say(self.script.closing.clone()));
                (response, Some(via))
            }
            TurnDecision::Fail { .. } => (
                VoiceResponse::new().say(self.renderer.say(self.script.technical_apology.clone())),
                None,
            ),
        }
    }
}
