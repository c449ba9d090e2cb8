//! Call-turn orchestration for the accueil call assistant.
//!
//! Each webhook invocation is handled independently by the
//! [`CallTurnController`]: it maps the [`CallEvent`](accueil_types::CallEvent)
//! to a [`CallState`], runs the urgency classifier and the response generator
//! when the caller said something, and renders the resulting
//! [`TurnDecision`](accueil_types::TurnDecision) as a call-control document.
//!
//! Within one turn the order is fixed: classify, generate, render, build the
//! document. Nothing is carried from one turn to the next.
//!
//! Every path ends in a well-formed document. Language-model failures are
//! absorbed into the fallback reply and surfaced as a [`ModelFailure`] in the
//! [`TurnReport`] for the caller of the controller to log.

pub mod controller;
pub mod llm;
pub mod prompt;
pub mod responder;
pub mod urgency;

pub use controller::{CallState, CallTurnController, TurnReport, TURN_CONTINUE_PATH, TURN_START_PATH};
pub use llm::{LanguageModel, LlmConfig, ModelError, OpenAiChatClient};
pub use prompt::build_system_prompt;
pub use responder::{ModelFailure, Reply, ResponseGenerator};
pub use urgency::UrgencyClassifier;
