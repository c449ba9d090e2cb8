//! Shared domain records for the accueil call assistant.
//!
//! This crate holds the values that flow between the webhook layer, the
//! turn controller, and the speech renderer: the static knowledge base and
//! call script, the per-request call event, the per-turn decision, and the
//! speech/synthesis settings.
//!
//! Nothing here performs I/O. Every record is either immutable configuration
//! (built once at startup, shared read-only by all turns) or a value created
//! fresh for a single webhook invocation. No type carries state across turns.

pub mod call;
pub mod knowledge;
pub mod voice;

pub use call::{CallEvent, CallerMeta, TurnDecision};
pub use knowledge::{CallScript, KnowledgeBase, UrgencyLexicon};
pub use voice::{SpeechSettings, SpeechStrategy, SynthesisRequest, VoiceSettings};
