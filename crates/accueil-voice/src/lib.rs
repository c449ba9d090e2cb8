//! Voice output for the accueil call assistant.
//!
//! Three pieces live here:
//!
//! - [`twiml`]: the call-control document builder. Every webhook answer is a
//!   [`VoiceResponse`] rendered to provider XML.
//! - [`gateway`]: the client for the external streaming synthesis service.
//!   It backs the `/tts` resource the telephony provider fetches audio from.
//! - [`renderer`]: the [`SpeechRenderer`], which turns reply text into either
//!   a `Play` of the synthesis resource or a provider-voiced `Say`, depending
//!   on the deployment's [`SpeechStrategy`](accueil_types::SpeechStrategy).
//!
//! The call-control document never waits on synthesis: it only references the
//! resource URL, and the provider fetches the audio on its own schedule.

pub mod config;
pub mod error;
pub mod gateway;
pub mod renderer;
pub mod twiml;

pub use config::{SynthesisConfig, DEFAULT_SYNTHESIS_BASE_URL, DEFAULT_VOICE_ID};
pub use error::VoiceError;
pub use gateway::{SynthesisGateway, SynthesizedAudio, AUDIO_CONTENT_TYPE, MAX_SYNTHESIS_TEXT_BYTES};
pub use renderer::{RenderedVia, SpeechRenderer, SYNTHESIS_RESOURCE_PATH};
pub use twiml::{Gather, Say, Verb, VoiceResponse};
