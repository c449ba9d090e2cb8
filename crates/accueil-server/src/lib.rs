//! Accueil server library logic.
//!
//! Routes:
//!
//! | Method | Path      | Purpose                                         |
//! |--------|-----------|-------------------------------------------------|
//! | GET    | `/`       | plain liveness line                             |
//! | GET    | `/health` | structured status                               |
//! | POST   | `/voice`  | turn-start webhook, greets and listens          |
//! | POST   | `/ai`     | turn-continue webhook, answers the utterance    |
//! | GET    | `/tts`    | synthesis resource, streams `audio/mpeg`        |

pub mod api;
pub mod api_call;
pub mod api_tts;
pub mod config;

use accueil_agent::{
    CallTurnController, ModelError, OpenAiChatClient, ResponseGenerator, TURN_CONTINUE_PATH,
    TURN_START_PATH,
};
use accueil_types::SpeechStrategy;
use accueil_voice::{SpeechRenderer, SynthesisGateway, VoiceError, SYNTHESIS_RESOURCE_PATH};
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use config::Config;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Liveness line served on `/`.
pub const LIVENESS_TEXT: &str = "Assistant vocal en ligne ✅";

/// Application state shared across all request handlers.
///
/// Everything here is read-only after startup; concurrent calls share no
/// mutable state.
#[derive(Clone)]
pub struct AppState {
    /// Per-turn orchestration.
    pub controller: Arc<CallTurnController>,
    /// Streaming synthesis client backing `/tts`.
    pub gateway: Arc<SynthesisGateway>,
    pub started_at: DateTime<Utc>,
}

/// Errors that prevent the state from being built.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("language-model client: {0}")]
    Model(#[from] ModelError),

    #[error("synthesis gateway: {0}")]
    Synthesis(#[from] VoiceError),
}

impl AppState {
    pub fn new(controller: CallTurnController, gateway: SynthesisGateway) -> Self {
        Self {
            controller: Arc::new(controller),
            gateway: Arc::new(gateway),
            started_at: Utc::now(),
        }
    }

    /// Wires every component from the loaded configuration.
    ///
    /// The gateway strategy needs a synthesis credential; without one the
    /// renderer is built with the provider strategy.
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let model = OpenAiChatClient::new(config.llm.clone())?;
        let responder = ResponseGenerator::new(
            Arc::new(model),
            config.llm.timeout(),
            config.call.fallback_reply.clone(),
        );
        let mut speech = config.speech.clone();
        if speech.strategy == SpeechStrategy::Gateway && !config.synthesis.is_configured() {
            tracing::warn!(
                "synthesis is not configured, replies will use the provider voice instead of the gateway"
            );
            speech.strategy = SpeechStrategy::Provider;
        }
        let renderer = SpeechRenderer::new(speech, config.server.public_url.clone());
        let controller = CallTurnController::new(
            &config.knowledge_base,
            &config.urgency,
            config.call.clone(),
            responder,
            renderer,
        );
        let gateway = SynthesisGateway::new(config.synthesis.clone())?;
        Ok(Self::new(controller, gateway))
    }

    pub fn speech_strategy(&self) -> SpeechStrategy {
        self.controller.renderer().strategy()
    }

    pub fn llm_configured(&self) -> bool {
        self.controller.responder().model().is_configured()
    }
}

async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

/// Health check handler. No side effects, never contacts upstream services.
async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0);
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
        "speech_strategy": state.speech_strategy().as_str(),
        "llm_configured": state.llm_configured(),
        "synthesis_configured": state.gateway.is_configured(),
        "started_at": state.started_at.to_rfc3339(),
        "uptime_secs": uptime_secs,
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health))
        .route(TURN_START_PATH, post(api_call::turn_start_handler))
        .route(TURN_CONTINUE_PATH, post(api_call::turn_continue_handler))
        .route(SYNTHESIS_RESOURCE_PATH, get(api_tts::synthesis_handler))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
