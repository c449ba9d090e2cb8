//! Synthesis resource fetched by the telephony provider.

use crate::api::ApiError;
use crate::AppState;
use accueil_voice::AUDIO_CONTENT_TYPE;
use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Extension, Query},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct SynthesisQuery {
    #[serde(default)]
    pub text: String,
}

/// Handler for `GET /tts?text=...`.
///
/// Streams the upstream audio unmodified. Errors: empty or oversized text is
/// `400`, a missing credential `500`, an upstream failure `502`.
pub async fn synthesis_handler(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<SynthesisQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| {
        tracing::warn!("unreadable synthesis query: {}", e);
        ApiError::BadRequest(e.body_text())
    })?;

    let audio = state.gateway.synthesize(&query.text).await.map_err(|e| {
        if e.is_upstream() {
            tracing::error!(text_len = query.text.len(), "synthesis upstream failed: {}", e);
        } else {
            tracing::warn!(text_len = query.text.len(), "synthesis rejected: {}", e);
        }
        ApiError::from(e)
    })?;

    tracing::debug!(
        text_len = query.text.len(),
        content_length = audio.content_length,
        "streaming synthesized audio"
    );

    Ok((
        [
            (header::CONTENT_TYPE, AUDIO_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-store"),
        ],
        Body::from_stream(audio.into_stream()),
    )
        .into_response())
}
