//! Telephony webhooks.
//!
//! Both handlers always answer `200` with a call-control document. Problems
//! reading the payload become the technical apology, never an error status,
//! so the provider never drops the caller.

use crate::AppState;
use accueil_agent::TurnReport;
use accueil_types::{CallEvent, CallerMeta, TurnDecision};
use accueil_voice::RenderedVia;
use axum::{
    extract::{rejection::FormRejection, Extension, Form},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

/// Content type of call-control documents.
pub const TWIML_CONTENT_TYPE: &str = "text/xml";

/// Fields the provider posts on every voice webhook. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebhookForm {
    #[serde(default)]
    pub call_sid: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub call_status: Option<String>,
    /// Transcribed utterance, present on the turn-continue webhook only.
    pub speech_result: Option<String>,
    pub confidence: Option<String>,
}

impl WebhookForm {
    fn caller(&self) -> CallerMeta {
        CallerMeta {
            from: self.from.clone(),
            to: self.to.clone(),
            call_status: self.call_status.clone(),
            confidence: self.confidence.clone(),
        }
    }

    /// Event for the turn-start webhook. Any transcription is ignored.
    pub fn into_start_event(self) -> CallEvent {
        let caller = self.caller();
        CallEvent::start(self.call_sid).with_caller(caller)
    }

    /// Event for the turn-continue webhook. A missing `SpeechResult` counts
    /// as an empty utterance.
    pub fn into_continue_event(self) -> CallEvent {
        let caller = self.caller();
        CallEvent::heard(self.call_sid, self.speech_result.unwrap_or_default()).with_caller(caller)
    }
}

/// Handler for `POST /voice`.
///
/// The greeting needs nothing from the payload, so an unreadable form still
/// greets.
pub async fn turn_start_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<WebhookForm>, FormRejection>,
) -> Response {
    let event = match form {
        Ok(Form(form)) => form.into_start_event(),
        Err(rejection) => {
            tracing::warn!("unreadable turn-start payload, greeting anyway: {}", rejection);
            CallEvent::default()
        }
    };

    let base = request_base(&headers);
    let report = state.controller.handle(&event, base.as_deref()).await;
    respond(report)
}

/// Handler for `POST /ai`.
pub async fn turn_continue_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<WebhookForm>, FormRejection>,
) -> Response {
    let report = match form {
        Ok(Form(form)) => {
            let event = form.into_continue_event();
            let base = request_base(&headers);
            state.controller.handle(&event, base.as_deref()).await
        }
        Err(rejection) => {
            tracing::warn!("unreadable turn-continue payload: {}", rejection);
            state
                .controller
                .fail(String::new(), format!("unreadable webhook payload: {}", rejection))
        }
    };
    respond(report)
}

/// Base URL the provider reached us on, from `X-Forwarded-Proto` and
/// `X-Forwarded-Host` (or `Host`). Scheme defaults to `http`.
pub fn request_base(headers: &HeaderMap) -> Option<String> {
    let first = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let host = first("x-forwarded-host").or_else(|| first(header::HOST.as_str()))?;
    let scheme = first("x-forwarded-proto").unwrap_or("http");
    Some(format!("{}://{}", scheme, host))
}

fn respond(report: TurnReport) -> Response {
    let escalate = matches!(
        report.decision,
        TurnDecision::Respond { escalate: true, .. }
    );
    tracing::info!(
        call_sid = %report.call_sid,
        trail = ?report.trail,
        decision = report.decision.label(),
        escalate,
        rendered_via = report.rendered_via.map(RenderedVia::as_str),
        latency_ms = report.model_latency_ms,
        "call turn handled"
    );
    if let Some(failure) = &report.model_failure {
        tracing::warn!(
            call_sid = %report.call_sid,
            kind = failure.kind,
            "turn answered with fallback reply: {}",
            failure.message
        );
    }

    (
        [(header::CONTENT_TYPE, TWIML_CONTENT_TYPE)],
        report.to_xml(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn base_from_host_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("accueil.example.fr"));
        assert_eq!(
            request_base(&headers).as_deref(),
            Some("http://accueil.example.fr")
        );
    }

    #[test]
    fn forwarded_headers_win() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("127.0.0.1:3000"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("abcd.ngrok.app"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        assert_eq!(
            request_base(&headers).as_deref(),
            Some("https://abcd.ngrok.app")
        );
    }

    #[test]
    fn no_host_no_base() {
        assert_eq!(request_base(&HeaderMap::new()), None);
    }

    #[test]
    fn missing_speech_result_is_empty_utterance() {
        let form = WebhookForm {
            call_sid: "CA1".to_string(),
            ..WebhookForm::default()
        };
        let event = form.into_continue_event();
        assert_eq!(event.utterance.as_deref(), Some(""));
    }

    #[test]
    fn start_event_ignores_transcription() {
        let form = WebhookForm {
            call_sid: "CA1".to_string(),
            from: Some("+33600000000".to_string()),
            speech_result: Some("bonjour".to_string()),
            ..WebhookForm::default()
        };
        let event = form.into_start_event();
        assert!(event.utterance.is_none());
        assert_eq!(event.caller.from.as_deref(), Some("+33600000000"));
    }
}
