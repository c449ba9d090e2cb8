use accueil_agent::{
    CallTurnController, LanguageModel, ModelError, ResponseGenerator,
};
use accueil_server::{app, config::Config, AppState};
use accueil_types::{CallScript, KnowledgeBase, SpeechSettings, SpeechStrategy, UrgencyLexicon};
use accueil_voice::{SpeechRenderer, SynthesisConfig, SynthesisGateway};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

const REPLY: &str = "Un membre de l'équipe vous rappelle dans l'heure.";

/// Records what it was asked and answers with a fixed line, or fails.
struct RecordingModel {
    answer: Option<&'static str>,
    calls: Mutex<Vec<(String, String)>>,
}

impl RecordingModel {
    fn answering(answer: &'static str) -> Arc<Self> {
        Arc::new(Self {
            answer: Some(answer),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            answer: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for RecordingModel {
    async fn complete(&self, system_prompt: &str, utterance: &str) -> Result<String, ModelError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), utterance.to_string()));
        match self.answer {
            Some(answer) => Ok(answer.to_string()),
            None => Err(ModelError::Status {
                status: 503,
                body: "overloaded".to_string(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

fn setup_app(model: Arc<RecordingModel>, strategy: SpeechStrategy) -> axum::Router {
    let script = CallScript::default();
    let responder = ResponseGenerator::new(model, Duration::from_secs(8), script.fallback_reply.clone());
    let renderer = SpeechRenderer::new(
        SpeechSettings {
            strategy,
            ..SpeechSettings::default()
        },
        None,
    );
    let controller = CallTurnController::new(
        &KnowledgeBase::default(),
        &UrgencyLexicon::default(),
        script,
        responder,
        renderer,
    );
    let gateway = SynthesisGateway::new(SynthesisConfig::default()).unwrap();
    app(AppState::new(controller, gateway))
}

fn webhook(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::HOST, "accueil.example.fr")
        .header("x-forwarded-proto", "https")
        .body(Body::from(form.to_string()))
        .unwrap()
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, String, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_turn_start_greets_and_listens() {
    let model = RecordingModel::answering(REPLY);
    let app = setup_app(model.clone(), SpeechStrategy::Gateway);

    let (status, content_type, xml) = send(
        app,
        webhook("/voice", "CallSid=CA100&From=%2B33600000000&CallStatus=ringing"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/xml");
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains(
        r#"<Gather input="speech" language="fr-FR" speechTimeout="auto" action="/ai" method="POST">"#
    ));
    assert!(xml.contains("Bonjour, vous êtes bien au standard"));
    assert!(xml.contains(r#"<Redirect method="POST">/voice</Redirect>"#));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_urgent_utterance_escalates() {
    let model = RecordingModel::answering(REPLY);
    let app = setup_app(model.clone(), SpeechStrategy::Provider);

    let (status, _, xml) = send(
        app,
        webhook(
            "/ai",
            "CallSid=CA101&SpeechResult=J%27ai+une+douleur+urgente&Confidence=0.92",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let script = CallScript::default();
    assert!(xml.contains("Un membre de l&apos;équipe vous rappelle dans l&apos;heure."));
    assert!(xml.contains(&script.escalation_notice));
    assert!(xml.contains(r#"<Pause length="1"/>"#));
    assert!(xml.contains(&script.closing));
    assert!(!xml.contains("<Gather"));
    assert!(!xml.contains("<Redirect"));

    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, "J'ai une douleur urgente");
    assert!(calls[0].0.contains("Cabinet Santé Active"));
}

#[tokio::test]
async fn test_ordinary_utterance_plays_gateway_audio() {
    let model = RecordingModel::answering(REPLY);
    let app = setup_app(model, SpeechStrategy::Gateway);

    let (_, _, xml) = send(
        app,
        webhook("/ai", "CallSid=CA102&SpeechResult=Quels+sont+vos+horaires"),
    )
    .await;

    assert!(xml.contains("<Play>https://accueil.example.fr/tts?text="));
    assert!(!xml.contains(&CallScript::default().escalation_notice));
    assert!(xml.contains(&CallScript::default().closing));
}

#[tokio::test]
async fn test_empty_speech_result_reprompts() {
    for form in ["CallSid=CA103&SpeechResult=", "CallSid=CA103&SpeechResult=+++", "CallSid=CA103"] {
        let model = RecordingModel::answering(REPLY);
        let app = setup_app(model.clone(), SpeechStrategy::Gateway);

        let (status, _, xml) = send(app, webhook("/ai", form)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(xml.contains("Je n&apos;ai pas bien saisi"), "{}", xml);
        assert!(xml.contains(r#"<Redirect method="POST">/voice</Redirect>"#));
        assert!(model.calls().is_empty());
    }
}

#[tokio::test]
async fn test_model_failure_speaks_fallback() {
    let model = RecordingModel::failing();
    let app = setup_app(model, SpeechStrategy::Provider);

    let (status, _, xml) = send(
        app,
        webhook("/ai", "CallSid=CA104&SpeechResult=Combien+co%C3%BBte+une+s%C3%A9ance"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(xml.contains("Je transmets votre demande à un collègue"));
    assert!(xml.contains(&CallScript::default().closing));
}

#[tokio::test]
async fn test_unreadable_payload_apologises() {
    let model = RecordingModel::answering(REPLY);
    let app = setup_app(model.clone(), SpeechStrategy::Gateway);

    let request = Request::builder()
        .method("POST")
        .uri("/ai")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"SpeechResult":"bonjour"}"#))
        .unwrap();
    let (status, content_type, xml) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "text/xml");
    assert!(xml.contains("Désolé, un souci technique est survenu."));
    assert!(!xml.contains("<Gather"));
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_unconfigured_synthesis_speaks_reply_with_provider_voice() {
    let state = AppState::from_config(&Config::default()).unwrap();

    let (status, _, xml) = send(
        app(state),
        webhook("/ai", "CallSid=CA105&SpeechResult=Quels+sont+vos+horaires"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!xml.contains("<Play>"), "{}", xml);
    assert!(xml.contains(
        r#"<Say language="fr-FR" voice="alice">Je transmets votre demande à un collègue et nous vous recontactons très vite.</Say>"#
    ));
}

#[tokio::test]
async fn test_oversized_reply_is_spoken_not_played() {
    let long: &'static str = Box::leak("é".repeat(2100).into_boxed_str());
    let model = RecordingModel::answering(long);
    let app = setup_app(model, SpeechStrategy::Gateway);

    let (_, _, xml) = send(
        app,
        webhook("/ai", "CallSid=CA106&SpeechResult=Racontez-moi+tout"),
    )
    .await;

    assert!(!xml.contains("<Play>"), "{}", xml);
    assert!(xml.contains(long));
    assert!(xml.contains(&CallScript::default().closing));
}
