use accueil_agent::{LanguageModel, LlmConfig, ModelError, OpenAiChatClient};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn completions(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    upstream.seen.lock().unwrap().push((auth, body));
    (upstream.status, Json(upstream.reply.clone()))
}

async fn spawn_upstream(status: StatusCode, reply: Value) -> (String, Upstream) {
    let upstream = Upstream {
        status,
        reply,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let router = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(upstream.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}/v1", addr), upstream)
}

fn completion(content: Value) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_single_turn_request_shape() {
    let (base_url, upstream) =
        spawn_upstream(StatusCode::OK, completion(json!(" Nous ouvrons à 9h. "))).await;
    let client = OpenAiChatClient::new(LlmConfig::new("sk-test").with_base_url(base_url)).unwrap();

    let reply = client
        .complete("Tu es l'assistant.", "Vous ouvrez à quelle heure ?")
        .await
        .unwrap();
    assert_eq!(reply, "Nous ouvrons à 9h.");

    let seen = upstream.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (auth, body) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "gpt-4o-mini");
    assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[0]["content"], "Tu es l'assistant.");
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[1]["content"], "Vous ouvrez à quelle heure ?");
    assert!(body.get("stream").is_none());
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    let (base_url, _) = spawn_upstream(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "rate limited" } }),
    )
    .await;
    let client = OpenAiChatClient::new(LlmConfig::new("sk-test").with_base_url(base_url)).unwrap();

    match client.complete("sys", "bonjour").await {
        Err(ModelError::Status { status, body }) => {
            assert_eq!(status, 429);
            assert!(body.contains("rate limited"));
        }
        other => panic!("expected Status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_null_or_blank_content_is_empty() {
    for content in [Value::Null, json!("   ")] {
        let (base_url, _) = spawn_upstream(StatusCode::OK, completion(content)).await;
        let client =
            OpenAiChatClient::new(LlmConfig::new("sk-test").with_base_url(base_url)).unwrap();
        let err = client.complete("sys", "bonjour").await.unwrap_err();
        assert!(matches!(err, ModelError::EmptyContent), "got {:?}", err);
    }
}

#[tokio::test]
async fn test_missing_choices_is_malformed() {
    let (base_url, _) = spawn_upstream(StatusCode::OK, json!({ "choices": [] })).await;
    let client = OpenAiChatClient::new(LlmConfig::new("sk-test").with_base_url(base_url)).unwrap();

    let err = client.complete("sys", "bonjour").await.unwrap_err();
    assert_eq!(err.kind(), "malformed_response");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // Port 9 (discard) is closed on test hosts.
    let client =
        OpenAiChatClient::new(LlmConfig::new("sk-test").with_base_url("http://127.0.0.1:9/v1"))
            .unwrap();

    let err = client.complete("sys", "bonjour").await.unwrap_err();
    assert!(matches!(err, ModelError::Http(_)), "got {:?}", err);
}
