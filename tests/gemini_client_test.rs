use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use rec_note::model::gemini::GeminiClient;
use rec_note::model::{GenerativeModel, ModelError, Part};

#[derive(Clone)]
struct FakeGemini {
    status: StatusCode,
    reply: Value,
    received: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

async fn generate_content(
    State(fake): State<FakeGemini>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let api_key = headers
        .get("x-goog-api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    fake.received.lock().unwrap().push((call, api_key, body));
    (fake.status, Json(fake.reply.clone())).into_response()
}

async fn spawn_fake(status: StatusCode, reply: Value) -> (String, FakeGemini) {
    let fake = FakeGemini {
        status,
        reply,
        received: Arc::default(),
    };
    let router = Router::new()
        .route("/v1beta/models/:call", post(generate_content))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    (format!("http://{addr}/v1beta"), fake)
}

fn client(api_base: &str) -> GeminiClient {
    GeminiClient::new(api_base, "gemini-1.5-flash", "secret-key".into(), None).unwrap()
}

#[tokio::test]
async fn sends_parts_and_key_then_joins_candidate_text() {
    let (api_base, fake) = spawn_fake(
        StatusCode::OK,
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Speaker 1: " }, { "text": "hello" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16 }
        }),
    )
    .await;

    let text = client(&api_base)
        .generate(vec![
            Part::text("Generate a transcript of the provided audio file."),
            Part::inline_bytes("audio/mpeg", b"abc"),
        ])
        .await
        .unwrap();

    assert_eq!(text, "Speaker 1: hello");
    let received = fake.received.lock().unwrap();
    let (call, api_key, body) = &received[0];
    assert_eq!(call, "gemini-1.5-flash:generateContent");
    assert_eq!(api_key.as_deref(), Some("secret-key"));
    assert_eq!(
        body,
        &json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": "Generate a transcript of the provided audio file." },
                    { "inlineData": { "mimeType": "audio/mpeg", "data": "YWJj" } }
                ]
            }]
        })
    );
}

#[tokio::test]
async fn error_status_carries_the_api_message() {
    let (api_base, _fake) = spawn_fake(
        StatusCode::BAD_REQUEST,
        json!({ "error": { "code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT" } }),
    )
    .await;

    let err = client(&api_base)
        .generate(vec![Part::text("hi")])
        .await
        .unwrap_err();

    match err {
        ModelError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid. Please pass a valid API key.");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn blocked_prompt_is_an_error() {
    let (api_base, _fake) = spawn_fake(
        StatusCode::OK,
        json!({ "promptFeedback": { "blockReason": "OTHER" } }),
    )
    .await;

    let err = client(&api_base)
        .generate(vec![Part::text("hi")])
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Text not available. Response was blocked due to OTHER"
    );
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}/v1beta"))
        .generate(vec![Part::text("hi")])
        .await
        .unwrap_err();

    assert!(matches!(err, ModelError::Transport(_)));
}
