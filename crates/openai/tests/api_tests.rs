//! HTTP-level tests for [`OpenAIApi`] against a local stub server.
//!
//! Each test binds an axum router on `127.0.0.1:0` that mimics the OpenAI
//! endpoints, so request shapes and error mapping are exercised without
//! network access.

use std::net::SocketAddr;

use assert_matches::assert_matches;
use axum::extract::{Multipart, Request};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use spritegen_core::api_key::ApiKey;
use spritegen_core::error::GenerationError;
use spritegen_core::image_data::ReferenceImage;
use spritegen_core::model::ImageModel;
use spritegen_openai::api::OpenAIApi;
use spritegen_openai::client::GenerationClient;

/// Serve `router` on an ephemeral port and return an API client for it.
async fn spawn_stub(router: Router) -> OpenAIApi {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    OpenAIApi::with_client(reqwest_client(), format!("http://{addr}/v1"))
}

fn reqwest_client() -> reqwest::Client {
    reqwest::Client::new()
}

fn key() -> ApiKey {
    ApiKey::parse("sk-test").unwrap()
}

fn bearer(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// ---------------------------------------------------------------------------
// Text-to-image generation
// ---------------------------------------------------------------------------

async fn generations_ok(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    assert_eq!(bearer(&headers), "Bearer sk-test");
    assert_eq!(body["n"], 1);
    assert_eq!(body["size"], "1024x1024");
    assert_eq!(body["response_format"], "b64_json");
    Json(json!({ "created": 1, "data": [{ "b64_json": "aGVsbG8=" }] }))
}

#[tokio::test]
async fn generate_from_text_returns_png_data_url() {
    let api = spawn_stub(Router::new().route("/v1/images/generations", post(generations_ok))).await;

    let url = api
        .generate_from_text(ImageModel::DallE3, "a wizard", &key())
        .await
        .unwrap();

    assert_eq!(url.as_str(), "data:image/png;base64,aGVsbG8=");
}

#[tokio::test]
async fn generate_sends_model_and_quality() {
    async fn handler(Json(body): Json<Value>) -> impl IntoResponse {
        assert_eq!(body["model"], "dall-e-3");
        assert_eq!(body["quality"], "standard");
        assert_eq!(body["prompt"], "a wizard");
        Json(json!({ "data": [{ "b64_json": "AA==" }] }))
    }
    let api = spawn_stub(Router::new().route("/v1/images/generations", post(handler))).await;

    api.generate_from_text(ImageModel::DallE3, "a wizard", &key())
        .await
        .unwrap();
}

#[tokio::test]
async fn non_2xx_maps_to_remote_error_with_message() {
    async fn handler() -> impl IntoResponse {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "message": "Incorrect API key provided" } })),
        )
    }
    let api = spawn_stub(Router::new().route("/v1/images/generations", post(handler))).await;

    let err = api
        .generate_from_text(ImageModel::DallE3, "a wizard", &key())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GenerationError::Remote {
            status: 401,
            message: "Incorrect API key provided".into(),
        }
    );
}

#[tokio::test]
async fn non_json_error_body_uses_status_fallback() {
    async fn handler() -> impl IntoResponse {
        (StatusCode::BAD_GATEWAY, "upstream exploded")
    }
    let api = spawn_stub(Router::new().route("/v1/images/generations", post(handler))).await;

    let err = api
        .generate_from_text(ImageModel::GptImage1, "a wizard", &key())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "API call failed with status 502");
}

#[tokio::test]
async fn missing_b64_payload_is_format_error() {
    async fn handler() -> impl IntoResponse {
        Json(json!({ "data": [{ "url": "https://example.com/x.png" }] }))
    }
    let api = spawn_stub(Router::new().route("/v1/images/generations", post(handler))).await;

    let err = api
        .generate_from_text(ImageModel::DallE3, "a wizard", &key())
        .await
        .unwrap_err();

    assert_matches!(err, GenerationError::Format(_));
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    // Bind then drop a listener so the port is known to be closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = OpenAIApi::with_client(reqwest_client(), format!("http://{addr}/v1"));
    let err = api
        .generate_from_text(ImageModel::DallE3, "a wizard", &key())
        .await
        .unwrap_err();

    assert_matches!(err, GenerationError::Transport(_));
}

// ---------------------------------------------------------------------------
// Image edit
// ---------------------------------------------------------------------------

/// Echo which multipart fields arrived, encoded as the "image" payload.
async fn edits_echo(mut multipart: Multipart) -> impl IntoResponse {
    let mut names = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            assert_eq!(field.file_name(), Some("anime.png"));
            assert_eq!(field.content_type(), Some("image/png"));
        }
        let _ = field.bytes().await.unwrap();
        names.push(name);
    }
    Json(json!({ "data": [{ "b64_json": names.join("+") }] }))
}

#[tokio::test]
async fn edit_sends_multipart_with_image() {
    let api = spawn_stub(Router::new().route("/v1/images/edits", post(edits_echo))).await;
    let image = ReferenceImage::new(vec![137, 80, 78, 71], "image/png", "anime.png");

    let url = api
        .edit_with_reference(ImageModel::GptImage1, "walk frame", Some(&image), &key())
        .await
        .unwrap();

    assert_eq!(
        url.as_str(),
        "data:image/png;base64,model+prompt+n+size+response_format+image"
    );
}

#[tokio::test]
async fn edit_without_image_on_gpt_image_is_missing_input() {
    // No route registered: the call must fail before any request is sent.
    let api = spawn_stub(Router::new()).await;

    let err = api
        .edit_with_reference(ImageModel::GptImage1, "walk frame", None, &key())
        .await
        .unwrap_err();

    assert_matches!(err, GenerationError::MissingInput(_));
}

#[tokio::test]
async fn edit_without_image_is_allowed_when_model_does_not_require_it() {
    let api = spawn_stub(Router::new().route("/v1/images/edits", post(edits_echo))).await;

    let url = api
        .edit_with_reference(ImageModel::DallE3, "walk frame", None, &key())
        .await
        .unwrap();

    assert!(url.as_str().ends_with("model+prompt+n+size+response_format"));
}

// ---------------------------------------------------------------------------
// Chat classification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn classify_returns_raw_content() {
    async fn handler(request: Request) -> impl IntoResponse {
        let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "classify me");
        assert!(body["max_tokens"].is_number());
        Json(json!({ "choices": [{ "message": { "role": "assistant", "content": "  Walk\n" } }] }))
    }
    let api = spawn_stub(Router::new().route("/v1/chat/completions", post(handler))).await;

    let raw = api.classify("classify me", &key()).await.unwrap();

    // Raw text is returned untouched; normalisation is the classifier's job.
    assert_eq!(raw, "  Walk\n");
}

#[tokio::test]
async fn classify_uses_configured_chat_model() {
    async fn handler(Json(body): Json<Value>) -> impl IntoResponse {
        assert_eq!(body["model"], "gpt-4.1-mini");
        Json(json!({ "choices": [{ "message": { "content": "idle" } }] }))
    }
    let api = spawn_stub(Router::new().route("/v1/chat/completions", post(handler)))
        .await
        .with_chat_model("gpt-4.1-mini");

    assert_eq!(api.classify("x", &key()).await.unwrap(), "idle");
}

#[tokio::test]
async fn classify_without_content_is_format_error() {
    async fn handler() -> impl IntoResponse {
        Json(json!({ "choices": [] }))
    }
    let api = spawn_stub(Router::new().route("/v1/chat/completions", post(handler))).await;

    let err = api.classify("x", &key()).await.unwrap_err();
    assert_matches!(err, GenerationError::Format(_));
}
