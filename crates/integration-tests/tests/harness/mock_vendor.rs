//! Mock vendor server for integration tests
//!
//! Serves minimal `OpenAI`, Anthropic and Gemini endpoints with canned
//! replies. The requested model name selects the behavior:
//!
//! - `raw`: non-JSON body
//! - `fail`: 500 with a JSON error body
//! - `tools`: a tool call instead of text
//! - `blocked`: Gemini safety refusal
//! - `slow`: one streamed fragment, then the stream stalls

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::TEST_KEY;

/// A request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct MockVendor {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    fn record(&self, uri: &Uri, headers: &HeaderMap, body: &Value) {
        self.requests.lock().unwrap().push(RecordedRequest {
            path: uri.path().to_owned(),
            query: uri.query().map(str::to_owned),
            headers: headers.clone(),
            body: body.clone(),
        });
    }
}

impl MockVendor {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .route("/v1/messages", routing::post(handle_messages))
            .route("/v1beta/models/{call}", routing::post(handle_generate_content))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for `OpenAI`-style and Anthropic providers
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Base URL for the Gemini provider
    pub fn gemini_base_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Most recent request
    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("at least one request")
    }
}

impl Drop for MockVendor {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// -- Helpers --

fn model_of(body: &Value) -> &str {
    body["model"].as_str().unwrap_or_default()
}

fn is_streaming(body: &Value) -> bool {
    body["stream"].as_bool().unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"message": "invalid api key"}})),
    )
        .into_response()
}

fn failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": {"message": "mock server intentional failure"}})),
    )
        .into_response()
}

fn raw_text() -> Response {
    (StatusCode::OK, "hello").into_response()
}

/// SSE response from pre-rendered lines; `stall` keeps the body open forever
fn sse(lines: Vec<String>, stall: bool) -> Response {
    let chunks = stream::iter(lines.into_iter().map(|line| Ok::<_, Infallible>(Bytes::from(line))));
    let body = if stall {
        Body::from_stream(chunks.chain(stream::pending()))
    } else {
        Body::from_stream(chunks)
    };

    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .body(body)
        .unwrap()
}

fn data(value: &Value) -> String {
    format!("data: {value}\n\n")
}

// -- OpenAI --

async fn handle_chat_completions(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&uri, &headers, &body);

    let expected = format!("Bearer {TEST_KEY}");
    if headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return unauthorized();
    }

    let model = model_of(&body);
    match model {
        "fail" => return failure(),
        "raw" => return raw_text(),
        _ => {}
    }

    if is_streaming(&body) {
        let delta = |text: &str| data(&json!({"choices": [{"index": 0, "delta": {"content": text}}]}));

        if model == "slow" {
            return sse(vec![delta("first")], true);
        }

        return sse(
            vec![
                data(&json!({"choices": [{"index": 0, "delta": {"role": "assistant", "content": ""}}]})),
                delta("Hello"),
                delta(" from"),
                delta(" mock"),
                "data: [DONE]\n\n".to_owned(),
            ],
            false,
        );
    }

    let message = if model == "tools" {
        json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_test_123",
                "type": "function",
                "function": {"name": "get_weather", "arguments": "{\"location\":\"San Francisco\"}"}
            }]
        })
    } else {
        json!({"role": "assistant", "content": "Hello from mock LLM"})
    };

    Json(json!({
        "id": "chatcmpl-test-123",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": model,
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }))
    .into_response()
}

// -- Anthropic --

async fn handle_messages(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&uri, &headers, &body);

    let authorized = headers.get("x-api-key").and_then(|v| v.to_str().ok()) == Some(TEST_KEY);
    if !authorized || !headers.contains_key("anthropic-version") {
        return unauthorized();
    }

    if model_of(&body) == "fail" {
        return failure();
    }

    if is_streaming(&body) {
        let text_delta = |text: &str| {
            data(&json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": text}}))
        };

        return sse(
            vec![
                "event: message_start\n".to_owned(),
                data(&json!({"type": "message_start", "message": {"id": "msg_1", "role": "assistant"}})),
                "event: content_block_start\n".to_owned(),
                data(&json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}})),
                "event: content_block_delta\n".to_owned(),
                text_delta("Hello"),
                data(&json!({"type": "ping"})),
                text_delta(" from"),
                text_delta(" claude"),
                data(&json!({"type": "content_block_stop", "index": 0})),
                data(&json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"}})),
                data(&json!({"type": "message_stop"})),
            ],
            false,
        );
    }

    Json(json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "model": model_of(&body),
        "content": [{"type": "text", "text": "Hello from claude"}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 10, "output_tokens": 5}
    }))
    .into_response()
}

// -- Gemini --

async fn handle_generate_content(
    State(state): State<Arc<MockState>>,
    Path(call): Path<String>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(&uri, &headers, &body);

    let query = uri.query().unwrap_or_default();
    if !query.split('&').any(|pair| pair == format!("key={TEST_KEY}")) {
        return unauthorized();
    }

    let Some((model, method)) = call.split_once(':') else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if model == "fail" {
        return failure();
    }

    let text_frame = |text: &str, finish: Option<&str>| {
        let mut candidate = json!({"content": {"role": "model", "parts": [{"text": text}]}, "index": 0});
        if let Some(reason) = finish {
            candidate["finishReason"] = json!(reason);
        }
        json!({"candidates": [candidate]})
    };

    match method {
        "streamGenerateContent" => {
            if model == "blocked" {
                return sse(
                    vec![
                        data(&text_frame("Partial", None)),
                        data(&json!({"candidates": [{"finishReason": "SAFETY", "index": 0}]})),
                    ],
                    false,
                );
            }

            sse(
                vec![
                    data(&text_frame("Hello", None)),
                    data(&text_frame(" from", None)),
                    data(&text_frame(" gemini", Some("STOP"))),
                ],
                false,
            )
        }
        "generateContent" => {
            if model == "blocked" {
                return Json(json!({"candidates": [{"finishReason": "SAFETY", "index": 0}]})).into_response();
            }

            if model == "tools" {
                return Json(json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [
                            {"functionCall": {"name": "get_weather", "args": {"location": "Oslo"}}}
                        ]},
                        "finishReason": "STOP"
                    }]
                }))
                .into_response();
            }

            Json(text_frame("Hello from gemini", Some("STOP"))).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}
