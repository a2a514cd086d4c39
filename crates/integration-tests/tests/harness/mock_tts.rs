//! Mock synthesis backend for integration tests
//!
//! Implements the `/tts` endpoint with canned responses and scriptable
//! failure modes.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// One synthesis call as the mock received it
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub text: String,
    pub voice: Option<String>,
    pub provider_preference: Option<String>,
    pub bitrate: Option<u32>,
}

/// Mock synthesis backend that returns predictable responses
pub struct MockTts {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockTtsState>,
}

struct MockTtsState {
    request_count: AtomicU32,
    /// Number of requests to fail before succeeding (0 = never fail)
    fail_count: AtomicU32,
    /// Reject any request whose text contains markup with 422
    reject_markup: bool,
    /// Reject any request whose text contains this substring with 500
    fail_containing: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTts {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(0, false, None).await
    }

    /// Start a mock server that fails the first `n` requests with 500
    pub async fn start_failing(n: u32) -> anyhow::Result<Self> {
        Self::start_inner(n, false, None).await
    }

    /// Start a mock server that rejects markup-bearing text with 422
    pub async fn start_rejecting_markup() -> anyhow::Result<Self> {
        Self::start_inner(0, true, None).await
    }

    /// Start a mock server that fails any request containing `needle`
    pub async fn start_failing_containing(needle: &str) -> anyhow::Result<Self> {
        Self::start_inner(0, false, Some(needle.to_owned())).await
    }

    async fn start_inner(
        fail_count: u32,
        reject_markup: bool,
        fail_containing: Option<String>,
    ) -> anyhow::Result<Self> {
        let state = Arc::new(MockTtsState {
            request_count: AtomicU32::new(0),
            fail_count: AtomicU32::new(fail_count),
            reject_markup,
            fail_containing,
            calls: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/tts", routing::post(handle_tts))
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

    /// Base URL for configuring the mock as the synthesis backend
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of synthesis requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// All calls received so far, in arrival order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.calls.lock().unwrap().clone()
    }
}

impl Drop for MockTts {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

// -- Wire types --

#[derive(Debug, Deserialize)]
struct TtsRequest {
    text: String,
    #[serde(default)]
    voice: Option<String>,
    #[serde(default)]
    provider_preference: Option<String>,
    #[serde(default)]
    bitrate: Option<u32>,
}

#[derive(Debug, Serialize)]
struct TtsResponse {
    audio_url: String,
    cached: bool,
    provider: String,
    expires_at: String,
}

async fn handle_tts(
    State(state): State<Arc<MockTtsState>>,
    Json(req): Json<TtsRequest>,
) -> impl IntoResponse {
    let n = state.request_count.fetch_add(1, Ordering::Relaxed) + 1;

    state.calls.lock().unwrap().push(RecordedCall {
        text: req.text.clone(),
        voice: req.voice.clone(),
        provider_preference: req.provider_preference.clone(),
        bitrate: req.bitrate,
    });

    let remaining = state.fail_count.load(Ordering::Relaxed);
    if remaining > 0 {
        state.fail_count.fetch_sub(1, Ordering::Relaxed);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "mock server intentional failure"})),
        )
            .into_response();
    }

    if state.reject_markup && req.text.contains('<') {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({"error": "markup not supported"})),
        )
            .into_response();
    }

    if let Some(needle) = &state.fail_containing {
        if req.text.contains(needle.as_str()) {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "mock server scripted failure"})),
            )
                .into_response();
        }
    }

    let response = TtsResponse {
        audio_url: format!("https://audio.test/{n}.mp3"),
        cached: false,
        provider: req.provider_preference.unwrap_or_else(|| "elevenlabs".to_owned()),
        expires_at: "2099-01-01T00:00:00Z".to_owned(),
    };

    Json(response).into_response()
}
