//! HTTP surface of the bridge: run submission (SSE), cancellation, memory
//! inspection, and the interpret endpoint for the voice HMI.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use uuid::Uuid;

use joule_agent::{AgentEvent, RunManager};
use joule_interpreter::ConversationalContext;
use joule_memory::SharedMemory;

/// Header carrying the API key when the gate is configured.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Response header carrying the run identifier for later cancellation.
pub const RUN_ID_HEADER: &str = "x-run-id";

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<RunManager>,
    pub memory: SharedMemory,
    /// `None` disables the auth gate.
    pub api_key: Option<String>,
    /// Configured home city, the interpreter's location fallback when a
    /// request supplies no context of its own.
    pub home_city: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing or invalid API key")]
    Unauthorized,
    #[error("goal must not be empty")]
    EmptyGoal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::EmptyGoal => StatusCode::BAD_REQUEST,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn build_router(state: AppState, permissive_cors: bool) -> Router {
    let api = Router::new()
        .route("/api/interpret", post(interpret))
        .route("/api/agent/run", post(submit_run))
        .route("/api/agent/runs/:id/cancel", post(cancel_run))
        .route("/api/agent/memory", get(memory_summary))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    let mut router = Router::new()
        .route("/health", get(health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state);
    if permissive_cors {
        // Allow the HMI dev server (different origin) to consume SSE.
        router = router.layer(CorsLayer::permissive());
    }
    router
}

/// Auth gate: rejected requests produce no side effects — no run is
/// created and no run identifier is issued.
async fn require_api_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: axum::extract::Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !key_matches(state.api_key.as_deref(), header_value(&headers)) {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

fn header_value(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
}

fn key_matches(expected: Option<&str>, provided: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => provided == Some(expected),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ── interpret ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct InterpretRequest {
    utterance: String,
    #[serde(default)]
    context: Option<ConversationalContext>,
}

async fn interpret(
    State(state): State<AppState>,
    Json(request): Json<InterpretRequest>,
) -> Json<serde_json::Value> {
    let mut context = request.context.unwrap_or_default();
    if context.user_location.is_none() {
        context.user_location = state.home_city.clone();
    }
    let command = joule_interpreter::interpret(&request.utterance, &context);
    Json(command.to_json())
}

// ── agent runs ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SubmitRunRequest {
    goal: String,
    #[serde(default)]
    settings: Option<serde_json::Value>,
}

/// Submit a goal and stream its lifecycle as Server-Sent Events.  The
/// response carries the run id in a header so the caller can cancel before
/// the stream ends.
async fn submit_run(
    State(state): State<AppState>,
    Json(request): Json<SubmitRunRequest>,
) -> Result<Response, ApiError> {
    if request.goal.trim().is_empty() {
        return Err(ApiError::EmptyGoal);
    }
    let settings = request.settings.unwrap_or(serde_json::Value::Null);
    let mut submission = state.manager.submit(&request.goal, settings).await;
    let run_id = submission.run_id;

    let stream = async_stream::stream! {
        while let Some(event) = submission.events.recv().await {
            let done = event.is_final();
            match sse_frame(run_id, &event) {
                Ok(frame) => yield Ok::<Event, Infallible>(frame),
                Err(err) => error!(%run_id, error = %err, "failed to serialize agent event"),
            }
            if done {
                break;
            }
        }
    };
    let sse = Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(10)).text("keep-alive"));

    Ok(([(RUN_ID_HEADER, run_id.to_string())], sse).into_response())
}

/// Frame one event: `event: <type>` plus a JSON payload tagged with the
/// run id, since two concurrent runs may share a transport.
fn sse_frame(run_id: Uuid, event: &AgentEvent) -> Result<Event, serde_json::Error> {
    let payload = frame_payload(run_id, event)?;
    Ok(Event::default().event(event.name()).data(payload.to_string()))
}

fn frame_payload(run_id: Uuid, event: &AgentEvent) -> Result<serde_json::Value, serde_json::Error> {
    let mut payload = serde_json::to_value(event)?;
    if let Some(map) = payload.as_object_mut() {
        map.insert("runId".to_string(), serde_json::json!(run_id));
    }
    Ok(payload)
}

#[derive(Debug, serde::Serialize)]
struct CancelResponse {
    cancelled: bool,
}

/// Set the cooperative cancellation flag.  Returns as soon as the flag is
/// set; cancelling an unknown or already-terminal run is a no-op.
async fn cancel_run(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<CancelResponse> {
    let cancelled = state.manager.cancel(id).await;
    Json(CancelResponse { cancelled })
}

/// Counts and ages only — raw entries never leave the store over the
/// inspection channel.
async fn memory_summary(State(state): State<AppState>) -> Json<joule_memory::MemorySummary> {
    Json(state.memory.summary().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use joule_agent::AgentStatus;

    #[test]
    fn key_matching_rules() {
        // Gate disabled: everything passes.
        assert!(key_matches(None, None));
        assert!(key_matches(None, Some("anything")));
        // Gate enabled: exact match only.
        assert!(key_matches(Some("secret"), Some("secret")));
        assert!(!key_matches(Some("secret"), Some("wrong")));
        assert!(!key_matches(Some("secret"), None));
    }

    #[test]
    fn frame_payloads_carry_the_run_id_and_type_tag() {
        let run_id = Uuid::new_v4();
        let event = AgentEvent::Final {
            status: AgentStatus::Completed,
            steps: vec![],
        };
        let payload = frame_payload(run_id, &event).unwrap();
        assert_eq!(payload["type"], "final");
        assert_eq!(payload["status"], "completed");
        assert_eq!(payload["runId"], serde_json::json!(run_id));
    }

    #[test]
    fn submit_request_accepts_optional_settings() {
        let with: SubmitRunRequest =
            serde_json::from_str(r#"{ "goal": "g", "settings": { "tons": 3 } }"#).unwrap();
        assert!(with.settings.is_some());
        let without: SubmitRunRequest = serde_json::from_str(r#"{ "goal": "g" }"#).unwrap();
        assert!(without.settings.is_none());
    }
}
