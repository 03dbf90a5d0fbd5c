//! REST endpoints — the chat surface and session status.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use uuid::Uuid;

use crate::dialogue::DialogueManager;
use crate::routing::Unit;
use crate::session::{DialogueStage, SessionStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<DialogueManager>,
    pub store: Arc<SessionStore>,
}

/// Body of `POST /chat`.
///
/// The session id is accepted as a plain string: a missing or unparsable
/// id starts a fresh session rather than failing the request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

/// Response of `POST /chat`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub response: String,
}

/// Build the Axum router for the chat service.
pub fn chat_routes(state: AppState, allowed_origin: &str) -> Router {
    let mut router = Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .route("/api/sessions/{id}", get(session_status))
        .with_state(state);

    match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(origin)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }
        Err(e) => {
            warn!(origin = %allowed_origin, error = %e, "Invalid CORS origin, layer disabled");
        }
    }
    router
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> impl IntoResponse {
    let session_id = req
        .session_id
        .as_deref()
        .and_then(|s| Uuid::parse_str(s).ok());

    let reply = state.manager.handle_message(session_id, &req.message).await;
    Json(ChatResponse {
        session_id: reply.session_id,
        response: reply.response,
    })
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "uni-assist"
    }))
}

/// Progress snapshot returned by `GET /api/sessions/{id}`.
#[derive(Debug, Serialize)]
struct SessionStatus {
    session_id: Uuid,
    stage: DialogueStage,
    student_name: Option<String>,
    academic_year: Option<String>,
    student_query: Option<String>,
    routed_unit: Option<Unit>,
    submitted: bool,
}

async fn session_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let session_id = match Uuid::parse_str(&id) {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "Invalid session ID"})),
            )
                .into_response();
        }
    };

    match state.store.get(session_id).await {
        Some(session) => Json(SessionStatus {
            session_id: session.id,
            stage: session.stage,
            student_name: session.student_name,
            academic_year: session.academic_year,
            student_query: session.student_query,
            routed_unit: session.routed_unit,
            submitted: session.submitted,
        })
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Session not found"})),
        )
            .into_response(),
    }
}
