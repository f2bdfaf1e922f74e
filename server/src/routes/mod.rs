//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One websocket endpoint carries the whole protocol. `/connect` is the
//! canonical path and `/api/ws` an alias; the remaining routes are
//! operational probes.

pub mod ws;

use axum::{Json, Router};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/connect", get(ws::handle_ws))
        .route("/api/ws", get(ws::handle_ws))
        .route("/api/scene", get(scene_snapshot))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 200 while the registry task is alive.
async fn healthz(State(state): State<AppState>) -> Response {
    match state.registry.session_count().await {
        Ok(sessions) => (StatusCode::OK, format!("ok sessions={sessions}")).into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "registry unavailable").into_response(),
    }
}

/// Current authoritative document as JSON.
async fn scene_snapshot(State(state): State<AppState>) -> Response {
    match state.registry.snapshot().await {
        Ok(doc) => Json(doc).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "scene snapshot failed");
            (StatusCode::SERVICE_UNAVAILABLE, "registry unavailable").into_response()
        }
    }
}
