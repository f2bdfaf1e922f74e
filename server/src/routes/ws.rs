//! WebSocket handler — relay between one socket and the registry.
//!
//! DESIGN
//! ======
//! Credentials are checked before the upgrade; a refused client gets a plain
//! `401` and never sees a protocol message. After the upgrade the connection
//! joins the registry and enters a `select!` loop:
//! - Incoming socket text → forwarded to the registry unparsed
//! - Outbound queue (initState, broadcasts, rejections) → written to socket
//!
//! The connection task never decodes actions. Ordering, validation and
//! fan-out all belong to the registry.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade request → credentials from cookies, else query → 401 or upgrade
//! 2. Join → registry queues `initState` before anything else
//! 3. Relay until the socket closes or the registry drops the session
//! 4. Leave

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::AppState;

pub const USER_COOKIE: &str = "user";
pub const TOKEN_COOKIE: &str = "token";

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<HashMap<String, String>>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some((user, token)) = credentials(&jar, &params) else {
        return (StatusCode::UNAUTHORIZED, "credentials required").into_response();
    };

    let Some(username) = state.auth.authenticate(&user, &token) else {
        warn!(%user, "ws: authentication failed");
        return (StatusCode::UNAUTHORIZED, "invalid credentials").into_response();
    };

    ws.on_upgrade(move |socket| run_ws(socket, state, username))
}

/// `user`/`token` cookies, falling back to the same names in the query.
fn credentials(jar: &CookieJar, params: &HashMap<String, String>) -> Option<(String, String)> {
    let from_cookies = jar
        .get(USER_COOKIE)
        .zip(jar.get(TOKEN_COOKIE))
        .map(|(user, token)| (user.value().to_owned(), token.value().to_owned()));

    from_cookies.or_else(|| {
        let user = params.get(USER_COOKIE)?;
        let token = params.get(TOKEN_COOKIE)?;
        Some((user.clone(), token.clone()))
    })
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, username: String) {
    let (client_tx, mut client_rx) = mpsc::channel::<String>(state.client_buffer);

    let session_id = match state.registry.join(username.clone(), client_tx).await {
        Ok(id) => id,
        Err(e) => {
            warn!(%username, error = %e, "ws: join failed");
            return;
        }
    };

    info!(%session_id, %username, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        if state.registry.inbound(session_id, text.as_str()).await.is_err() {
                            warn!(%session_id, "ws: registry gone");
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => debug!(%session_id, "ws: ignoring non-text frame"),
                }
            }
            outbound = client_rx.recv() => {
                // None: the registry pruned this session.
                let Some(text) = outbound else { break };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    if state.registry.leave(session_id).await.is_err() {
        debug!(%session_id, "ws: registry gone before leave");
    }
    info!(%session_id, %username, "ws: client disconnected");
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
