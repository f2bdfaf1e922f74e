//! Session registry — the single owner of the authoritative document.
//!
//! DESIGN
//! ======
//! One tokio task owns the `Document` and the session map and drains a
//! single command queue in order. Every websocket task talks to it through a
//! cloneable `RegistryHandle`. Because only this task ever touches the
//! document, mutations form one total order, and broadcasting in the order
//! they were applied reproduces that order on every connection.
//!
//! LIFECYCLE
//! =========
//! 1. `Join` → `initState` pushed to the new session's queue, then the
//!    session becomes active (so nothing can overtake the snapshot)
//! 2. `Inbound` → decode → apply → broadcast the original text verbatim to
//!    every active session, sender included
//! 3. `Leave` → session removed; the document is untouched
//!
//! ERROR HANDLING
//! ==============
//! Undecodable or inapplicable actions never touch the document and are not
//! broadcast; the sender alone gets a `rejected` notice. A session whose
//! queue is closed or full is pruned without disturbing anyone else.

use std::collections::HashMap;

use scene::codec::{self, CodecError};
use scene::{Document, ErrorCode};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// Opaque per-connection identifier.
pub type SessionId = Uuid;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry task is not running")]
    Closed,
    #[error("initial state could not be delivered to the new session")]
    InitUndeliverable,
    #[error("initial state could not be encoded: {0}")]
    Encode(#[from] CodecError),
}

/// Requests processed by the registry task, strictly one at a time.
#[derive(Debug)]
pub enum Command {
    Join { username: String, tx: mpsc::Sender<String>, reply: oneshot::Sender<Result<SessionId, RegistryError>> },
    Inbound { session_id: SessionId, text: String },
    Leave { session_id: SessionId },
    Snapshot { reply: oneshot::Sender<Document> },
    SessionCount { reply: oneshot::Sender<usize> },
}

/// An active session: who it is and where its outbound text goes.
#[derive(Debug)]
struct Session {
    username: String,
    tx: mpsc::Sender<String>,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// State owned by the registry task.
pub struct Registry {
    doc: Document,
    sessions: HashMap<SessionId, Session>,
}

impl Registry {
    #[must_use]
    pub fn new(doc: Document) -> Self {
        Self { doc, sessions: HashMap::new() }
    }

    /// The current authoritative document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Number of active sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Process one command to completion.
    pub fn handle(&mut self, command: Command) {
        match command {
            Command::Join { username, tx, reply } => {
                let result = self.join(username, tx);
                if reply.send(result).is_err() {
                    debug!("registry: join requester went away");
                }
            }
            Command::Inbound { session_id, text } => self.inbound(session_id, &text),
            Command::Leave { session_id } => self.leave(session_id),
            Command::Snapshot { reply } => {
                if reply.send(self.document().clone()).is_err() {
                    debug!("registry: snapshot requester went away");
                }
            }
            Command::SessionCount { reply } => {
                if reply.send(self.session_count()).is_err() {
                    debug!("registry: session count requester went away");
                }
            }
        }
    }

    /// Drain `rx` until every handle is dropped.
    pub async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(command) = rx.recv().await {
            self.handle(command);
        }
        info!(sessions = self.session_count(), "registry: all handles dropped, stopping");
    }

    fn join(&mut self, username: String, tx: mpsc::Sender<String>) -> Result<SessionId, RegistryError> {
        let init = codec::encode_init(&self.doc)?;
        if tx.try_send(init).is_err() {
            warn!(%username, "registry: could not deliver initial state");
            return Err(RegistryError::InitUndeliverable);
        }

        let session_id = Uuid::new_v4();
        info!(%session_id, %username, sessions = self.sessions.len() + 1, "registry: session active");
        self.sessions.insert(session_id, Session { username, tx });
        Ok(session_id)
    }

    fn inbound(&mut self, session_id: SessionId, text: &str) {
        let Some(session) = self.sessions.get(&session_id) else {
            debug!(%session_id, "registry: message from inactive session dropped");
            return;
        };

        let action = match codec::decode_action(text) {
            Ok(action) => action,
            Err(e) => {
                warn!(%session_id, username = %session.username, error = %e, "registry: undecodable action");
                self.reject(session_id, &e);
                return;
            }
        };

        if let Err(e) = self.doc.apply(&action) {
            warn!(%session_id, action = action.name(), error = %e, "registry: action rejected");
            self.reject(session_id, &e);
            return;
        }

        info!(%session_id, action = action.name(), actors = self.doc.len(), "registry: action applied");
        self.broadcast(text);
    }

    fn leave(&mut self, session_id: SessionId) {
        if let Some(session) = self.sessions.remove(&session_id) {
            info!(%session_id, username = %session.username, sessions = self.sessions.len(), "registry: session closed");
        }
    }

    /// Send `text` to every active session. Sessions that cannot accept it
    /// are pruned.
    pub fn broadcast(&mut self, text: &str) {
        let dead: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.tx.try_send(text.to_owned()).is_err())
            .map(|(id, _)| *id)
            .collect();

        for session_id in dead {
            if let Some(session) = self.sessions.remove(&session_id) {
                warn!(%session_id, username = %session.username, "registry: pruned unreachable session");
            }
        }
    }

    fn reject(&mut self, session_id: SessionId, err: &(impl ErrorCode + ?Sized)) {
        let notice = match codec::encode_rejected(err) {
            Ok(notice) => notice,
            Err(e) => {
                warn!(%session_id, error = %e, "registry: failed to encode rejection");
                return;
            }
        };
        let Some(session) = self.sessions.get(&session_id) else {
            return;
        };
        if session.tx.try_send(notice).is_err() {
            self.sessions.remove(&session_id);
            warn!(%session_id, "registry: pruned unreachable session");
        }
    }
}

// =============================================================================
// HANDLE
// =============================================================================

/// Cloneable handle used by websocket tasks to reach the registry.
#[derive(Clone, Debug)]
pub struct RegistryHandle {
    tx: mpsc::Sender<Command>,
}

impl RegistryHandle {
    /// Authenticated session wants in. Returns its id once `initState` has
    /// been queued on `tx`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the registry is gone or the snapshot
    /// could not be queued.
    pub async fn join(&self, username: impl Into<String>, tx: mpsc::Sender<String>) -> Result<SessionId, RegistryError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Join { username: username.into(), tx, reply }).await?;
        rx.await.map_err(|_| RegistryError::Closed)?
    }

    /// Queue one inbound text message from a session.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Closed`] if the registry is gone.
    pub async fn inbound(&self, session_id: SessionId, text: impl Into<String>) -> Result<(), RegistryError> {
        self.send(Command::Inbound { session_id, text: text.into() }).await
    }

    /// Remove a session.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Closed`] if the registry is gone.
    pub async fn leave(&self, session_id: SessionId) -> Result<(), RegistryError> {
        self.send(Command::Leave { session_id }).await
    }

    /// Clone of the current document.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Closed`] if the registry is gone.
    pub async fn snapshot(&self) -> Result<Document, RegistryError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| RegistryError::Closed)
    }

    /// Number of active sessions.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Closed`] if the registry is gone.
    pub async fn session_count(&self) -> Result<usize, RegistryError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SessionCount { reply }).await?;
        rx.await.map_err(|_| RegistryError::Closed)
    }

    async fn send(&self, command: Command) -> Result<(), RegistryError> {
        self.tx.send(command).await.map_err(|_| RegistryError::Closed)
    }
}

/// Spawn the registry task around `doc`.
#[must_use]
pub fn spawn_registry(doc: Document, capacity: usize) -> (RegistryHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity);
    let task = tokio::spawn(Registry::new(doc).run(rx));
    (RegistryHandle { tx }, task)
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
