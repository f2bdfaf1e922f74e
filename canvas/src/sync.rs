//! Sync adapter: bridges the transport and the engine.
//!
//! Inbound server text is decoded and applied to the engine's replica one
//! message at a time, in the order the transport delivered it. Outbound
//! `Effect::Send` payloads are encoded for the host to write to the socket.
//!
//! LIFECYCLE
//! =========
//! 1. Connect: the adapter is unsynced and refuses actions.
//! 2. `initState` arrives: the replica is replaced and the adapter is synced.
//! 3. Every broadcast action folds into the replica.
//! 4. Disconnect, or a broadcast that does not apply: unsynced again until
//!    the next `initState`. There is no incremental catch-up.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use scene::codec::{self, CodecError, ServerMsg};
use scene::ReduceError;

use crate::engine::{Effect, EngineCore};

/// Why an inbound message could not be applied.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("undecodable server message: {0}")]
    Codec(#[from] CodecError),
    #[error("action received before initial state")]
    NotSynced,
    #[error("broadcast does not apply to local replica: {0}")]
    Diverged(#[from] ReduceError),
}

/// Applies server messages to an [`EngineCore`] in arrival order.
pub struct SyncAdapter {
    core: EngineCore,
    synced: bool,
}

impl SyncAdapter {
    #[must_use]
    pub fn new(core: EngineCore) -> Self {
        Self { core, synced: false }
    }

    #[must_use]
    pub fn core(&self) -> &EngineCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut EngineCore {
        &mut self.core
    }

    /// Whether the replica currently mirrors the server.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Decode and apply one inbound text message.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the message cannot be decoded, arrives
    /// before `initState`, or does not apply to the replica. In the last case
    /// the adapter drops back to unsynced and the host should reconnect.
    pub fn on_server_text(&mut self, text: &str) -> Result<Vec<Effect>, SyncError> {
        match codec::decode_server_msg(text)? {
            ServerMsg::Init(init) => {
                log::debug!("sync: initial state with {} actors", init.s.len());
                self.core.load_snapshot(init.s);
                self.synced = true;
                Ok(vec![Effect::RenderNeeded])
            }
            ServerMsg::Action(action) => {
                if !self.synced {
                    return Err(SyncError::NotSynced);
                }
                if let Err(e) = self.core.apply_server_action(&action) {
                    log::warn!("sync: {} broadcast diverged from replica: {e}", action.name());
                    self.synced = false;
                    return Err(e.into());
                }
                Ok(vec![Effect::RenderNeeded])
            }
            ServerMsg::Rejected(rejected) => {
                log::info!("sync: action rejected by server: {} {}", rejected.code, rejected.message);
                Ok(vec![Effect::Rejected { code: rejected.code, message: rejected.message }])
            }
        }
    }

    /// The transport dropped. The replica is kept for display but is no
    /// longer trusted.
    pub fn on_disconnect(&mut self) {
        self.synced = false;
        let tool = self.core.tool();
        self.core.set_tool(tool);
    }

    /// Encode the `Send` effects among `effects`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] if an action fails to serialize.
    pub fn outgoing(effects: &[Effect]) -> Result<Vec<String>, CodecError> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Send(action) => Some(codec::encode_action(action)),
                _ => None,
            })
            .collect()
    }
}
