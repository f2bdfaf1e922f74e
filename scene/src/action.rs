//! Actions and the reducer that folds them into a `Document`.
//!
//! DESIGN
//! ======
//! An `Action` is both the client's request and, once the server accepts
//! it, the broadcast that every replica applies. The wire shape is the same
//! in both directions.
//!
//! Actors are addressed by sequence index. Index-addressed variants also
//! carry an optional `actor_id` guard: when present, the action only applies
//! if the actor at `actor_ix` still has that id. A client that captured the
//! index before a concurrent `deleteActor` shifted it gets a `StaleActor`
//! rejection instead of silently editing the wrong actor.
//!
//! `Document::apply` validates before it mutates, so a rejected action
//! leaves the document exactly as it was.

#[cfg(test)]
#[path = "action_test.rs"]
mod action_test;

use serde::{Deserialize, Serialize};

use crate::ErrorCode;
use crate::model::{Actor, ActorId, Document, Point};

/// Discriminator values accepted for `Action::t`.
pub const ACTION_TAGS: [&str; 5] = ["setSpeech", "setPos", "addActor", "deleteActor", "setBackground"];

/// A request to mutate the shared document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    /// Replace an actor's speech bubble text.
    SetSpeech {
        actor_ix: usize,
        msg: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        actor_id: Option<ActorId>,
    },
    /// Move an actor. Positions outside the canvas are accepted as-is.
    SetPos {
        actor_ix: usize,
        p: Point,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        actor_id: Option<ActorId>,
    },
    /// Append a new actor with an empty message.
    AddActor { p: Point, color: String },
    /// Remove an actor, shifting every later index down by one.
    DeleteActor {
        actor_ix: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        actor_id: Option<ActorId>,
    },
    /// Switch the background. Not range-checked.
    SetBackground { bg: u32 },
}

impl Action {
    /// The wire discriminator, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetSpeech { .. } => "setSpeech",
            Self::SetPos { .. } => "setPos",
            Self::AddActor { .. } => "addActor",
            Self::DeleteActor { .. } => "deleteActor",
            Self::SetBackground { .. } => "setBackground",
        }
    }

    /// Index of the actor this action addresses, if any.
    #[must_use]
    pub fn actor_ix(&self) -> Option<usize> {
        match self {
            Self::SetSpeech { actor_ix, .. } | Self::SetPos { actor_ix, .. } | Self::DeleteActor { actor_ix, .. } => {
                Some(*actor_ix)
            }
            Self::AddActor { .. } | Self::SetBackground { .. } => None,
        }
    }

    fn actor_guard(&self) -> Option<ActorId> {
        match self {
            Self::SetSpeech { actor_id, .. } | Self::SetPos { actor_id, .. } | Self::DeleteActor { actor_id, .. } => {
                *actor_id
            }
            Self::AddActor { .. } | Self::SetBackground { .. } => None,
        }
    }
}

/// Why an action could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReduceError {
    #[error("actor index {actor_ix} out of range (document has {len} actors)")]
    IndexOutOfRange { actor_ix: usize, len: usize },
    #[error("actor at index {actor_ix} is {found}, expected {expected}")]
    StaleActor { actor_ix: usize, expected: ActorId, found: ActorId },
}

impl ErrorCode for ReduceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::IndexOutOfRange { .. } => "E_INDEX_OUT_OF_RANGE",
            Self::StaleActor { .. } => "E_STALE_ACTOR",
        }
    }
}

impl Document {
    /// Apply one action in place.
    ///
    /// # Errors
    ///
    /// Returns a [`ReduceError`] if the action addresses a missing actor or
    /// fails its id guard. The document is unchanged in that case.
    pub fn apply(&mut self, action: &Action) -> Result<(), ReduceError> {
        if let Some(actor_ix) = action.actor_ix() {
            self.check_target(actor_ix, action.actor_guard())?;
        }

        match action {
            Action::SetSpeech { actor_ix, msg, .. } => {
                self.actors[*actor_ix].message.clone_from(msg);
            }
            Action::SetPos { actor_ix, p, .. } => {
                self.actors[*actor_ix].position = *p;
            }
            Action::AddActor { p, color } => {
                let id = ActorId(self.next_id);
                self.next_id += 1;
                self.actors.push(Actor { id, position: *p, message: String::new(), color: color.clone() });
            }
            Action::DeleteActor { actor_ix, .. } => {
                self.actors.remove(*actor_ix);
            }
            Action::SetBackground { bg } => {
                self.background = *bg;
            }
        }
        Ok(())
    }

    fn check_target(&self, actor_ix: usize, guard: Option<ActorId>) -> Result<(), ReduceError> {
        let Some(actor) = self.actors.get(actor_ix) else {
            return Err(ReduceError::IndexOutOfRange { actor_ix, len: self.actors.len() });
        };
        match guard {
            Some(expected) if expected != actor.id => {
                Err(ReduceError::StaleActor { actor_ix, expected, found: actor.id })
            }
            _ => Ok(()),
        }
    }
}

/// Pure reducer: return the document that results from applying `action`.
///
/// # Errors
///
/// Returns a [`ReduceError`] when the action is rejected; `doc` is never
/// modified either way.
pub fn reduce(doc: &Document, action: &Action) -> Result<Document, ReduceError> {
    let mut next = doc.clone();
    next.apply(action)?;
    Ok(next)
}
