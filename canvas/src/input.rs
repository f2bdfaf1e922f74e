//! Input model: tools and the move-tool gesture state machine.
//!
//! `Tool` is the user's selection in the tool rail. `ToolState` pairs the
//! active tool with whatever gesture state that tool tracks between pointer
//! events; only the move tool has any. `MoveState::Drag` is the optimistic,
//! local-only part of a move: it never reaches the replica, and the server
//! only hears about the gesture once it ends.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use scene::{ActorId, Point};
use serde::{Deserialize, Serialize};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Drag actors around (default).
    #[default]
    Move,
    /// Click an actor to give it the current speech text.
    Speech,
    /// Click anywhere to add an actor at the pointer.
    Add,
    /// Click an actor to remove it.
    Delete,
    /// Pick a background from the side panel.
    Bg,
}

impl Tool {
    /// Tool rail order.
    pub const ALL: [Tool; 5] = [Tool::Move, Tool::Speech, Tool::Add, Tool::Delete, Tool::Bg];
}

/// Move-tool gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MoveState {
    /// Pointer released.
    #[default]
    Up,
    /// Pointer pressed on empty canvas.
    Down,
    /// Pointer pressed on an actor and possibly moved since.
    Drag {
        /// Index of the dragged actor in the replica.
        actor_ix: usize,
        /// Id of the dragged actor, used to follow it across index shifts.
        actor_id: ActorId,
        /// Pointer position at pointer-down.
        origin: Point,
        /// Latest pointer position.
        current: Point,
    },
}

impl MoveState {
    /// Drag offset `current - origin`, or zero when not dragging.
    #[must_use]
    pub fn delta(&self) -> (f64, f64) {
        match self {
            Self::Drag { origin, current, .. } => *current - *origin,
            Self::Up | Self::Down => (0.0, 0.0),
        }
    }
}

/// The active tool together with its gesture state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolState {
    Move(MoveState),
    Speech,
    Add,
    Delete,
    Bg,
}

impl ToolState {
    /// Fresh state for a newly selected tool.
    #[must_use]
    pub fn init(tool: Tool) -> Self {
        match tool {
            Tool::Move => Self::Move(MoveState::Up),
            Tool::Speech => Self::Speech,
            Tool::Add => Self::Add,
            Tool::Delete => Self::Delete,
            Tool::Bg => Self::Bg,
        }
    }

    /// The tool this state belongs to.
    #[must_use]
    pub fn tool(&self) -> Tool {
        match self {
            Self::Move(_) => Tool::Move,
            Self::Speech => Tool::Speech,
            Self::Add => Tool::Add,
            Self::Delete => Tool::Delete,
            Self::Bg => Tool::Bg,
        }
    }

    /// Move-tool gesture state, if the move tool is active.
    #[must_use]
    pub fn move_state(&self) -> Option<&MoveState> {
        match self {
            Self::Move(state) => Some(state),
            _ => None,
        }
    }
}

impl Default for ToolState {
    fn default() -> Self {
        Self::init(Tool::default())
    }
}

/// Pointer cursor the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    /// Over an actor.
    Pointer,
}

/// Client-local UI state. Never replicated.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub tool_state: ToolState,
    /// Free-text buffer the speech tool sends.
    pub speech_input: String,
    pub cursor: Cursor,
}

impl Default for UiState {
    fn default() -> Self {
        Self { tool_state: ToolState::default(), speech_input: "...".into(), cursor: Cursor::Default }
    }
}
