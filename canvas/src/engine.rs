use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scene::model::{NUM_BACKGROUNDS, PALETTE};
use scene::{Action, ActorId, Document, Point, ReduceError};

use crate::hit::hit_test;
use crate::input::{Cursor, MoveState, Tool, ToolState, UiState};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Effects returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send this action to the server.
    Send(Action),
    /// Local state changed; repaint.
    RenderNeeded,
    /// Change the pointer cursor.
    SetCursor(Cursor),
    /// The server refused one of our actions.
    Rejected { code: String, message: String },
}

/// Where the host should paint the semi-transparent copy of a dragged actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPreview {
    pub actor_ix: usize,
    pub actor_id: ActorId,
    pub position: Point,
}

/// Core engine state: the replica plus local interaction state.
///
/// Pointer handlers never touch `replica`; it only changes through
/// [`EngineCore::apply_server_action`] and [`EngineCore::load_snapshot`].
pub struct EngineCore {
    pub replica: Document,
    pub ui: UiState,
    rng: StdRng,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose palette choices are reproducible.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        let replica = Document { actors: Vec::new(), background: 0, next_id: 0 };
        Self { replica, ui: UiState::default(), rng }
    }

    // --- Data inputs ---

    /// Replace the replica with a server snapshot. Any drag in progress
    /// refers to the old replica and is dropped.
    pub fn load_snapshot(&mut self, doc: Document) {
        self.replica = doc;
        if let ToolState::Move(state) = &mut self.ui.tool_state {
            *state = MoveState::Up;
        }
    }

    /// Apply a server broadcast with the same reducer the server uses, then
    /// keep an in-progress drag attached to its actor.
    ///
    /// # Errors
    ///
    /// Returns the reducer's error if the broadcast does not apply to this
    /// replica, which means the replica no longer matches the server.
    pub fn apply_server_action(&mut self, action: &Action) -> Result<(), ReduceError> {
        self.replica.apply(action)?;
        if let ToolState::Move(MoveState::Drag { actor_id, origin, current, .. }) = self.ui.tool_state {
            let next = match self.replica.index_of(actor_id) {
                Some(actor_ix) => MoveState::Drag { actor_ix, actor_id, origin, current },
                None => MoveState::Up,
            };
            self.ui.tool_state = ToolState::Move(next);
        }
        Ok(())
    }

    // --- Tool / panels ---

    /// Switch tools. Discards any gesture in progress without sending.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Effect> {
        self.ui.tool_state = ToolState::init(tool);
        vec![Effect::RenderNeeded]
    }

    /// Replace the text the speech tool sends.
    pub fn set_speech_input(&mut self, text: impl Into<String>) {
        self.ui.speech_input = text.into();
    }

    /// Pick a background from the side panel. Only the background tool
    /// shows the panel, and only listed backgrounds can be chosen.
    pub fn select_background(&mut self, bg: u32) -> Vec<Effect> {
        if self.ui.tool_state != ToolState::Bg || bg >= NUM_BACKGROUNDS {
            return Vec::new();
        }
        vec![Effect::Send(Action::SetBackground { bg })]
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, p: Point) -> Vec<Effect> {
        let hit = hit_test(&self.replica, p).map(|ix| (ix, self.replica.actors[ix].id));

        match self.ui.tool_state {
            ToolState::Move(MoveState::Up) => {
                let next = match hit {
                    Some((actor_ix, actor_id)) => MoveState::Drag { actor_ix, actor_id, origin: p, current: p },
                    None => MoveState::Down,
                };
                self.ui.tool_state = ToolState::Move(next);
                vec![Effect::RenderNeeded]
            }
            ToolState::Move(MoveState::Down | MoveState::Drag { .. }) | ToolState::Bg => Vec::new(),
            ToolState::Speech => hit
                .map(|(actor_ix, actor_id)| {
                    Effect::Send(Action::SetSpeech {
                        actor_ix,
                        msg: self.ui.speech_input.clone(),
                        actor_id: Some(actor_id),
                    })
                })
                .into_iter()
                .collect(),
            ToolState::Add => {
                let color = PALETTE[self.rng.random_range(0..PALETTE.len())].to_owned();
                vec![Effect::Send(Action::AddActor { p, color })]
            }
            ToolState::Delete => hit
                .map(|(actor_ix, actor_id)| Effect::Send(Action::DeleteActor { actor_ix, actor_id: Some(actor_id) }))
                .into_iter()
                .collect(),
        }
    }

    pub fn on_pointer_move(&mut self, p: Point) -> Vec<Effect> {
        let mut effects = Vec::new();

        if let ToolState::Move(MoveState::Drag { current, .. }) = &mut self.ui.tool_state {
            *current = p;
            effects.push(Effect::RenderNeeded);
        }

        let cursor = self.hover(p);
        if cursor != self.ui.cursor {
            self.ui.cursor = cursor;
            effects.push(Effect::SetCursor(cursor));
        }
        effects
    }

    /// Ends a drag. The drop lands where the preview was last painted,
    /// `position + (current - origin)`; the release coordinate itself is
    /// not used.
    pub fn on_pointer_up(&mut self, _p: Point) -> Vec<Effect> {
        let ToolState::Move(state) = self.ui.tool_state else {
            return Vec::new();
        };

        self.ui.tool_state = ToolState::Move(MoveState::Up);
        let MoveState::Drag { actor_id, .. } = state else {
            return Vec::new();
        };

        // The actor may have been deleted by someone else mid-drag.
        let Some(actor_ix) = self.replica.index_of(actor_id) else {
            return vec![Effect::RenderNeeded];
        };
        let (dx, dy) = state.delta();
        let target = self.replica.actors[actor_ix].position.offset(dx, dy);
        vec![
            Effect::Send(Action::SetPos { actor_ix, p: target, actor_id: Some(actor_id) }),
            Effect::RenderNeeded,
        ]
    }

    // --- Queries ---

    /// The active tool.
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool_state.tool()
    }

    /// Cursor to show with the pointer at `p`.
    #[must_use]
    pub fn hover(&self, p: Point) -> Cursor {
        if hit_test(&self.replica, p).is_some() { Cursor::Pointer } else { Cursor::Default }
    }

    /// The drag preview to paint over the replica, if a drag is in progress.
    #[must_use]
    pub fn drag_preview(&self) -> Option<DragPreview> {
        let state = self.ui.tool_state.move_state()?;
        let MoveState::Drag { actor_ix, actor_id, .. } = *state else {
            return None;
        };
        let actor = self.replica.actor(actor_ix).filter(|a| a.id == actor_id)?;
        let (dx, dy) = state.delta();
        Some(DragPreview { actor_ix, actor_id, position: actor.position.offset(dx, dy) })
    }
}
