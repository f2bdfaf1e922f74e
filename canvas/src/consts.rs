//! Shared numeric constants for the canvas crate.

use scene::model::ACTOR_SIZE;

// ── Hit-testing ─────────────────────────────────────────────────

/// Half the side of an actor's hit box; boxes are centered on the actor.
pub const ACTOR_HALF_EXTENT: f64 = ACTOR_SIZE / 2.0;

// ── Drag preview ────────────────────────────────────────────────

/// Opacity the host should paint the dragged actor's preview with.
pub const DRAG_PREVIEW_ALPHA: f64 = 0.5;
