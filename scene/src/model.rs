//! Document model: points, actors, and the shared scene.
//!
//! A `Document` is the whole replicated state. Actors are displayed and
//! addressed in sequence order; each one also carries an `ActorId` allocated
//! from the document's own counter, so every replica that applies the same
//! `addActor` hands out the same id. Interaction state (selected tool, drag
//! in progress) deliberately lives elsewhere and never enters this type.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::ops::Sub;

use serde::{Deserialize, Serialize};

// ── Scene constants ─────────────────────────────────────────────

/// Number of selectable backgrounds.
pub const NUM_BACKGROUNDS: u32 = 4;

/// Side length of an actor's square body, in canvas pixels.
pub const ACTOR_SIZE: f64 = 40.0;

/// Canvas width in pixels.
pub const CANVAS_WIDTH: f64 = 640.0;

/// Canvas height in pixels.
pub const CANVAS_HEIGHT: f64 = 480.0;

/// Colors a freshly added actor may be painted with.
pub const PALETTE: [&str; 5] = ["red", "blue", "green", "orange", "purple"];

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by a delta.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

impl Sub for Point {
    type Output = (f64, f64);

    /// Component-wise difference `self - rhs`, as a `(dx, dy)` delta.
    fn sub(self, rhs: Self) -> (f64, f64) {
        (self.x - rhs.x, self.y - rhs.y)
    }
}

/// Stable identifier for an actor. Never reused within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One draggable, speakable entity on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    /// Center of the actor's body.
    #[serde(rename = "p")]
    pub position: Point,
    /// Speech bubble text. Empty means no bubble.
    #[serde(rename = "msg")]
    pub message: String,
    /// CSS color name.
    pub color: String,
}

/// The shared scene. One authoritative instance lives on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub actors: Vec<Actor>,
    pub background: u32,
    /// Next id handed out by `addActor`.
    pub next_id: u64,
}

impl Document {
    /// The fixed scene every server starts with: a red and a blue actor on
    /// background 0.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            actors: vec![
                Actor {
                    id: ActorId(0),
                    position: Point::new(40.0, 50.0),
                    message: String::new(),
                    color: "red".into(),
                },
                Actor {
                    id: ActorId(1),
                    position: Point::new(100.0, 100.0),
                    message: String::new(),
                    color: "blue".into(),
                },
            ],
            background: 0,
            next_id: 2,
        }
    }

    /// Look up an actor by sequence index.
    #[must_use]
    pub fn actor(&self, actor_ix: usize) -> Option<&Actor> {
        self.actors.get(actor_ix)
    }

    /// Current sequence index of the actor with `id`, if it still exists.
    #[must_use]
    pub fn index_of(&self, id: ActorId) -> Option<usize> {
        self.actors.iter().position(|a| a.id == id)
    }

    /// Number of actors in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Returns `true` if the scene has no actors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::initial()
    }
}
