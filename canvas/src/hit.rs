#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use scene::{Actor, Document, Point};

use crate::consts::ACTOR_HALF_EXTENT;

/// Whether `p` falls strictly inside the actor's box.
#[must_use]
pub fn hits_actor(actor: &Actor, p: Point) -> bool {
    let c = actor.position;
    p.x < c.x + ACTOR_HALF_EXTENT
        && p.x > c.x - ACTOR_HALF_EXTENT
        && p.y < c.y + ACTOR_HALF_EXTENT
        && p.y > c.y - ACTOR_HALF_EXTENT
}

/// Index of the first actor in sequence order whose box contains `p`.
#[must_use]
pub fn hit_test(doc: &Document, p: Point) -> Option<usize> {
    doc.actors.iter().position(|actor| hits_actor(actor, p))
}
