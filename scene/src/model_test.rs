#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn initial_scene_has_two_actors_on_background_zero() {
    let doc = Document::initial();
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.background, 0);
    assert_eq!(doc.actors[0].color, "red");
    assert_eq!(doc.actors[0].position, Point::new(40.0, 50.0));
    assert_eq!(doc.actors[1].color, "blue");
    assert_eq!(doc.actors[1].position, Point::new(100.0, 100.0));
    assert!(doc.actors.iter().all(|a| a.message.is_empty()));
}

#[test]
fn initial_scene_ids_are_distinct_and_below_next_id() {
    let doc = Document::initial();
    assert_ne!(doc.actors[0].id, doc.actors[1].id);
    assert!(doc.actors.iter().all(|a| a.id.0 < doc.next_id));
}

#[test]
fn default_is_initial() {
    assert_eq!(Document::default(), Document::initial());
}

#[test]
fn index_of_finds_actor_by_id() {
    let doc = Document::initial();
    assert_eq!(doc.index_of(ActorId(1)), Some(1));
    assert_eq!(doc.index_of(ActorId(99)), None);
}

#[test]
fn actor_out_of_range_is_none() {
    let doc = Document::initial();
    assert!(doc.actor(2).is_none());
}

#[test]
fn point_sub_yields_delta() {
    let (dx, dy) = Point::new(15.0, 7.0) - Point::new(10.0, 10.0);
    assert_eq!(dx, 5.0);
    assert_eq!(dy, -3.0);
}

#[test]
fn point_offset_translates() {
    assert_eq!(Point::new(1.0, 2.0).offset(3.0, -4.0), Point::new(4.0, -2.0));
}

#[test]
fn actor_uses_short_wire_field_names() {
    let json = serde_json::to_value(&Document::initial().actors[0]).unwrap();
    assert_eq!(json["p"]["x"], 40.0);
    assert_eq!(json["msg"], "");
    assert_eq!(json["color"], "red");
    assert_eq!(json["id"], 0);
}

#[test]
fn document_serializes_without_tool_state() {
    let json = serde_json::to_value(Document::initial()).unwrap();
    assert!(json.get("toolState").is_none());
    assert_eq!(json["nextId"], 2);
    assert_eq!(json["background"], 0);
}

#[test]
fn actor_id_displays_with_hash() {
    assert_eq!(ActorId(7).to_string(), "#7");
}
