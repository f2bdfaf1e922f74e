#![allow(clippy::float_cmp)]

use scene::model::PALETTE;

use super::*;
use crate::input::{Cursor, MoveState, Tool, ToolState};

// =============================================================
// Helpers
// =============================================================

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn synced_core() -> EngineCore {
    let mut core = EngineCore::with_seed(7);
    core.load_snapshot(Document::initial());
    core
}

fn sent(effects: &[Effect]) -> Vec<Action> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Send(action) => Some(action.clone()),
            _ => None,
        })
        .collect()
}

fn snapshot(doc: &Document) -> String {
    serde_json::to_string(doc).unwrap()
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_core_has_empty_replica_and_move_tool() {
    let core = EngineCore::new();
    assert!(core.replica.is_empty());
    assert_eq!(core.tool(), Tool::Move);
    assert!(core.drag_preview().is_none());
}

// =============================================================
// Move tool
// =============================================================

#[test]
fn pointer_down_on_actor_starts_drag_without_sending() {
    let mut core = synced_core();
    let effects = core.on_pointer_down(pt(45.0, 55.0));
    assert!(sent(&effects).is_empty());
    assert_eq!(
        core.ui.tool_state,
        ToolState::Move(MoveState::Drag {
            actor_ix: 0,
            actor_id: ActorId(0),
            origin: pt(45.0, 55.0),
            current: pt(45.0, 55.0),
        })
    );
}

#[test]
fn pointer_down_on_empty_canvas_goes_down() {
    let mut core = synced_core();
    let effects = core.on_pointer_down(pt(500.0, 400.0));
    assert!(sent(&effects).is_empty());
    assert_eq!(core.ui.tool_state, ToolState::Move(MoveState::Down));

    let effects = core.on_pointer_up(pt(500.0, 400.0));
    assert!(sent(&effects).is_empty());
    assert_eq!(core.ui.tool_state, ToolState::Move(MoveState::Up));
}

#[test]
fn drag_moves_preview_but_never_replica() {
    let mut core = synced_core();
    let before = snapshot(&core.replica);

    core.on_pointer_down(pt(40.0, 50.0));
    for step in 1..=10 {
        let f = f64::from(step);
        let effects = core.on_pointer_move(pt(40.0 + f * 10.0, 50.0 + f * 5.0));
        assert!(effects.contains(&Effect::RenderNeeded));
        assert!(sent(&effects).is_empty());
        assert_eq!(snapshot(&core.replica), before);
    }

    let preview = core.drag_preview().unwrap();
    assert_eq!(preview.actor_ix, 0);
    assert_eq!(preview.position, pt(140.0, 100.0));
    assert_eq!(core.replica.actors[0].position, pt(40.0, 50.0));
}

#[test]
fn pointer_up_sends_guarded_set_pos_and_returns_to_up() {
    let mut core = synced_core();
    core.on_pointer_down(pt(100.0, 100.0));
    core.on_pointer_move(pt(130.0, 90.0));
    let effects = core.on_pointer_up(pt(130.0, 90.0));

    assert_eq!(
        sent(&effects),
        vec![Action::SetPos { actor_ix: 1, p: pt(130.0, 90.0), actor_id: Some(ActorId(1)) }]
    );
    assert_eq!(core.ui.tool_state, ToolState::Move(MoveState::Up));
    assert!(core.drag_preview().is_none());
}

#[test]
fn drop_offset_is_relative_to_grab_point() {
    let mut core = synced_core();
    // Grab the red actor off-center.
    core.on_pointer_down(pt(30.0, 60.0));
    core.on_pointer_move(pt(50.0, 80.0));
    let actions = sent(&core.on_pointer_up(pt(50.0, 80.0)));
    let [Action::SetPos { p, .. }] = actions.as_slice() else {
        panic!("expected a single setPos");
    };
    assert_eq!(*p, pt(60.0, 70.0));
}

#[test]
fn drop_lands_on_last_preview_not_release_point() {
    let mut core = synced_core();
    core.on_pointer_down(pt(40.0, 50.0));
    core.on_pointer_move(pt(140.0, 100.0));
    let preview = core.drag_preview().unwrap().position;

    let actions = sent(&core.on_pointer_up(pt(41.0, 51.0)));
    let [Action::SetPos { p, .. }] = actions.as_slice() else {
        panic!("expected a single setPos");
    };
    assert_eq!(*p, preview);
    assert_eq!(*p, pt(140.0, 100.0));
}

#[test]
fn release_without_move_drops_in_place() {
    let mut core = synced_core();
    core.on_pointer_down(pt(40.0, 50.0));
    let actions = sent(&core.on_pointer_up(pt(55.0, 65.0)));
    assert_eq!(actions, vec![Action::SetPos { actor_ix: 0, p: pt(40.0, 50.0), actor_id: Some(ActorId(0)) }]);
}

#[test]
fn replica_snaps_back_until_echo_arrives() {
    let mut core = synced_core();
    core.on_pointer_down(pt(40.0, 50.0));
    core.on_pointer_move(pt(240.0, 250.0));
    let effects = core.on_pointer_up(pt(240.0, 250.0));

    // Preview discarded, replica still shows the pre-drag position.
    assert!(core.drag_preview().is_none());
    assert_eq!(core.replica.actors[0].position, pt(40.0, 50.0));

    let echo = sent(&effects).remove(0);
    core.apply_server_action(&echo).unwrap();
    assert_eq!(core.replica.actors[0].position, pt(240.0, 250.0));
}

#[test]
fn tool_switch_discards_drag_without_sending() {
    let mut core = synced_core();
    core.on_pointer_down(pt(40.0, 50.0));
    core.on_pointer_move(pt(90.0, 90.0));

    let effects = core.set_tool(Tool::Speech);
    assert!(sent(&effects).is_empty());
    let effects = core.set_tool(Tool::Move);
    assert!(sent(&effects).is_empty());
    assert_eq!(core.ui.tool_state, ToolState::Move(MoveState::Up));

    let effects = core.on_pointer_up(pt(90.0, 90.0));
    assert!(sent(&effects).is_empty());
}

#[test]
fn inbound_delete_of_earlier_actor_reindexes_drag() {
    let mut core = synced_core();
    core.on_pointer_down(pt(100.0, 100.0));
    core.apply_server_action(&Action::DeleteActor { actor_ix: 0, actor_id: None }).unwrap();

    let preview = core.drag_preview().unwrap();
    assert_eq!(preview.actor_ix, 0);
    assert_eq!(preview.actor_id, ActorId(1));

    let effects = core.on_pointer_up(pt(110.0, 100.0));
    assert_eq!(
        sent(&effects),
        vec![Action::SetPos { actor_ix: 0, p: pt(110.0, 100.0), actor_id: Some(ActorId(1)) }]
    );
}

#[test]
fn inbound_delete_of_dragged_actor_cancels_drag() {
    let mut core = synced_core();
    core.on_pointer_down(pt(40.0, 50.0));
    core.apply_server_action(&Action::DeleteActor { actor_ix: 0, actor_id: None }).unwrap();

    assert_eq!(core.ui.tool_state, ToolState::Move(MoveState::Up));
    assert!(sent(&core.on_pointer_up(pt(60.0, 60.0))).is_empty());
}

#[test]
fn snapshot_resets_drag() {
    let mut core = synced_core();
    core.on_pointer_down(pt(40.0, 50.0));
    core.load_snapshot(Document::initial());
    assert_eq!(core.ui.tool_state, ToolState::Move(MoveState::Up));
}

// =============================================================
// Speech / add / delete / bg tools
// =============================================================

#[test]
fn speech_click_sends_current_input_without_local_change() {
    let mut core = synced_core();
    core.set_tool(Tool::Speech);
    core.set_speech_input("hello world");

    let effects = core.on_pointer_down(pt(100.0, 100.0));
    assert_eq!(
        sent(&effects),
        vec![Action::SetSpeech { actor_ix: 1, msg: "hello world".into(), actor_id: Some(ActorId(1)) }]
    );
    assert_eq!(core.replica.actors[1].message, "");
    assert!(sent(&core.on_pointer_up(pt(100.0, 100.0))).is_empty());
}

#[test]
fn speech_click_on_empty_canvas_sends_nothing() {
    let mut core = synced_core();
    core.set_tool(Tool::Speech);
    assert!(core.on_pointer_down(pt(600.0, 10.0)).is_empty());
}

#[test]
fn add_sends_palette_color_at_pointer() {
    let mut core = synced_core();
    core.set_tool(Tool::Add);
    for _ in 0..20 {
        let actions = sent(&core.on_pointer_down(pt(300.0, 200.0)));
        let [Action::AddActor { p, color }] = actions.as_slice() else {
            panic!("expected a single addActor");
        };
        assert_eq!(*p, pt(300.0, 200.0));
        assert!(PALETTE.contains(&color.as_str()), "unexpected color {color}");
    }
    assert_eq!(core.replica.len(), 2);
}

#[test]
fn add_over_existing_actor_still_adds() {
    let mut core = synced_core();
    core.set_tool(Tool::Add);
    let actions = sent(&core.on_pointer_down(pt(40.0, 50.0)));
    let [Action::AddActor { p, .. }] = actions.as_slice() else {
        panic!("expected a single addActor");
    };
    assert_eq!(*p, pt(40.0, 50.0));
}

#[test]
fn seeded_engines_pick_the_same_colors() {
    let mut a = EngineCore::with_seed(42);
    let mut b = EngineCore::with_seed(42);
    a.set_tool(Tool::Add);
    b.set_tool(Tool::Add);
    for _ in 0..5 {
        assert_eq!(a.on_pointer_down(pt(1.0, 1.0)), b.on_pointer_down(pt(1.0, 1.0)));
    }
}

#[test]
fn delete_click_sends_guarded_delete() {
    let mut core = synced_core();
    core.set_tool(Tool::Delete);
    let effects = core.on_pointer_down(pt(40.0, 50.0));
    assert_eq!(sent(&effects), vec![Action::DeleteActor { actor_ix: 0, actor_id: Some(ActorId(0)) }]);
    assert!(core.on_pointer_down(pt(400.0, 400.0)).is_empty());
}

#[test]
fn background_panel_sends_listed_backgrounds_only() {
    let mut core = synced_core();
    assert!(core.select_background(1).is_empty(), "panel hidden unless bg tool active");

    core.set_tool(Tool::Bg);
    assert_eq!(sent(&core.select_background(3)), vec![Action::SetBackground { bg: 3 }]);
    assert!(core.select_background(4).is_empty());
    assert!(core.on_pointer_down(pt(40.0, 50.0)).is_empty());
}

// =============================================================
// Cursor
// =============================================================

#[test]
fn hover_over_actor_sets_pointer_cursor_once() {
    let mut core = synced_core();
    let effects = core.on_pointer_move(pt(40.0, 50.0));
    assert_eq!(effects, vec![Effect::SetCursor(Cursor::Pointer)]);
    assert!(core.on_pointer_move(pt(41.0, 50.0)).is_empty());
    assert_eq!(core.on_pointer_move(pt(400.0, 400.0)), vec![Effect::SetCursor(Cursor::Default)]);
}

// =============================================================
// Replica
// =============================================================

#[test]
fn rejected_broadcast_leaves_replica_unchanged() {
    let mut core = synced_core();
    let before = core.replica.clone();
    let err = core.apply_server_action(&Action::SetSpeech { actor_ix: 99, msg: "x".into(), actor_id: None });
    assert!(err.is_err());
    assert_eq!(core.replica, before);
}
