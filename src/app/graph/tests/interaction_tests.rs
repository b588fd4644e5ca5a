use eframe::egui::{Pos2, Vec2, pos2, vec2};

use crate::chain::NodeKind;

use super::super::super::viewport::Transform;
use super::{
    Effect, Gesture, InputEvent, InteractionState, RedrawScheduler, SceneView, hit_radius, reduce,
};

struct Fixture {
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    transform: Transform,
}

impl Fixture {
    fn new() -> Self {
        Self {
            positions: vec![vec2(100.0, 100.0), vec2(200.0, 100.0), vec2(204.0, 100.0)],
            radii: vec![
                hit_radius(NodeKind::Address, true),
                hit_radius(NodeKind::Address, false),
                hit_radius(NodeKind::Token, false),
            ],
            transform: Transform::IDENTITY,
        }
    }

    fn view(&self) -> SceneView<'_> {
        SceneView {
            transform: self.transform,
            positions: &self.positions,
            hit_radii: &self.radii,
        }
    }
}

fn run(fixture: &Fixture, events: &[InputEvent]) -> (InteractionState, Vec<Effect>) {
    let mut state = InteractionState::default();
    let mut effects = Vec::new();
    for event in events {
        let transition = reduce(&state, event, &fixture.view());
        state = transition.state;
        effects.extend(transition.effects);
    }
    (state, effects)
}

#[test]
fn hit_radius_depends_on_kind() {
    assert_eq!(hit_radius(NodeKind::Contract, true), 10.0);
    assert_eq!(hit_radius(NodeKind::Coin, false), 8.0);
    assert_eq!(hit_radius(NodeKind::Token, false), 8.0);
    assert_eq!(hit_radius(NodeKind::Contract, false), 6.0);
}

#[test]
fn hit_test_prefers_later_nodes() {
    let fixture = Fixture::new();
    assert_eq!(fixture.view().hit_test(pos2(202.0, 100.0)), Some(2));
    assert_eq!(fixture.view().hit_test(pos2(195.0, 100.0)), Some(1));
    assert_eq!(fixture.view().hit_test(pos2(109.0, 100.0)), Some(0));
    assert_eq!(fixture.view().hit_test(pos2(150.0, 150.0)), None);
}

#[test]
fn hit_test_uses_inverse_transform() {
    let mut fixture = Fixture::new();
    fixture.transform = Transform {
        scale: 2.0,
        translate: vec2(10.0, 0.0),
    };

    assert_eq!(fixture.view().hit_test(pos2(210.0, 200.0)), Some(0));
    assert_eq!(fixture.view().hit_test(pos2(100.0, 100.0)), None);
}

#[test]
fn hit_test_skips_non_finite_nodes() {
    let mut fixture = Fixture::new();
    fixture.positions[2] = vec2(f32::NAN, 100.0);
    assert_eq!(fixture.view().hit_test(pos2(204.0, 100.0)), Some(1));
}

#[test]
fn hovering_a_node_requests_redraw() {
    let fixture = Fixture::new();
    let (state, effects) = run(&fixture, &[InputEvent::PointerMoved(pos2(101.0, 99.0))]);

    assert_eq!(state.hovered, Some(0));
    assert_eq!(state.tooltip(), Some((0, pos2(101.0, 99.0))));
    assert_eq!(effects, vec![Effect::Redraw]);
}

#[test]
fn moving_over_empty_space_is_quiet() {
    let fixture = Fixture::new();
    let (state, effects) = run(
        &fixture,
        &[
            InputEvent::PointerMoved(pos2(20.0, 20.0)),
            InputEvent::PointerMoved(pos2(30.0, 20.0)),
        ],
    );

    assert_eq!(state.hovered, None);
    assert!(effects.is_empty());
}

#[test]
fn leaving_a_node_clears_hover() {
    let fixture = Fixture::new();
    let (state, effects) = run(
        &fixture,
        &[
            InputEvent::PointerMoved(pos2(100.0, 100.0)),
            InputEvent::PointerMoved(pos2(20.0, 20.0)),
        ],
    );

    assert_eq!(state.hovered, None);
    assert_eq!(state.tooltip(), None);
    assert_eq!(effects, vec![Effect::Redraw, Effect::Redraw]);
}

#[test]
fn dragging_a_node_keeps_grab_offset() {
    let fixture = Fixture::new();
    let (state, effects) = run(
        &fixture,
        &[
            InputEvent::PointerPressed(pos2(103.0, 100.0)),
            InputEvent::PointerMoved(pos2(153.0, 120.0)),
            InputEvent::PointerReleased(pos2(153.0, 120.0)),
        ],
    );

    assert_eq!(
        effects,
        vec![
            Effect::DragStart {
                node: 0,
                world: vec2(100.0, 100.0),
            },
            Effect::Redraw,
            Effect::DragMove {
                world: vec2(150.0, 120.0),
            },
            Effect::Redraw,
            Effect::DragEnd,
            Effect::Redraw,
        ]
    );
    assert_eq!(state.gesture, Gesture::Idle);
    assert_eq!(state.selected, Some(0));
}

#[test]
fn pressing_empty_space_pans() {
    let fixture = Fixture::new();
    let (state, effects) = run(
        &fixture,
        &[
            InputEvent::PointerPressed(pos2(10.0, 10.0)),
            InputEvent::PointerMoved(pos2(25.0, 5.0)),
            InputEvent::PointerMoved(pos2(30.0, 5.0)),
        ],
    );

    assert_eq!(
        effects,
        vec![
            Effect::Pan(vec2(15.0, -5.0)),
            Effect::Redraw,
            Effect::Pan(vec2(5.0, 0.0)),
            Effect::Redraw,
        ]
    );
    assert_eq!(
        state.gesture,
        Gesture::Panning {
            last: pos2(30.0, 5.0)
        }
    );
    assert_eq!(state.tooltip(), None);
}

#[test]
fn pressing_empty_space_keeps_selection() {
    let fixture = Fixture::new();
    let (state, _) = run(
        &fixture,
        &[
            InputEvent::PointerPressed(pos2(200.0, 100.0)),
            InputEvent::PointerReleased(pos2(200.0, 100.0)),
            InputEvent::PointerPressed(pos2(10.0, 10.0)),
            InputEvent::PointerReleased(pos2(10.0, 10.0)),
        ],
    );

    assert_eq!(state.selected, Some(1));
}

#[test]
fn pin_key_targets_last_hit_node() {
    let fixture = Fixture::new();
    let (_, effects) = run(&fixture, &[InputEvent::TogglePin]);
    assert!(effects.is_empty());

    let (_, effects) = run(
        &fixture,
        &[
            InputEvent::PointerPressed(pos2(204.0, 100.0)),
            InputEvent::PointerReleased(pos2(204.0, 100.0)),
            InputEvent::TogglePin,
        ],
    );
    assert_eq!(&effects[effects.len() - 2..], &[Effect::TogglePin(2), Effect::Redraw]);
}

#[test]
fn wheel_zooms_at_pointer() {
    let fixture = Fixture::new();
    let (_, effects) = run(
        &fixture,
        &[InputEvent::Wheel {
            position: pos2(40.0, 60.0),
            zoom_in: false,
        }],
    );

    assert_eq!(
        effects,
        vec![
            Effect::Zoom {
                anchor: pos2(40.0, 60.0),
                zoom_in: false,
            },
            Effect::Redraw,
        ]
    );
}

#[test]
fn pointer_leaving_mid_drag_ends_drag() {
    let fixture = Fixture::new();
    let (state, effects) = run(
        &fixture,
        &[
            InputEvent::PointerPressed(pos2(100.0, 100.0)),
            InputEvent::PointerLeft,
        ],
    );

    assert!(effects.contains(&Effect::DragEnd));
    assert_eq!(state.gesture, Gesture::Idle);
    assert_eq!(state.pointer, None);
    assert_eq!(state.hovered, None);
}

#[test]
fn resize_is_forwarded() {
    let fixture = Fixture::new();
    let (_, effects) = run(&fixture, &[InputEvent::Resized(vec2(640.0, 480.0))]);
    assert_eq!(
        effects,
        vec![Effect::Resize(vec2(640.0, 480.0)), Effect::Redraw]
    );
}

#[test]
fn reducer_does_not_touch_input_state() {
    let fixture = Fixture::new();
    let state = InteractionState {
        pointer: Some(Pos2::ZERO),
        ..InteractionState::default()
    };
    let before = state.clone();

    let _ = reduce(&state, &InputEvent::PointerPressed(pos2(100.0, 100.0)), &fixture.view());
    assert_eq!(state, before);
}

#[test]
fn redraw_requests_coalesce() {
    let mut scheduler = RedrawScheduler::default();
    scheduler.request();
    scheduler.request();
    scheduler.request();

    assert!(scheduler.take());
    assert!(!scheduler.take());

    scheduler.request();
    scheduler.cancel();
    assert!(!scheduler.take());
}
