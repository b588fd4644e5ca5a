use eframe::egui::{pos2, vec2};

use crate::chain::{EdgeKind, GraphLimits, build_graph, parse_payload};

use super::ViewModel;
use super::graph::interaction::Effect;
use super::viewport::{AUTO_FIT_DELAY_SECS, Transform};

const PAYLOAD: &str = r#"{
    "address": "0xSeed",
    "transfers": [
        {"from": "0xseed", "to": "0xaaa", "asset": "ETH", "category": "external"},
        {"from": "0xseed", "to": "0xaaa", "asset": "ETH", "category": "external"},
        {"from": "0xbbb", "to": "0xseed", "asset": "USDC", "category": "erc20",
         "rawContract": {"address": "0xusdc"}}
    ],
    "token_metadata": {"0xusdc": {"metadata": {"symbol": "USDC", "name": "USD Coin"}}}
}"#;

fn model() -> ViewModel {
    let payload = parse_payload(PAYLOAD).unwrap();
    let mut model = ViewModel::new(build_graph(&payload, &GraphLimits::default()));
    model.ensure_scene(vec2(800.0, 600.0), 0.0);
    model
}

#[test]
fn scene_is_built_once_with_auto_fit_armed() {
    let mut model = model();
    let scene = model.scene.as_ref().unwrap();

    assert_eq!(scene.nodes.len(), 5);
    assert_eq!(scene.engine.positions()[0], vec2(400.0, 300.0));
    assert_eq!(model.viewport.fit_due_at(), Some(AUTO_FIT_DELAY_SECS));

    model.apply_effect(Effect::DragStart { node: 1, world: vec2(5.0, 5.0) }, 0.0);
    model.ensure_scene(vec2(100.0, 100.0), 3.0);
    let scene = model.scene.as_ref().unwrap();
    assert_eq!(scene.engine.dragged(), Some(1));
}

#[test]
fn resize_recenters_forces_and_reheats() {
    let mut model = model();
    model.viewport.pan_by(vec2(30.0, 30.0));
    model.scene.as_mut().unwrap().engine.set_temperature(0.0);

    model.apply_effect(Effect::Resize(vec2(1000.0, 500.0)), 2.0);

    let engine = &model.scene.as_ref().unwrap().engine;
    assert_eq!(engine.temperature(), 0.5);
    assert_eq!(model.viewport.transform(), Transform::IDENTITY);
    assert_eq!(model.viewport.center(), vec2(500.0, 250.0));
    assert_eq!(model.viewport.fit_due_at(), Some(2.0 + AUTO_FIT_DELAY_SECS));
}

#[test]
fn drag_effects_override_the_layout() {
    let mut model = model();
    model.apply_effect(
        Effect::DragStart {
            node: 1,
            world: vec2(10.0, 10.0),
        },
        0.0,
    );
    model.apply_effect(Effect::DragMove { world: vec2(50.0, 60.0) }, 0.0);
    model.live_physics = false;

    assert!(model.step_layout());
    assert_eq!(
        model.scene.as_ref().unwrap().engine.positions()[1],
        vec2(50.0, 60.0)
    );

    model.apply_effect(Effect::DragEnd, 0.0);
    assert!(!model.step_layout());
}

#[test]
fn paused_layout_does_not_step() {
    let mut model = model();
    model.live_physics = false;
    let before = model.scene.as_ref().unwrap().engine.positions().to_vec();

    assert!(!model.step_layout());
    assert_eq!(model.scene.as_ref().unwrap().engine.positions(), before.as_slice());
}

#[test]
fn pin_effect_toggles_persistent_pin() {
    let mut model = model();
    model.apply_effect(Effect::TogglePin(2), 0.0);
    assert!(model.scene.as_ref().unwrap().engine.is_pinned(2));

    model.release_pins();
    assert_eq!(model.scene.as_ref().unwrap().engine.pinned_count(), 0);
}

#[test]
fn pan_and_zoom_effects_reach_the_viewport() {
    let mut model = model();
    model.apply_effect(Effect::Pan(vec2(12.0, -4.0)), 0.0);
    model.apply_effect(
        Effect::Zoom {
            anchor: pos2(0.0, 0.0),
            zoom_in: true,
        },
        0.0,
    );

    assert!(model.viewport.user_adjusted());
    assert!((model.viewport.transform().scale - 1.1).abs() < 1e-6);
}

#[test]
fn teardown_quiesces_everything() {
    let mut model = model();
    model.interaction.selected = Some(1);
    model.apply_effect(Effect::Redraw, 0.0);

    model.teardown();

    assert!(!model.scene.as_ref().unwrap().engine.is_active());
    assert_eq!(model.interaction.selected, None);
    assert!(!model.redraw.take());
    assert_eq!(model.viewport.fit_due_at(), None);
    assert!(!model.step_layout());
}

#[test]
fn finder_matches_labels_and_ids() {
    let model = model();
    let scene = model.scene.as_ref().unwrap();
    let usdc = scene.node_index("0xusdc").unwrap();

    assert_eq!(model.finder_matches("USDC", 5).first(), Some(&usdc));
    assert_eq!(
        model.finder_matches("0xbbb", 5).first().copied(),
        scene.node_index("0xbbb")
    );
    assert_eq!(
        model.finder_matches("0XAAA", 5).first().copied(),
        scene.node_index("0xaaa")
    );
    assert!(model.finder_matches("   ", 5).is_empty());
    assert!(model.finder_matches("zzzz", 5).is_empty());
}

#[test]
fn selecting_a_node_targets_the_pin_key() {
    let mut model = model();
    model.select_node(3);
    assert_eq!(model.interaction.selected, Some(3));

    model.select_node(99);
    assert_eq!(model.interaction.selected, Some(3));
}

#[test]
fn neighbors_are_listed_by_weight() {
    let model = model();
    let scene = model.scene.as_ref().unwrap();
    let seed = scene.seed_index.unwrap();
    let entries = model.neighbor_entries(seed);

    assert_eq!(
        entries.iter().map(|entry| entry.weight).collect::<Vec<_>>(),
        vec![2, 2, 1, 1]
    );
    assert_eq!(entries[0].index, scene.node_index("0xaaa").unwrap());
    assert_eq!(entries[0].kind, EdgeKind::Transfer);
    assert!(entries[0].outgoing);
    assert!(entries.iter().any(|entry| entry.label == "USDC" && !entry.outgoing));
}

#[test]
fn fit_view_ignores_manual_override() {
    let mut model = model();
    model.viewport.pan_by(vec2(400.0, 0.0));
    model.fit_view();

    assert!(model.redraw.take());
    assert_ne!(model.viewport.transform().translate, vec2(400.0, 0.0));
}

#[test]
fn status_texts_reflect_the_graph() {
    let mut model = model();
    assert_eq!(model.graph_summary_text(), "nodes: 5 | edges: 6");
    assert_eq!(model.sampling_text(), None);
    assert_eq!(model.fps_display_text(), None);

    model.record_frame_time(1.0 / 50.0);
    assert!(model.fps_display_text().unwrap().starts_with("FPS 50"));

    model.graph.sampled = true;
    model.graph.sample_size = 2000;
    model.graph.total_transfers = 3000;
    assert_eq!(
        model.sampling_text().as_deref(),
        Some("sampled 2000 of 3000 transfers")
    );
}
