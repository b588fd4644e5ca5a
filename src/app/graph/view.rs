use std::time::Duration;

use eframe::egui::{Align2, Color32, CursorIcon, FontId, Sense, Ui, Vec2};
use tracing::{debug, info};

use super::super::ViewModel;
use super::super::render::{draw_background, draw_scene, draw_tooltip, tooltip_text};
use super::super::viewport::ViewportController;
use super::Scene;
use super::input::FrameInput;
use super::interaction::{Effect, Gesture, reduce};

/// Screen pixels kept free between the layout and the canvas edge.
const BOUNDARY_PADDING: f32 = 24.0;

impl ViewModel {
    /// Builds the scene the first time the canvas size is known.
    pub(in crate::app) fn ensure_scene(&mut self, size: Vec2, now: f64) {
        if self.scene.is_some() {
            return;
        }

        self.viewport = ViewportController::new(size);
        let mut scene = Scene::build(&self.graph, self.viewport.center(), &self.settings);
        scene.engine.set_repulsion_strength(self.repulsion);
        self.scene = Some(scene);
        self.viewport.arm_auto_fit(now);
    }

    pub(in crate::app) fn apply_effect(&mut self, effect: Effect, now: f64) {
        match effect {
            Effect::Redraw => self.redraw.request(),
            Effect::Pan(delta) => self.viewport.pan_by(delta),
            Effect::Zoom { anchor, zoom_in } => self.viewport.zoom_at(anchor, zoom_in),
            Effect::Resize(size) => {
                self.viewport.resize(size, now);
                if let Some(scene) = self.scene.as_mut() {
                    scene.engine.set_center(self.viewport.center());
                    scene.engine.reheat(self.settings.resize_temperature);
                }
            }
            Effect::DragStart { node, world } => {
                if let Some(scene) = self.scene.as_mut() {
                    debug!(node = %scene.nodes[node].id, "drag start");
                    scene
                        .engine
                        .begin_drag(node, world, self.settings.drag_temperature);
                }
            }
            Effect::DragMove { world } => {
                if let Some(scene) = self.scene.as_mut() {
                    scene.engine.drag_to(world);
                }
            }
            Effect::DragEnd => {
                if let Some(scene) = self.scene.as_mut() {
                    debug!("drag end");
                    scene.engine.end_drag();
                }
            }
            Effect::TogglePin(node) => {
                if let Some(scene) = self.scene.as_mut() {
                    let pinned = scene.engine.toggle_pin(node);
                    debug!(node = %scene.nodes[node].id, pinned, "pin toggled");
                }
            }
        }
    }

    /// Quiesces the visualization before the model is dropped or replaced.
    pub(in crate::app) fn teardown(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.engine.stop();
        }
        self.interaction = Default::default();
        self.input.reset();
        self.redraw.cancel();
        self.viewport.disarm_auto_fit();
        info!("visualization torn down");
    }

    /// Advances the layout one step if it is running. Returns whether it
    /// moved.
    pub(in crate::app) fn step_layout(&mut self) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };

        let running = self.live_physics || scene.engine.dragged().is_some();
        if !running || !scene.engine.is_active() {
            return false;
        }

        let bounds = self.viewport.padded_world_bounds(BOUNDARY_PADDING);
        scene.engine.tick(Some(bounds));
        true
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let now = ui.input(|input| input.time);
        self.ensure_scene(rect.size(), now);

        let frame = FrameInput::capture(ui, rect, &response);
        for event in self.input.translate(&frame) {
            let Some(scene) = self.scene.as_ref() else {
                break;
            };
            let transition = reduce(
                &self.interaction,
                &event,
                &scene.view(self.viewport.transform()),
            );
            self.interaction = transition.state;
            for effect in transition.effects {
                self.apply_effect(effect, now);
            }
        }

        if self.step_layout() {
            self.redraw.request();
        }

        if let Some(scene) = self.scene.as_ref()
            && self.viewport.poll_auto_fit(now, scene.engine.positions())
        {
            self.redraw.request();
        }

        let painter = ui.painter_at(rect);
        let transform = self.viewport.transform();
        draw_background(&painter, rect, transform);

        let Some(scene) = self.scene.as_ref() else {
            return;
        };

        if scene.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No relationships found in this payload.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
        } else {
            draw_scene(&painter, rect, scene, transform, &self.interaction);
        }

        if let Some((index, anchor)) = self.interaction.tooltip()
            && let Some(node) = scene.nodes.get(index)
        {
            draw_tooltip(
                &painter,
                rect.min + anchor.to_vec2(),
                tooltip_text(&node.id, node.kind, node.degree),
            );
        }

        let cursor = match self.interaction.gesture {
            Gesture::Dragging { .. } | Gesture::Panning { .. } => Some(CursorIcon::Grabbing),
            Gesture::Idle if self.interaction.hovered.is_some() => Some(CursorIcon::PointingHand),
            Gesture::Idle => None,
        };
        if let Some(cursor) = cursor {
            ui.output_mut(|output| output.cursor_icon = cursor);
        }

        self.redraw.flush(ui.ctx());
        if let Some(due_at) = self.viewport.fit_due_at() {
            ui.ctx()
                .request_repaint_after(Duration::from_secs_f64((due_at - now).max(0.0)));
        }
    }
}
