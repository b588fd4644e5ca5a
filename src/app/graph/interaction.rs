use eframe::egui::{Context, Pos2, Vec2};

use crate::chain::NodeKind;

use super::super::viewport::Transform;

/// Pointer, wheel, key and size changes in canvas-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum InputEvent {
    PointerMoved(Pos2),
    PointerPressed(Pos2),
    PointerReleased(Pos2),
    PointerLeft,
    Wheel { position: Pos2, zoom_in: bool },
    TogglePin,
    Resized(Vec2),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum Effect {
    Redraw,
    DragStart { node: usize, world: Vec2 },
    DragMove { world: Vec2 },
    DragEnd,
    Pan(Vec2),
    Zoom { anchor: Pos2, zoom_in: bool },
    TogglePin(usize),
    Resize(Vec2),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(in crate::app) enum Gesture {
    #[default]
    Idle,
    /// `offset` keeps the grab point under the pointer.
    Dragging { node: usize, offset: Vec2 },
    Panning { last: Pos2 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(in crate::app) struct InteractionState {
    pub(in crate::app) hovered: Option<usize>,
    pub(in crate::app) selected: Option<usize>,
    pub(in crate::app) gesture: Gesture,
    pub(in crate::app) pointer: Option<Pos2>,
}

impl InteractionState {
    /// Node and screen anchor for the hover tooltip.
    pub(in crate::app) fn tooltip(&self) -> Option<(usize, Pos2)> {
        if matches!(self.gesture, Gesture::Panning { .. }) {
            return None;
        }
        Some((self.hovered?, self.pointer?))
    }
}

/// What the reducer needs to know about the scene for hit testing.
pub(in crate::app) struct SceneView<'a> {
    pub(in crate::app) transform: Transform,
    pub(in crate::app) positions: &'a [Vec2],
    pub(in crate::app) hit_radii: &'a [f32],
}

impl SceneView<'_> {
    /// Topmost node under `screen`. Later nodes are drawn on top, so they
    /// win.
    pub(in crate::app) fn hit_test(&self, screen: Pos2) -> Option<usize> {
        let world = self.transform.screen_to_world(screen);
        (0..self.positions.len()).rev().find(|&index| {
            let position = self.positions[index];
            let radius = self.hit_radii.get(index).copied().unwrap_or(0.0);
            position.is_finite() && (position - world).length_sq() <= radius * radius
        })
    }
}

/// Pick radius in world units.
pub(in crate::app) fn hit_radius(kind: NodeKind, is_seed: bool) -> f32 {
    if is_seed {
        return 10.0;
    }
    match kind {
        NodeKind::Token | NodeKind::Coin => 8.0,
        NodeKind::Address | NodeKind::Contract => 6.0,
    }
}

#[derive(Debug, PartialEq)]
pub(in crate::app) struct Transition {
    pub(in crate::app) state: InteractionState,
    pub(in crate::app) effects: Vec<Effect>,
}

pub(in crate::app) fn reduce(
    state: &InteractionState,
    event: &InputEvent,
    scene: &SceneView<'_>,
) -> Transition {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match *event {
        InputEvent::PointerMoved(position) => {
            next.pointer = Some(position);
            match state.gesture {
                Gesture::Dragging { offset, .. } => {
                    effects.push(Effect::DragMove {
                        world: scene.transform.screen_to_world(position) + offset,
                    });
                    effects.push(Effect::Redraw);
                }
                Gesture::Panning { last } => {
                    effects.push(Effect::Pan(position - last));
                    effects.push(Effect::Redraw);
                    next.gesture = Gesture::Panning { last: position };
                }
                Gesture::Idle => {
                    next.hovered = scene.hit_test(position);
                    if next.hovered != state.hovered || next.hovered.is_some() {
                        effects.push(Effect::Redraw);
                    }
                }
            }
        }
        InputEvent::PointerPressed(position) => {
            next.pointer = Some(position);
            if state.gesture == Gesture::Idle {
                match scene.hit_test(position) {
                    Some(node) => {
                        let world = scene.positions[node];
                        next.selected = Some(node);
                        next.hovered = Some(node);
                        next.gesture = Gesture::Dragging {
                            node,
                            offset: world - scene.transform.screen_to_world(position),
                        };
                        effects.push(Effect::DragStart { node, world });
                        effects.push(Effect::Redraw);
                    }
                    None => {
                        next.gesture = Gesture::Panning { last: position };
                    }
                }
            }
        }
        InputEvent::PointerReleased(position) => {
            next.pointer = Some(position);
            if let Gesture::Dragging { .. } = state.gesture {
                effects.push(Effect::DragEnd);
                effects.push(Effect::Redraw);
            }
            next.gesture = Gesture::Idle;
            next.hovered = scene.hit_test(position);
        }
        InputEvent::PointerLeft => {
            if let Gesture::Dragging { .. } = state.gesture {
                effects.push(Effect::DragEnd);
            }
            if state.hovered.is_some() || state.gesture != Gesture::Idle {
                effects.push(Effect::Redraw);
            }
            next.pointer = None;
            next.hovered = None;
            next.gesture = Gesture::Idle;
        }
        InputEvent::Wheel { position, zoom_in } => {
            next.pointer = Some(position);
            effects.push(Effect::Zoom {
                anchor: position,
                zoom_in,
            });
            effects.push(Effect::Redraw);
        }
        InputEvent::TogglePin => {
            if let Some(node) = state.selected {
                effects.push(Effect::TogglePin(node));
                effects.push(Effect::Redraw);
            }
        }
        InputEvent::Resized(size) => {
            effects.push(Effect::Resize(size));
            effects.push(Effect::Redraw);
        }
    }

    Transition {
        state: next,
        effects,
    }
}

/// Collapses any number of redraw requests within a frame into one repaint.
#[derive(Debug, Default)]
pub(in crate::app) struct RedrawScheduler {
    pending: bool,
}

impl RedrawScheduler {
    pub(in crate::app) fn request(&mut self) {
        self.pending = true;
    }

    pub(in crate::app) fn cancel(&mut self) {
        self.pending = false;
    }

    pub(in crate::app) fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub(in crate::app) fn flush(&mut self, ctx: &Context) {
        if self.take() {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
#[path = "tests/interaction_tests.rs"]
mod tests;
