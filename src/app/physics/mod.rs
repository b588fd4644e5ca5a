mod forces;
mod quadtree;

use eframe::egui::{Rect, Vec2};

use forces::ForceInput;
pub(in crate::app) use forces::{Axis, Force, Spring};

/// Tuning for the force simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct LayoutSettings {
    pub(in crate::app) repulsion_strength: f32,
    pub(in crate::app) link_stiffness: f32,
    pub(in crate::app) short_link_length: f32,
    pub(in crate::app) long_link_length: f32,
    pub(in crate::app) center_strength: f32,
    pub(in crate::app) axis_strength: f32,
    pub(in crate::app) collision_radius: f32,
    pub(in crate::app) collision_strength: f32,
    pub(in crate::app) alpha_decay: f32,
    pub(in crate::app) alpha_min: f32,
    pub(in crate::app) velocity_decay: f32,
    pub(in crate::app) drag_temperature: f32,
    pub(in crate::app) resize_temperature: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            repulsion_strength: 140.0,
            link_stiffness: 0.55,
            short_link_length: 60.0,
            long_link_length: 90.0,
            center_strength: 0.03,
            axis_strength: 0.04,
            collision_radius: 14.0,
            collision_strength: 0.7,
            // settles in roughly 300 ticks
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_min,
            velocity_decay: 0.4,
            drag_temperature: 0.3,
            resize_temperature: 0.5,
        }
    }
}

struct PhysicsScratch {
    deltas: Vec<Vec2>,
    active: Vec<usize>,
}

/// Iterative force solver. Owns node positions; everything else reads them
/// between ticks.
pub(in crate::app) struct LayoutEngine {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    pins: Vec<Option<Vec2>>,
    drag: Option<(usize, Vec2)>,
    forces: Vec<Force>,
    temperature: f32,
    temperature_target: f32,
    alpha_decay: f32,
    alpha_min: f32,
    velocity_decay: f32,
    stopped: bool,
    scratch: PhysicsScratch,
}

impl LayoutEngine {
    pub(in crate::app) fn new(positions: Vec<Vec2>, settings: &LayoutSettings) -> Self {
        let node_count = positions.len();
        Self {
            positions,
            velocities: vec![Vec2::ZERO; node_count],
            pins: vec![None; node_count],
            drag: None,
            forces: Vec::new(),
            temperature: 1.0,
            temperature_target: 0.0,
            alpha_decay: settings.alpha_decay,
            alpha_min: settings.alpha_min,
            velocity_decay: settings.velocity_decay,
            stopped: false,
            scratch: PhysicsScratch {
                deltas: Vec::with_capacity(node_count),
                active: Vec::with_capacity(node_count),
            },
        }
    }

    pub(in crate::app) fn add_force(&mut self, force: Force) {
        self.forces.push(force);
    }

    #[cfg(test)]
    pub(in crate::app) fn forces(&self) -> &[Force] {
        &self.forces
    }

    pub(in crate::app) fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub(in crate::app) fn temperature(&self) -> f32 {
        self.temperature
    }

    pub(in crate::app) fn set_temperature(&mut self, temperature: f32) {
        self.temperature = temperature.clamp(0.0, 1.0);
    }

    /// Raises the temperature to at least `temperature`; never cools.
    pub(in crate::app) fn reheat(&mut self, temperature: f32) {
        self.set_temperature(self.temperature.max(temperature));
    }

    pub(in crate::app) fn set_temperature_target(&mut self, target: f32) {
        self.temperature_target = target.clamp(0.0, 1.0);
    }

    pub(in crate::app) fn stop(&mut self) {
        self.stopped = true;
        self.drag = None;
    }

    /// Whether another tick would still move anything.
    pub(in crate::app) fn is_active(&self) -> bool {
        !self.stopped && (self.temperature >= self.alpha_min || self.temperature_target > 0.0)
    }

    pub(in crate::app) fn set_repulsion_strength(&mut self, value: f32) {
        for force in &mut self.forces {
            if let Force::Repulsion { strength } = force {
                *strength = value;
            }
        }
    }

    /// Moves the centering and per-axis anchors to `center`.
    pub(in crate::app) fn set_center(&mut self, center: Vec2) {
        for force in &mut self.forces {
            match force {
                Force::Centering { center: current, .. } => *current = center,
                Force::AxisAnchor {
                    axis: Axis::X,
                    target,
                    ..
                } => *target = center.x,
                Force::AxisAnchor {
                    axis: Axis::Y,
                    target,
                    ..
                } => *target = center.y,
                _ => {}
            }
        }
    }

    pub(in crate::app) fn pin(&self, index: usize) -> Option<Vec2> {
        match self.drag {
            Some((dragged, position)) if dragged == index => Some(position),
            _ => self.pins.get(index).copied().flatten(),
        }
    }

    pub(in crate::app) fn is_pinned(&self, index: usize) -> bool {
        self.pins.get(index).is_some_and(Option::is_some)
    }

    pub(in crate::app) fn pinned_count(&self) -> usize {
        self.pins.iter().filter(|pin| pin.is_some()).count()
    }

    /// Fixes or frees a node at its current position. Returns whether the node
    /// is pinned afterwards.
    pub(in crate::app) fn toggle_pin(&mut self, index: usize) -> bool {
        let Some(current) = self.positions.get(index).copied() else {
            return false;
        };

        let pin = &mut self.pins[index];
        *pin = match *pin {
            Some(_) => None,
            None if current.is_finite() => Some(current),
            None => None,
        };
        pin.is_some()
    }

    pub(in crate::app) fn clear_pins(&mut self) {
        self.pins.fill(None);
    }

    pub(in crate::app) fn dragged(&self) -> Option<usize> {
        self.drag.map(|(index, _)| index)
    }

    pub(in crate::app) fn begin_drag(&mut self, index: usize, world: Vec2, temperature: f32) {
        if index >= self.positions.len() || self.stopped {
            return;
        }

        self.drag = Some((index, world));
        self.set_temperature_target(temperature);
        self.reheat(temperature);
    }

    pub(in crate::app) fn drag_to(&mut self, world: Vec2) {
        if let Some((_, position)) = self.drag.as_mut() {
            *position = world;
        }
    }

    /// Releases the live override; a persistent pin on the node follows it to
    /// the drop position.
    pub(in crate::app) fn end_drag(&mut self) {
        if let Some((index, position)) = self.drag.take()
            && let Some(pin) = self.pins.get_mut(index)
            && pin.is_some()
        {
            *pin = Some(position);
        }
        self.set_temperature_target(0.0);
    }

    /// Advances the simulation by one step and clamps finite positions into
    /// `bounds`. Returns whether the engine is still active.
    pub(in crate::app) fn tick(&mut self, bounds: Option<Rect>) -> bool {
        if self.stopped {
            return false;
        }

        self.temperature += (self.temperature_target - self.temperature) * self.alpha_decay;
        let alpha = self.temperature;

        let node_count = self.positions.len();
        let scratch = &mut self.scratch;
        scratch.deltas.clear();
        scratch.deltas.resize(node_count, Vec2::ZERO);
        scratch.active.clear();
        scratch.active.extend(
            self.positions
                .iter()
                .enumerate()
                .filter(|(_, position)| position.is_finite())
                .map(|(index, _)| index),
        );

        let input = ForceInput {
            positions: &self.positions,
            velocities: &self.velocities,
            active: &scratch.active,
            alpha,
        };
        for force in &self.forces {
            force.apply(&input, &mut scratch.deltas);
        }

        let retain = 1.0 - self.velocity_decay;
        for index in 0..node_count {
            let pinned = match self.drag {
                Some((dragged, position)) if dragged == index => Some(position),
                _ => self.pins[index],
            };

            if let Some(position) = pinned {
                self.positions[index] = position;
                self.velocities[index] = Vec2::ZERO;
                continue;
            }

            let velocity = (self.velocities[index] + scratch.deltas[index]) * retain;
            self.velocities[index] = velocity;
            self.positions[index] += velocity;
        }

        if let Some(bounds) = bounds {
            clamp_into(&mut self.positions, bounds);
        }

        self.is_active()
    }
}

/// Clamps every finite position into `bounds`; degenerate bounds collapse to
/// their center on the affected axis.
fn clamp_into(positions: &mut [Vec2], bounds: Rect) {
    let center = bounds.center();
    let (min_x, max_x) = if bounds.min.x <= bounds.max.x {
        (bounds.min.x, bounds.max.x)
    } else {
        (center.x, center.x)
    };
    let (min_y, max_y) = if bounds.min.y <= bounds.max.y {
        (bounds.min.y, bounds.max.y)
    } else {
        (center.y, center.y)
    };

    for position in positions.iter_mut() {
        if !position.is_finite() {
            continue;
        }
        position.x = position.x.max(min_x).min(max_x);
        position.y = position.y.max(min_y).min(max_y);
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
