use eframe::egui::{Vec2, vec2};

use super::quadtree::{Body, QuadTree};

const BARNES_HUT_THETA: f32 = 0.9;
const MIN_DISTANCE_SQ: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum Axis {
    X,
    Y,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Spring {
    pub(in crate::app) source: usize,
    pub(in crate::app) target: usize,
    pub(in crate::app) rest_length: f32,
}

/// Forces understood by [`super::LayoutEngine`].
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum Force {
    /// Pushes every pair of nodes apart, falling off with distance.
    Repulsion { strength: f32 },
    Link { springs: Vec<Spring>, stiffness: f32 },
    /// Pulls the centroid of the layout toward `center`.
    Centering { center: Vec2, strength: f32 },
    Collision { radius: f32, strength: f32 },
    AxisAnchor { axis: Axis, target: f32, strength: f32 },
}

/// Read-only view of the simulation handed to every force.
pub(super) struct ForceInput<'a> {
    pub(super) positions: &'a [Vec2],
    pub(super) velocities: &'a [Vec2],
    /// Indices of nodes with finite positions; others take no part.
    pub(super) active: &'a [usize],
    pub(super) alpha: f32,
}

impl Force {
    pub(super) fn apply(&self, input: &ForceInput<'_>, deltas: &mut [Vec2]) {
        match self {
            Self::Repulsion { strength } => apply_repulsion(input, *strength, deltas),
            Self::Link { springs, stiffness } => apply_links(input, springs, *stiffness, deltas),
            Self::Centering { center, strength } => {
                apply_centering(input, *center, *strength, deltas)
            }
            Self::Collision { radius, strength } => {
                apply_collision(input, *radius, *strength, deltas)
            }
            Self::AxisAnchor {
                axis,
                target,
                strength,
            } => apply_axis_anchor(input, *axis, *target, *strength, deltas),
        }
    }
}

fn fallback_direction(a: usize, b: usize) -> Vec2 {
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * std::f32::consts::TAU;
    let direction = vec2(angle.cos(), angle.sin());
    if a < b { direction } else { -direction }
}

fn repulsion_between(index: usize, other: usize, positions: &[Vec2], strength: f32) -> Vec2 {
    let delta = positions[index] - positions[other];
    let distance_sq = delta.length_sq();
    if distance_sq <= 1e-8 {
        return fallback_direction(index, other) * strength;
    }
    delta * (strength / distance_sq.max(MIN_DISTANCE_SQ))
}

fn apply_repulsion(input: &ForceInput<'_>, strength: f32, deltas: &mut [Vec2]) {
    let Some(tree) = QuadTree::build(input.positions, input.active) else {
        return;
    };

    let scaled = strength * input.alpha;
    for &index in input.active {
        let point = input.positions[index];
        let mut delta = Vec2::ZERO;
        tree.visit_from(index, BARNES_HUT_THETA, &mut |body| match body {
            Body::Node(other) => delta += repulsion_between(index, other, input.positions, scaled),
            Body::Cluster { centroid, weight } => {
                let offset = point - centroid;
                delta += offset * (scaled * weight / offset.length_sq().max(MIN_DISTANCE_SQ));
            }
        });
        deltas[index] += delta;
    }
}

fn apply_links(input: &ForceInput<'_>, springs: &[Spring], stiffness: f32, deltas: &mut [Vec2]) {
    let node_count = input.positions.len();
    let mut link_count = vec![0u32; node_count];
    for spring in springs {
        if spring.source < node_count && spring.target < node_count {
            link_count[spring.source] += 1;
            link_count[spring.target] += 1;
        }
    }

    for spring in springs {
        let (source, target) = (spring.source, spring.target);
        if source >= node_count || target >= node_count || source == target {
            continue;
        }

        let from = input.positions[source] + input.velocities[source];
        let to = input.positions[target] + input.velocities[target];
        if !from.is_finite() || !to.is_finite() {
            continue;
        }

        let mut delta = to - from;
        let mut distance = delta.length();
        if distance <= 1e-4 {
            delta = fallback_direction(source, target) * 1e-3;
            distance = delta.length();
        }

        let stretch = (distance - spring.rest_length) / distance * input.alpha * stiffness;
        let correction = delta * stretch;
        let bias =
            link_count[source] as f32 / (link_count[source] + link_count[target]).max(1) as f32;

        deltas[target] -= correction * bias;
        deltas[source] += correction * (1.0 - bias);
    }
}

fn apply_centering(input: &ForceInput<'_>, center: Vec2, strength: f32, deltas: &mut [Vec2]) {
    if input.active.is_empty() {
        return;
    }

    let mut centroid = Vec2::ZERO;
    for &index in input.active {
        centroid += input.positions[index];
    }
    centroid /= input.active.len() as f32;

    let shift = (center - centroid) * strength;
    for &index in input.active {
        deltas[index] += shift;
    }
}

fn apply_axis_anchor(
    input: &ForceInput<'_>,
    axis: Axis,
    target: f32,
    strength: f32,
    deltas: &mut [Vec2],
) {
    let scaled = strength * input.alpha;
    for &index in input.active {
        let position = input.positions[index];
        match axis {
            Axis::X => deltas[index].x += (target - position.x) * scaled,
            Axis::Y => deltas[index].y += (target - position.y) * scaled,
        }
    }
}

fn collide_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    min_distance: f32,
    strength: f32,
    deltas: &mut [Vec2],
) {
    let delta = positions[from] - positions[to];
    let distance = delta.length();
    if distance >= min_distance {
        return;
    }

    let direction = if distance > 1e-4 {
        delta / distance
    } else {
        fallback_direction(from, to)
    };
    let push = direction * ((min_distance - distance) * 0.5 * strength);
    deltas[from] += push;
    deltas[to] -= push;
}

fn apply_collision(input: &ForceInput<'_>, radius: f32, strength: f32, deltas: &mut [Vec2]) {
    if radius <= 0.0 {
        return;
    }
    let Some(tree) = QuadTree::build(input.positions, input.active) else {
        return;
    };

    let min_distance = radius * 2.0;
    tree.for_each_pair_within(min_distance, &mut |from, to| {
        collide_pair(from, to, input.positions, min_distance, strength, deltas);
    });
}
