use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::chain::{ChainGraph, EdgeKind};
use crate::util::stable_pair;

use super::super::physics::{Axis, Force, LayoutEngine, LayoutSettings, Spring};
use super::interaction::hit_radius;
use super::{Scene, SceneEdge, SceneNode};

const RING_RADIUS: f32 = 160.0;

impl Scene {
    /// Lays the graph out around `center`: the seed at the midpoint, every
    /// other node on a jittered ring.
    pub(in crate::app) fn build(
        graph: &ChainGraph,
        center: Vec2,
        settings: &LayoutSettings,
    ) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .map(|node| SceneNode {
                id: node.id.clone(),
                label: node.label.clone(),
                kind: node.kind,
                degree: node.degree,
                is_seed: node.is_seed,
            })
            .collect::<Vec<_>>();

        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();

        let edges = graph
            .links
            .iter()
            .filter_map(|link| {
                let source = *index_by_id.get(&link.source)?;
                let target = *index_by_id.get(&link.target)?;
                Some(SceneEdge {
                    source,
                    target,
                    kind: link.kind,
                    weight: link.weight,
                })
            })
            .collect::<Vec<_>>();

        let mut incident = vec![Vec::new(); nodes.len()];
        for (edge_index, edge) in edges.iter().enumerate() {
            incident[edge.source].push(edge_index);
            if edge.target != edge.source {
                incident[edge.target].push(edge_index);
            }
        }
        for list in &mut incident {
            list.sort_by(|a, b| edges[*b].weight.cmp(&edges[*a].weight));
        }

        let seed_index = nodes.iter().position(|node| node.is_seed);
        let max_degree = nodes.iter().map(|node| node.degree).max().unwrap_or(0);
        let hit_radii = nodes
            .iter()
            .map(|node| hit_radius(node.kind, node.is_seed))
            .collect::<Vec<_>>();

        let mut engine = LayoutEngine::new(initial_positions(&nodes, center), settings);
        install_forces(&mut engine, &edges, center, settings);

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "scene built"
        );

        Self {
            nodes,
            edges,
            index_by_id,
            incident,
            seed_index,
            max_degree,
            hit_radii,
            engine,
        }
    }
}

fn initial_positions(nodes: &[SceneNode], center: Vec2) -> Vec<Vec2> {
    let count = nodes.len().max(1) as f32;
    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            if node.is_seed {
                return center;
            }

            let (jitter_angle, jitter_radius) = stable_pair(&node.id);
            let angle = ((index as f32 / count) + (jitter_angle * 0.04)) * TAU;
            let radius = RING_RADIUS * (1.0 + (jitter_radius * 0.2));
            center + vec2(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

fn rest_length(kind: EdgeKind, settings: &LayoutSettings) -> f32 {
    match kind {
        EdgeKind::Token | EdgeKind::Coin => settings.long_link_length,
        EdgeKind::Transfer | EdgeKind::Balance => settings.short_link_length,
    }
}

fn install_forces(
    engine: &mut LayoutEngine,
    edges: &[SceneEdge],
    center: Vec2,
    settings: &LayoutSettings,
) {
    let springs = edges
        .iter()
        .map(|edge| Spring {
            source: edge.source,
            target: edge.target,
            rest_length: rest_length(edge.kind, settings),
        })
        .collect();

    engine.add_force(Force::Repulsion {
        strength: settings.repulsion_strength,
    });
    engine.add_force(Force::Link {
        springs,
        stiffness: settings.link_stiffness,
    });
    engine.add_force(Force::Centering {
        center,
        strength: settings.center_strength,
    });
    engine.add_force(Force::Collision {
        radius: settings.collision_radius,
        strength: settings.collision_strength,
    });
    engine.add_force(Force::AxisAnchor {
        axis: Axis::X,
        target: center.x,
        strength: settings.axis_strength,
    });
    engine.add_force(Force::AxisAnchor {
        axis: Axis::Y,
        target: center.y,
        strength: settings.axis_strength,
    });
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use crate::chain::{ChainGraph, EdgeKind, GraphEdge, GraphNode, NodeKind};

    use super::super::super::physics::{Force, LayoutSettings};
    use super::super::Scene;

    fn node(id: &str, kind: NodeKind, degree: u64, is_seed: bool) -> GraphNode {
        GraphNode {
            id: id.to_owned(),
            label: id.to_owned(),
            kind,
            degree,
            is_seed,
        }
    }

    fn edge(source: &str, target: &str, kind: EdgeKind, weight: u64) -> GraphEdge {
        GraphEdge {
            source: source.to_owned(),
            target: target.to_owned(),
            kind,
            weight,
        }
    }

    fn sample_graph() -> ChainGraph {
        ChainGraph {
            seed: "0xseed".to_owned(),
            nodes: vec![
                node("0xseed", NodeKind::Address, 5, true),
                node("0xtoken", NodeKind::Token, 3, false),
                node("0xpeer", NodeKind::Address, 2, false),
            ],
            links: vec![
                edge("0xseed", "0xpeer", EdgeKind::Transfer, 2),
                edge("0xtoken", "0xseed", EdgeKind::Token, 3),
                edge("0xseed", "0xmissing", EdgeKind::Transfer, 9),
            ],
            ..ChainGraph::default()
        }
    }

    #[test]
    fn seed_starts_at_center_and_others_on_ring() {
        let center = vec2(400.0, 300.0);
        let scene = Scene::build(&sample_graph(), center, &LayoutSettings::default());
        let positions = scene.engine.positions();

        assert_eq!(scene.seed_index, Some(0));
        assert_eq!(positions[0], center);
        for position in &positions[1..] {
            let distance = (*position - center).length();
            assert!((120.0..=200.0).contains(&distance), "{distance}");
        }
    }

    #[test]
    fn edges_resolve_to_arena_indices() {
        let scene = Scene::build(&sample_graph(), vec2(0.0, 0.0), &LayoutSettings::default());

        assert_eq!(scene.edges.len(), 2);
        assert_eq!(scene.node_index("0xpeer"), Some(2));
        assert_eq!(scene.incident[0], vec![1, 0]);
        assert_eq!(scene.edges[scene.incident[0][0]].other(0), 1);
        assert_eq!(scene.max_degree, 5);
        assert_eq!(scene.hit_radii, vec![10.0, 8.0, 6.0]);
    }

    #[test]
    fn token_and_coin_links_rest_longer_than_transfers() {
        let graph = ChainGraph {
            seed: "0xseed".to_owned(),
            nodes: vec![
                node("0xseed", NodeKind::Address, 4, true),
                node("0xpeer", NodeKind::Address, 1, false),
                node("0xtoken", NodeKind::Token, 1, false),
                node("coin:ETH", NodeKind::Coin, 1, false),
                node("0xheld", NodeKind::Token, 1, false),
            ],
            links: vec![
                edge("0xseed", "0xpeer", EdgeKind::Transfer, 1),
                edge("0xtoken", "0xseed", EdgeKind::Token, 1),
                edge("coin:ETH", "0xseed", EdgeKind::Coin, 1),
                edge("0xseed", "0xheld", EdgeKind::Balance, 1),
            ],
            ..ChainGraph::default()
        };
        let settings = LayoutSettings::default();
        let scene = Scene::build(&graph, vec2(0.0, 0.0), &settings);

        let springs = scene
            .engine
            .forces()
            .iter()
            .find_map(|force| match force {
                Force::Link { springs, .. } => Some(springs),
                _ => None,
            })
            .expect("link force installed");
        assert_eq!(springs.len(), scene.edges.len());

        for (spring, edge) in springs.iter().zip(&scene.edges) {
            assert_eq!((spring.source, spring.target), (edge.source, edge.target));
            let expected = match edge.kind {
                EdgeKind::Token | EdgeKind::Coin => 90.0,
                EdgeKind::Transfer | EdgeKind::Balance => 60.0,
            };
            assert_eq!(spring.rest_length, expected, "{:?}", edge.kind);
        }
    }

    #[test]
    fn empty_graph_builds_empty_scene() {
        let scene = Scene::build(&ChainGraph::default(), vec2(0.0, 0.0), &LayoutSettings::default());
        assert!(scene.is_empty());
        assert_eq!(scene.seed_index, None);
        assert!(scene.engine.positions().is_empty());
    }
}
