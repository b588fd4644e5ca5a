use std::collections::HashMap;

use crate::chain::{EdgeKind, NodeKind};

use super::physics::LayoutEngine;
use super::viewport::Transform;
use interaction::SceneView;

mod build;
pub(in crate::app) mod input;
pub(in crate::app) mod interaction;
mod view;

pub(in crate::app) struct SceneNode {
    pub(in crate::app) id: String,
    pub(in crate::app) label: String,
    pub(in crate::app) kind: NodeKind,
    pub(in crate::app) degree: u64,
    pub(in crate::app) is_seed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) struct SceneEdge {
    pub(in crate::app) source: usize,
    pub(in crate::app) target: usize,
    pub(in crate::app) kind: EdgeKind,
    pub(in crate::app) weight: u64,
}

impl SceneEdge {
    pub(in crate::app) fn other(&self, index: usize) -> usize {
        if self.source == index {
            self.target
        } else {
            self.source
        }
    }
}

/// Node/edge arena for the visualization. Indices are creation order and
/// stay valid for the lifetime of the scene.
pub(in crate::app) struct Scene {
    pub(in crate::app) nodes: Vec<SceneNode>,
    pub(in crate::app) edges: Vec<SceneEdge>,
    pub(in crate::app) index_by_id: HashMap<String, usize>,
    /// Edge indices per node, heaviest first.
    pub(in crate::app) incident: Vec<Vec<usize>>,
    pub(in crate::app) seed_index: Option<usize>,
    pub(in crate::app) max_degree: u64,
    pub(in crate::app) hit_radii: Vec<f32>,
    pub(in crate::app) engine: LayoutEngine,
}

impl Scene {
    pub(in crate::app) fn view(&self, transform: Transform) -> SceneView<'_> {
        SceneView {
            transform,
            positions: self.engine.positions(),
            hit_radii: &self.hit_radii,
        }
    }

    pub(in crate::app) fn node_index(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub(in crate::app) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
