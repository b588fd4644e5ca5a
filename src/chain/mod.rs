mod balance;
mod build;
mod graph;
mod payload;

pub use build::build_graph;
pub use graph::{ChainGraph, EdgeKind, GraphEdge, GraphLimits, GraphNode, NodeKind};
pub use payload::{load_payload, parse_payload};
