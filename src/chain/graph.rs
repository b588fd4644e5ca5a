use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Address,
    Contract,
    Token,
    Coin,
}

impl NodeKind {
    pub const ALL: [Self; 4] = [Self::Address, Self::Contract, Self::Token, Self::Coin];

    pub fn label(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Contract => "contract",
            Self::Token => "token",
            Self::Coin => "coin",
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::Address => 0,
            Self::Contract => 1,
            Self::Token => 2,
            Self::Coin => 3,
        }
    }

    /// Returns the more specific of the two classifications.
    pub fn upgrade(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Transfer,
    Token,
    Balance,
    Coin,
}

impl EdgeKind {
    pub const ALL: [Self; 4] = [Self::Transfer, Self::Token, Self::Balance, Self::Coin];

    pub fn label(self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::Token => "token",
            Self::Balance => "balance",
            Self::Coin => "coin",
        }
    }

    pub fn is_directed(self) -> bool {
        matches!(self, Self::Transfer)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub degree: u64,
    pub is_seed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub weight: u64,
}

/// Bounded relationship graph handed to the visualization.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainGraph {
    #[serde(skip)]
    pub seed: String,
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphEdge>,
    pub sampled: bool,
    pub sample_size: usize,
    pub total_transfers: usize,
}

impl ChainGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphLimits {
    pub sample_cap: usize,
    pub max_nodes: usize,
    pub max_edges: usize,
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            sample_cap: 2000,
            max_nodes: 240,
            max_edges: 380,
        }
    }
}
