use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use super::balance::balance_is_nonzero;
use super::graph::{ChainGraph, EdgeKind, GraphEdge, GraphLimits, GraphNode, NodeKind};
use super::payload::{Payload, TokenMetadata, normalize_address};
use crate::util::short_address;

struct NodeEntry {
    id: String,
    kind: NodeKind,
    coin_asset: Option<String>,
}

struct EdgeEntry {
    source: usize,
    target: usize,
    kind: EdgeKind,
    weight: u64,
}

/// Insertion-ordered node and edge tables; discovery order is the tie-break
/// for every ranking done later, which keeps the output reproducible.
#[derive(Default)]
struct GraphAccumulator {
    nodes: Vec<NodeEntry>,
    node_index: HashMap<String, usize>,
    edges: Vec<EdgeEntry>,
    edge_index: HashMap<(usize, usize, EdgeKind), usize>,
}

impl GraphAccumulator {
    fn upsert_node(&mut self, id: &str, kind: NodeKind) -> usize {
        if let Some(&index) = self.node_index.get(id) {
            let node = &mut self.nodes[index];
            node.kind = node.kind.upgrade(kind);
            return index;
        }

        let index = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.to_owned(),
            kind,
            coin_asset: None,
        });
        self.node_index.insert(id.to_owned(), index);
        index
    }

    fn upsert_coin(&mut self, asset: &str) -> usize {
        let id = format!("coin:{}", normalize_address(asset));
        let index = self.upsert_node(&id, NodeKind::Coin);
        self.nodes[index]
            .coin_asset
            .get_or_insert_with(|| asset.trim().to_owned());
        index
    }

    fn add_edge(&mut self, source: usize, target: usize, kind: EdgeKind) {
        if source == target {
            return;
        }

        let key = (source, target, kind);
        if let Some(&index) = self.edge_index.get(&key) {
            self.edges[index].weight += 1;
            return;
        }

        self.edge_index.insert(key, self.edges.len());
        self.edges.push(EdgeEntry {
            source,
            target,
            kind,
            weight: 1,
        });
    }

    fn degrees(&self) -> Vec<u64> {
        let mut degrees = vec![0u64; self.nodes.len()];
        for edge in &self.edges {
            degrees[edge.source] += edge.weight;
            degrees[edge.target] += edge.weight;
        }
        degrees
    }
}

fn non_empty_address(value: Option<&str>) -> Option<String> {
    value
        .map(normalize_address)
        .filter(|address| !address.is_empty())
}

fn node_label(node: &NodeEntry, metadata: &HashMap<String, &TokenMetadata>) -> String {
    match node.kind {
        NodeKind::Coin => node
            .coin_asset
            .clone()
            .unwrap_or_else(|| node.id.trim_start_matches("coin:").to_owned()),
        NodeKind::Token => metadata
            .get(&node.id)
            .and_then(|meta| meta.label())
            .map(str::to_owned)
            .unwrap_or_else(|| short_address(&node.id)),
        NodeKind::Address | NodeKind::Contract => short_address(&node.id),
    }
}

pub fn build_graph(payload: &Payload, limits: &GraphLimits) -> ChainGraph {
    let seed = payload.seed();

    let Some(transfers) = payload.transfers.as_deref() else {
        debug!(seed = %seed, "payload has no transfers; producing an empty graph");
        return ChainGraph {
            seed,
            ..ChainGraph::default()
        };
    };

    let total_transfers = transfers.len();
    let sample = &transfers[..total_transfers.min(limits.sample_cap)];
    let sampled = sample.len() < total_transfers;
    if sampled {
        info!(
            sample_size = sample.len(),
            total_transfers, "transfer set exceeds the sample cap; using the leading records"
        );
    }

    let metadata = payload.metadata_by_address();
    let mut token_ids = metadata.keys().cloned().collect::<HashSet<_>>();
    for balance in payload.balances() {
        if let Some(address) = non_empty_address(balance.contract_address.as_deref()) {
            token_ids.insert(address);
        }
    }

    let mut acc = GraphAccumulator::default();
    let seed_index = (!seed.is_empty()).then(|| acc.upsert_node(&seed, NodeKind::Address));

    let mut skipped = 0usize;
    for record in sample {
        let (Some(from), Some(to)) = (
            non_empty_address(record.from.as_deref()),
            non_empty_address(record.to.as_deref()),
        ) else {
            skipped += 1;
            continue;
        };

        let from_index = acc.upsert_node(&from, NodeKind::Address);
        let to_index = acc.upsert_node(&to, NodeKind::Address);
        acc.add_edge(from_index, to_index, EdgeKind::Transfer);

        let mut participants = vec![from_index];
        if to_index != from_index {
            participants.push(to_index);
        }

        if let Some(contract) = record.contract_address() {
            let kind = if token_ids.contains(&contract) {
                NodeKind::Token
            } else {
                NodeKind::Contract
            };
            let contract_index = acc.upsert_node(&contract, kind);
            for &participant in &participants {
                acc.add_edge(contract_index, participant, EdgeKind::Token);
            }
        } else if let Some(asset) = record
            .asset
            .as_deref()
            .filter(|asset| record.is_native_movement() && !asset.trim().is_empty())
        {
            let coin_index = acc.upsert_coin(asset);
            for &participant in &participants {
                acc.add_edge(coin_index, participant, EdgeKind::Coin);
            }
        }
    }
    if skipped > 0 {
        debug!(skipped, "skipped transfer records without both endpoints");
    }

    if let Some(seed_index) = seed_index {
        for balance in payload.balances() {
            let Some(contract) = non_empty_address(balance.contract_address.as_deref()) else {
                continue;
            };
            if !balance_is_nonzero(&balance.token_balance) {
                continue;
            }
            let token_index = acc.upsert_node(&contract, NodeKind::Token);
            acc.add_edge(seed_index, token_index, EdgeKind::Balance);
        }
    }

    for node in &mut acc.nodes {
        if node.kind != NodeKind::Coin && token_ids.contains(&node.id) {
            node.kind = node.kind.upgrade(NodeKind::Token);
        }
    }

    let degrees = acc.degrees();
    let full_edge_count = acc.edges.len();

    let mut ranked = (0..acc.nodes.len()).collect::<Vec<_>>();
    ranked.sort_by(|a, b| degrees[*b].cmp(&degrees[*a]));
    ranked.truncate(limits.max_nodes);

    let mut kept = vec![false; acc.nodes.len()];
    for &index in &ranked {
        kept[index] = true;
    }

    let mut edges = acc
        .edges
        .iter()
        .filter(|edge| kept[edge.source] && kept[edge.target])
        .collect::<Vec<_>>();
    edges.sort_by(|a, b| b.weight.cmp(&a.weight));
    edges.truncate(limits.max_edges);

    let nodes = ranked
        .iter()
        .map(|&index| {
            let node = &acc.nodes[index];
            GraphNode {
                id: node.id.clone(),
                label: node_label(node, &metadata),
                kind: node.kind,
                degree: degrees[index],
                is_seed: Some(index) == seed_index,
            }
        })
        .collect::<Vec<_>>();

    let links = edges
        .into_iter()
        .map(|edge| GraphEdge {
            source: acc.nodes[edge.source].id.clone(),
            target: acc.nodes[edge.target].id.clone(),
            kind: edge.kind,
            weight: edge.weight,
        })
        .collect::<Vec<_>>();

    info!(
        seed = %seed,
        nodes = nodes.len(),
        links = links.len(),
        discovered_nodes = acc.nodes.len(),
        discovered_links = full_edge_count,
        "built chain graph"
    );

    ChainGraph {
        seed,
        nodes,
        links,
        sampled,
        sample_size: sample.len(),
        total_transfers,
    }
}

#[cfg(test)]
#[path = "tests/build_tests.rs"]
mod tests;
