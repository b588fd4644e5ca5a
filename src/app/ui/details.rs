use eframe::egui::{self, RichText, Ui};

use crate::chain::EdgeKind;

use super::super::ViewModel;

const NEIGHBOR_ROW_HEIGHT: f32 = 22.0;

/// One incident edge as listed in the details panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(in crate::app) struct NeighborEntry {
    pub(in crate::app) index: usize,
    pub(in crate::app) label: String,
    pub(in crate::app) kind: EdgeKind,
    pub(in crate::app) weight: u64,
    pub(in crate::app) outgoing: bool,
}

impl ViewModel {
    /// Incident edges of `index`, heaviest first.
    pub(in crate::app) fn neighbor_entries(&self, index: usize) -> Vec<NeighborEntry> {
        let Some(scene) = self.scene.as_ref() else {
            return Vec::new();
        };

        scene
            .incident
            .get(index)
            .into_iter()
            .flatten()
            .map(|&edge_index| {
                let edge = scene.edges[edge_index];
                let other = edge.other(index);
                NeighborEntry {
                    index: other,
                    label: scene.nodes[other].label.clone(),
                    kind: edge.kind,
                    weight: edge.weight,
                    outgoing: edge.source == index,
                }
            })
            .collect()
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected) = self.interaction.selected else {
            ui.label("Click a node or pick one from the finder.");
            return;
        };

        let Some(scene) = self.scene.as_ref() else {
            return;
        };
        let Some(node) = scene.nodes.get(selected) else {
            ui.label("Selected node no longer exists in the graph.");
            return;
        };

        ui.label(RichText::new(node.label.as_str()).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        ui.label(format!("Type: {}", node.kind.label()));
        ui.label(format!("Degree: {}", node.degree));
        if node.is_seed {
            ui.label("Seed address");
        }
        let pinned = scene.engine.is_pinned(selected);
        match scene.engine.pin(selected) {
            Some(position) => ui.label(format!("Pinned at ({:.0}, {:.0})", position.x, position.y)),
            None => ui.label("Free"),
        };

        let mut toggle_pin = false;
        if ui
            .button(if pinned { "Unpin (P)" } else { "Pin (P)" })
            .clicked()
        {
            toggle_pin = true;
        }

        ui.separator();
        ui.label(RichText::new("Relationships by weight").strong());

        let neighbors = self.neighbor_entries(selected);
        let mut navigate_to = None;
        if neighbors.is_empty() {
            ui.label("No relationships kept for this node.");
        } else {
            egui::ScrollArea::vertical()
                .id_salt("neighbor_scroll")
                .auto_shrink([false, false])
                .show_rows(ui, NEIGHBOR_ROW_HEIGHT, neighbors.len(), |ui, row_range| {
                    for entry in &neighbors[row_range] {
                        let arrow = if entry.outgoing { "->" } else { "<-" };
                        let text = format!(
                            "{arrow} {}  [{} x{}]",
                            entry.label,
                            entry.kind.label(),
                            entry.weight
                        );
                        if ui.link(text).clicked() {
                            navigate_to = Some(entry.index);
                        }
                    }
                });
        }

        if toggle_pin && let Some(scene) = self.scene.as_mut() {
            scene.engine.toggle_pin(selected);
            self.redraw.request();
        }
        if let Some(index) = navigate_to {
            self.select_node(index);
        }
    }
}
