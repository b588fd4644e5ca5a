use eframe::egui::{self, Color32, Sense, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::info;

use crate::chain::{EdgeKind, NodeKind};

use super::super::ViewModel;
use super::super::render::{SEED_HUE, edge_hue, node_hue};

const FINDER_LIMIT: usize = 12;
const REPULSION_RANGE: std::ops::RangeInclusive<f32> = 20.0..=400.0;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn legend_row(ui: &mut Ui, color: Color32, label: &str, filled: bool) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(vec2(14.0, 14.0), Sense::hover());
        if filled {
            ui.painter().circle_filled(rect.center(), 5.5, color);
        } else {
            ui.painter().line_segment(
                [rect.left_center(), rect.right_center()],
                egui::Stroke::new(2.5, color),
            );
        }
        ui.label(label);
    });
}

impl ViewModel {
    /// Scene indices whose label or id fuzzy-match `query`, best first.
    pub(in crate::app) fn finder_matches(&self, query: &str, limit: usize) -> Vec<usize> {
        let query = query.trim();
        let Some(scene) = self.scene.as_ref() else {
            return Vec::new();
        };
        if query.is_empty() {
            return Vec::new();
        }

        let exact = scene.node_index(&query.to_ascii_lowercase());
        let matcher = SkimMatcherV2::default();
        let mut scored = scene
            .nodes
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != exact)
            .filter_map(|(index, node)| {
                let label = fuzzy_match_score(&matcher, &node.label, query);
                let id = fuzzy_match_score(&matcher, &node.id, query);
                label.max(id).map(|score| (score, index))
            })
            .collect::<Vec<_>>();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        exact
            .into_iter()
            .chain(scored.into_iter().map(|(_, index)| index))
            .take(limit)
            .collect()
    }

    pub(in crate::app) fn set_repulsion(&mut self, value: f32) {
        self.repulsion = value;
        if let Some(scene) = self.scene.as_mut() {
            scene.engine.set_repulsion_strength(value);
            scene.engine.reheat(self.settings.drag_temperature);
        }
    }

    pub(in crate::app) fn reheat_layout(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            scene.engine.reheat(1.0);
            self.redraw.request();
        }
    }

    pub(in crate::app) fn release_pins(&mut self) {
        if let Some(scene) = self.scene.as_mut() {
            info!(count = scene.engine.pinned_count(), "releasing pins");
            scene.engine.clear_pins();
            scene.engine.reheat(self.settings.drag_temperature);
            self.redraw.request();
        }
    }

    pub(in crate::app) fn fit_view(&mut self) {
        if let Some(scene) = self.scene.as_ref()
            && self.viewport.fit_to(scene.engine.positions())
        {
            self.redraw.request();
        }
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Find node (label or address)")
            .on_hover_text("Fuzzy search over node labels and ids. Click a result to select it.");
        ui.text_edit_singleline(&mut self.search);

        let matches = self.finder_matches(&self.search, FINDER_LIMIT);
        let mut chosen = None;
        if let Some(scene) = self.scene.as_ref() {
            for index in matches {
                let node = &scene.nodes[index];
                let text = format!("{}  ({})", node.label, node.kind.label());
                if ui.link(text).on_hover_text(node.id.as_str()).clicked() {
                    chosen = Some(index);
                }
            }
        }
        if let Some(index) = chosen {
            self.select_node(index);
        }

        ui.separator();
        ui.checkbox(&mut self.live_physics, "Live physics simulation")
            .on_hover_text("Pause to freeze the layout; dragging still moves nodes.");
        ui.checkbox(&mut self.show_fps_bar, "FPS Display");

        let mut repulsion = self.repulsion;
        let slider = ui
            .add(
                egui::Slider::new(&mut repulsion, REPULSION_RANGE)
                    .text("Repulsion")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("How strongly nodes push away from each other.");
        if slider.changed() {
            self.set_repulsion(repulsion);
        }

        ui.horizontal_wrapped(|ui| {
            if ui.button("Reheat").clicked() {
                self.reheat_layout();
            }
            if ui.button("Release pins").clicked() {
                self.release_pins();
            }
            if ui.button("Fit view").clicked() {
                self.fit_view();
            }
        });

        if let Some(scene) = self.scene.as_ref() {
            ui.small(format!(
                "temperature {:.3} | pinned {} | {} view",
                scene.engine.temperature(),
                scene.engine.pinned_count(),
                if self.viewport.user_adjusted() { "manual" } else { "auto-fit" }
            ));
        }
        ui.small("Drag nodes to move them, drag empty space to pan, scroll to zoom, P to pin.");

        ui.separator();
        ui.collapsing("Legend", |ui| {
            legend_row(ui, SEED_HUE, "seed", true);
            for kind in NodeKind::ALL {
                legend_row(ui, node_hue(kind), kind.label(), true);
            }
            ui.add_space(4.0);
            for kind in EdgeKind::ALL {
                legend_row(ui, edge_hue(kind), kind.label(), false);
            }
        });
    }
}
