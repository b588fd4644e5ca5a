use std::path::Path;

use eframe::egui::{self, Align, Color32, Context, Layout, RichText};

use crate::util::short_address;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        payload_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.update_fps_counter(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("chain-atlas");
                    ui.separator();
                    let seed_degree = self
                        .graph
                        .node(&self.graph.seed)
                        .map(|node| node.degree)
                        .unwrap_or_default();
                    ui.label(format!(
                        "seed: {} (degree {seed_degree})",
                        short_address(&self.graph.seed)
                    ))
                    .on_hover_text(self.graph.seed.as_str());
                    ui.label(format!("payload: {}", payload_path.display()));
                    ui.label(self.graph_summary_text());
                    if let Some(sampling) = self.sampling_text() {
                        ui.label(RichText::new(sampling).color(Color32::from_rgb(251, 191, 36)));
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload payload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if is_loading {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Reloading transfer payload...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                } else {
                    self.draw_graph(ui);
                }
            });
    }

    /// Makes `index` the selected node, the target of the pin key.
    pub(in crate::app) fn select_node(&mut self, index: usize) {
        let Some(scene) = self.scene.as_ref() else {
            return;
        };
        if index < scene.nodes.len() {
            self.interaction.selected = Some(index);
            self.redraw.request();
        }
    }
}
