use eframe::egui::Context;

use super::super::ViewModel;

const FPS_SAMPLE_WINDOW: usize = 180;

impl ViewModel {
    pub(in crate::app) fn update_fps_counter(&mut self, ctx: &Context) {
        let dt = ctx.input(|input| input.stable_dt);
        self.record_frame_time(dt);
    }

    pub(in crate::app) fn record_frame_time(&mut self, dt: f32) {
        if dt <= f32::EPSILON {
            return;
        }

        self.fps_current = (1.0 / dt).clamp(0.0, 1000.0);
        self.fps_samples.push_back(self.fps_current);
        while self.fps_samples.len() > FPS_SAMPLE_WINDOW {
            self.fps_samples.pop_front();
        }
    }

    pub(in crate::app) fn fps_display_text(&self) -> Option<String> {
        if !self.show_fps_bar || self.fps_samples.is_empty() {
            return None;
        }

        let avg = self.fps_samples.iter().sum::<f32>() / self.fps_samples.len() as f32;
        Some(format!(
            "FPS {:.0} | avg {:.1} | {:.1} ms",
            self.fps_current,
            avg,
            1000.0 / self.fps_current.max(f32::EPSILON)
        ))
    }

    pub(in crate::app) fn graph_summary_text(&self) -> String {
        format!(
            "nodes: {} | edges: {}",
            self.graph.nodes.len(),
            self.graph.links.len()
        )
    }

    pub(in crate::app) fn sampling_text(&self) -> Option<String> {
        self.graph.sampled.then(|| {
            format!(
                "sampled {} of {} transfers",
                self.graph.sample_size, self.graph.total_transfers
            )
        })
    }
}
