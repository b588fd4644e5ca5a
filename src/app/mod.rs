use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::{info, warn};

use crate::chain::{ChainGraph, GraphLimits, build_graph, load_payload};

use graph::Scene;
use graph::input::InputBridge;
use graph::interaction::{InteractionState, RedrawScheduler};
use physics::LayoutSettings;
use viewport::ViewportController;

mod graph;
mod physics;
mod render;
mod ui;
mod viewport;

pub struct ChainAtlasApp {
    payload_path: PathBuf,
    limits: GraphLimits,
    state: AppState,
    reload_rx: Option<Receiver<Result<ChainGraph, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<ChainGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: ChainGraph,
    scene: Option<Scene>,
    viewport: ViewportController,
    interaction: InteractionState,
    input: InputBridge,
    redraw: RedrawScheduler,
    settings: LayoutSettings,
    live_physics: bool,
    repulsion: f32,
    search: String,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

impl ChainAtlasApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        payload_path: PathBuf,
        limits: GraphLimits,
    ) -> Self {
        let state = Self::start_load(payload_path.clone(), limits);
        Self {
            payload_path,
            limits,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(
        payload_path: PathBuf,
        limits: GraphLimits,
    ) -> Receiver<Result<ChainGraph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            info!(path = %payload_path.display(), "loading payload");
            let result = load_payload(&payload_path)
                .map(|payload| build_graph(&payload, &limits))
                .map_err(|error| {
                    let message = format!("{error:#}");
                    warn!(%message, "payload load failed");
                    message
                });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(payload_path: PathBuf, limits: GraphLimits) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(payload_path, limits),
        }
    }

    fn ready(graph: ChainGraph) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(graph)))
    }
}

impl eframe::App for ChainAtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(graph) => Self::ready(graph),
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading transfer payload...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load transfer payload");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.payload_path.clone(), self.limits));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.payload_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.payload_path.clone(), self.limits));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(graph) => Self::ready(graph),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            if let AppState::Ready(model) = &mut self.state {
                model.teardown();
            }
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(graph: ChainGraph) -> Self {
        let settings = LayoutSettings::default();
        Self {
            graph,
            scene: None,
            viewport: ViewportController::new(Vec2::ZERO),
            interaction: InteractionState::default(),
            input: InputBridge::default(),
            redraw: RedrawScheduler::default(),
            live_physics: true,
            repulsion: settings.repulsion_strength,
            settings,
            search: String::new(),
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
        }
    }
}

#[cfg(test)]
#[path = "tests/view_model_tests.rs"]
mod tests;
