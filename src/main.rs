mod app;
mod chain;
mod util;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chain::{GraphLimits, build_graph, load_payload};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Transfer payload (JSON) to visualize.
    payload: PathBuf,

    /// Leading transfers considered when building the graph.
    #[arg(long, default_value_t = GraphLimits::default().sample_cap)]
    sample_cap: usize,

    #[arg(long, default_value_t = GraphLimits::default().max_nodes)]
    max_nodes: usize,

    #[arg(long, default_value_t = GraphLimits::default().max_edges)]
    max_edges: usize,

    /// Write the graph as JSON to this path and exit without opening a window.
    #[arg(long)]
    export_graph: Option<PathBuf>,

    /// Tracing filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_filter: String,
}

impl Args {
    fn limits(&self) -> GraphLimits {
        GraphLimits {
            sample_cap: self.sample_cap,
            max_nodes: self.max_nodes,
            max_edges: self.max_edges,
        }
    }
}

fn export_graph(payload_path: &Path, limits: &GraphLimits, output: &Path) -> anyhow::Result<()> {
    let payload = load_payload(payload_path)?;
    let graph = build_graph(&payload, limits);
    let json = serde_json::to_string_pretty(&graph).context("failed to serialize graph")?;
    fs::write(output, json)
        .with_context(|| format!("failed to write graph to {}", output.display()))?;

    info!(
        path = %output.display(),
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        "graph exported"
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let limits = args.limits();
    if let Some(output) = &args.export_graph {
        return export_graph(&args.payload, &limits, output);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    let payload_path = args.payload;
    eframe::run_native(
        "chain-atlas",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ChainAtlasApp::new(
                cc,
                payload_path.clone(),
                limits,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
