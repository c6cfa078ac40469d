mod app;
mod data;
mod rank;
mod util;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph JSON file: {"nodes": [...], "links": [{"source", "target"}]}.
    graph: Option<PathBuf>,
    /// Optional score JSON file mapping page ids to non-negative numbers.
    #[arg(long)]
    scores: Option<PathBuf>,
    #[arg(long, default_value_t = 150)]
    max_nodes: usize,
    #[arg(long, default_value_t = 0.0)]
    min_score: f64,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let options = app::AppOptions {
        graph_path: args.graph,
        scores_path: args.scores,
        max_nodes: args.max_nodes,
        min_score: args.min_score,
    };

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "linkview",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::LinkViewApp::new(cc, options)))),
    )
}
