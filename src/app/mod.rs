use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::data::{self, PageGraph, ScoreMap};

mod graph;
mod highlight;
mod physics;
mod render_utils;
mod ui;

use physics::Simulation;

#[derive(Clone, Debug)]
pub struct AppOptions {
    pub graph_path: Option<PathBuf>,
    pub scores_path: Option<PathBuf>,
    pub max_nodes: usize,
    pub min_score: f64,
}

pub struct LinkViewApp {
    options: AppOptions,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

type LoadResult = Result<(PageGraph, Option<ScoreMap>), String>;

enum AppState {
    /// No graph file was supplied; render an empty frame with a hint.
    Empty,
    Loading {
        rx: Receiver<LoadResult>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: PageGraph,
    scores: Option<ScoreMap>,
    max_nodes: usize,
    min_score: f64,
    search: String,
    /// Sticky click selection; source endpoint of the path overlay.
    selected: Option<String>,
    /// Transient hover focus, as an index into the current render graph.
    hovered: Option<usize>,
    emphasis: Option<EmphasisState>,
    /// Index of the node currently being dragged, if any.
    drag: Option<usize>,
    pan: Vec2,
    zoom: f32,
    live_physics: bool,
    link_distance: f32,
    repulsion: f32,
    collision_padding: f32,
    energy_decay: f32,
    graph_dirty: bool,
    render_graph_revision: u64,
    graph_cache: Option<RenderGraph>,
    search_match_cache: Option<SearchMatchCache>,
    rendered_node_count: usize,
    rendered_edge_count: usize,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

/// The filtered graph actually simulated and drawn. Rebuilt whenever the
/// input graph, scores, or filter parameters change; rebuilding replaces the
/// simulation wholesale, so at most one simulation ever runs.
struct RenderGraph {
    nodes: Vec<RenderNode>,
    edges: Vec<(usize, usize)>,
    index_by_id: HashMap<String, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    min_score: f64,
    max_score: f64,
    sim: Simulation,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

struct RenderNode {
    id: String,
    world_pos: Vec2,
    velocity: Vec2,
    /// While set, the node ignores forces and holds this position exactly.
    pin: Option<Vec2>,
    score: f64,
    base_radius: f32,
}

/// Hover emphasis: the focused node, its direct neighbors, and the edges
/// connecting them. Recomputed on every hover change, discarded otherwise.
struct EmphasisState {
    focus: usize,
    nodes: HashSet<usize>,
    edges: HashSet<(usize, usize)>,
}

#[derive(Default)]
struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    radii: Vec<f32>,
}

struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
    visible_mask: Vec<bool>,
    draw_order: Vec<usize>,
    draw_order_dirty: bool,
}

#[derive(Clone, Copy)]
struct PhysicsConfig {
    link_distance: f32,
    repulsion: f32,
    collision_padding: f32,
    energy_decay: f32,
    bounds_half_extent: f32,
    delta_seconds: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            link_distance: 110.0,
            repulsion: 1.0,
            collision_padding: 4.0,
            energy_decay: 0.99,
            bounds_half_extent: 2400.0,
            delta_seconds: 1.0 / 60.0,
        }
    }
}

impl RenderGraph {
    fn new(nodes: Vec<RenderNode>, edges: Vec<(usize, usize)>) -> Self {
        let mut index_by_id = HashMap::with_capacity(nodes.len());
        for (index, node) in nodes.iter().enumerate() {
            index_by_id.insert(node.id.clone(), index);
        }

        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for &(source, target) in &edges {
            outgoing[source].push(target);
            incoming[target].push(source);
        }

        let mut min_score = f64::INFINITY;
        let mut max_score = 0.0_f64;
        for node in &nodes {
            if node.score > 0.0 {
                min_score = min_score.min(node.score);
            }
            max_score = max_score.max(node.score);
        }
        if !min_score.is_finite() {
            min_score = 0.0;
        }

        Self {
            nodes,
            edges,
            index_by_id,
            outgoing,
            incoming,
            min_score,
            max_score,
            sim: Simulation::new(),
            physics_scratch: PhysicsScratch::default(),
            view_scratch: ViewScratch {
                screen_positions: Vec::new(),
                screen_radii: Vec::new(),
                visible_indices: Vec::new(),
                visible_mask: Vec::new(),
                draw_order: Vec::new(),
                draw_order_dirty: true,
            },
        }
    }
}

impl LinkViewApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, options: AppOptions) -> Self {
        let state = match options.graph_path.clone() {
            Some(graph_path) => AppState::Loading {
                rx: Self::spawn_load(graph_path, options.scores_path.clone()),
            },
            None => AppState::Empty,
        };

        Self {
            options,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(graph_path: PathBuf, scores_path: Option<PathBuf>) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_inputs(&graph_path, scores_path.as_deref());
            let _ = tx.send(result);
        });

        rx
    }
}

fn load_inputs(graph_path: &Path, scores_path: Option<&Path>) -> LoadResult {
    let graph = data::load_graph(graph_path).map_err(|error| format!("{error:#}"))?;
    let scores = match scores_path {
        Some(path) => Some(data::load_scores(path).map_err(|error| format!("{error:#}"))?),
        None => None,
    };
    Ok((graph, scores))
}

impl eframe::App for LinkViewApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Empty => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("No graph loaded");
                        ui.add_space(8.0);
                        ui.label("Start linkview with a graph JSON file: linkview graph.json");
                    });
                });
            }
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok((graph, scores)) => AppState::Ready(Box::new(ViewModel::new(
                            graph,
                            scores,
                            self.options.max_nodes,
                            self.options.min_score,
                        ))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading link graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load link graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked()
                        && let Some(graph_path) = self.options.graph_path.clone()
                    {
                        transition = Some(AppState::Loading {
                            rx: Self::spawn_load(graph_path, self.options.scores_path.clone()),
                        });
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                let graph_file = self
                    .options
                    .graph_path
                    .as_deref()
                    .and_then(|path| path.file_name())
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                model.show(ctx, &graph_file, &mut reload_requested, is_reloading);

                if reload_requested
                    && self.reload_rx.is_none()
                    && let Some(graph_path) = self.options.graph_path.clone()
                {
                    self.reload_rx = Some(Self::spawn_load(
                        graph_path,
                        self.options.scores_path.clone(),
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok((graph, scores)) => AppState::Ready(Box::new(ViewModel::new(
                                    graph,
                                    scores,
                                    self.options.max_nodes,
                                    self.options.min_score,
                                ))),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
