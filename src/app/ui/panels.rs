use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::data::{PageGraph, ScoreMap};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(
        graph: PageGraph,
        scores: Option<ScoreMap>,
        max_nodes: usize,
        min_score: f64,
    ) -> Self {
        Self {
            graph,
            scores,
            max_nodes,
            min_score,
            search: String::new(),
            selected: None,
            hovered: None,
            emphasis: None,
            drag: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            live_physics: true,
            link_distance: 110.0,
            repulsion: 1.0,
            collision_padding: 4.0,
            energy_decay: 0.99,
            graph_dirty: true,
            render_graph_revision: 0,
            graph_cache: None,
            search_match_cache: None,
            rendered_node_count: 0,
            rendered_edge_count: 0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        graph_file: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("linkview");
                    ui.separator();
                    if !graph_file.is_empty() {
                        ui.label(graph_file);
                    }
                    ui.label(format!("pages: {}", self.graph.node_count()));
                    ui.label(format!("links: {}", self.graph.link_count()));
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "rendering {} pages, {} links",
                            self.rendered_node_count, self.rendered_edge_count
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading link graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected != selected {
            self.selected = selected;
        }
    }
}
