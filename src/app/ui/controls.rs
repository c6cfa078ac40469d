use eframe::egui::{self, Ui};

use crate::rank::pagerank;
use crate::util::format_score;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        let mut changed = false;

        ui.add_space(6.0);
        ui.heading("Filters");
        ui.add_space(4.0);

        ui.add(egui::TextEdit::singleline(&mut self.search).hint_text("Search pages"));

        if ui
            .add(
                egui::Slider::new(&mut self.max_nodes, 0..=1000)
                    .text("Max pages")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("Rendering budget; the highest-scoring pages win when the graph is larger.")
            .changed()
        {
            changed = true;
        }

        ui.horizontal(|ui| {
            if ui
                .add(
                    egui::DragValue::new(&mut self.min_score)
                        .speed(0.0005)
                        .range(0.0..=1.0),
                )
                .on_hover_text("Pages below this score are dropped when the graph exceeds the budget.")
                .changed()
            {
                changed = true;
            }
            ui.label("Min score");
        });

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Scores");
        ui.add_space(4.0);

        match &self.scores {
            Some(scores) => {
                ui.label(format!("{} scored pages", scores.len()));
            }
            None => {
                ui.label("No scores loaded; sizes are uniform.");
            }
        }
        if ui
            .button("Rank pages")
            .on_hover_text("Compute link-based importance (PageRank) for the loaded graph.")
            .clicked()
        {
            self.scores = Some(pagerank(&self.graph));
            changed = true;
        }

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Physics");
        ui.add_space(4.0);

        ui.checkbox(&mut self.live_physics, "Live simulation");

        ui.add(
            egui::Slider::new(&mut self.link_distance, 40.0..=300.0)
                .text("Link distance")
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text("Preferred separation between linked pages.");

        ui.add(
            egui::Slider::new(&mut self.repulsion, 0.25..=2.5)
                .text("Repulsion")
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text("How strongly pages push each other apart.");

        ui.add(
            egui::Slider::new(&mut self.collision_padding, 0.0..=12.0)
                .text("Collision padding")
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text("Extra clearance kept between overlapping circles.");

        ui.add(
            egui::Slider::new(&mut self.energy_decay, 0.9..=0.999)
                .text("Energy decay")
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text("How quickly the layout settles; lower settles faster.");

        if ui.button("Reheat layout").clicked()
            && let Some(cache) = self.graph_cache.as_mut()
        {
            cache.sim.start();
        }

        ui.add_space(8.0);
        ui.separator();
        ui.heading("Selection");
        ui.add_space(4.0);

        match self.selected.clone() {
            Some(selected_id) => {
                ui.label(selected_id.as_str());
                ui.label(format!("score: {}", format_score(self.node_score(&selected_id))));
                if let Some(cache) = self.graph_cache.as_ref()
                    && let Some(&index) = cache.index_by_id.get(&selected_id)
                {
                    ui.label(format!(
                        "links: {} out / {} in",
                        cache.outgoing[index].len(),
                        cache.incoming[index].len()
                    ));
                } else {
                    ui.label("Not in the rendered subset.");
                }
                ui.label("Hover another page to trace the shortest link path.");
                if ui.button("Clear selection").clicked() {
                    self.set_selected(None);
                }
            }
            None => {
                ui.label("Click a page to select it.");
            }
        }

        if changed {
            self.graph_dirty = true;
        }
    }
}
