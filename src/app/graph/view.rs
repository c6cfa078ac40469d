use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, Vec2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::util::{format_score, truncate_label};

use super::super::highlight;
use super::super::physics::step_simulation;
use super::super::render_utils::{
    blend_color, dim_color, draw_background, edge_visible, score_color, world_to_screen,
};
use super::super::{PhysicsConfig, SearchMatchCache, ViewModel};
use super::interaction::MIN_ZOOM;

const FOCUS_COLOR: Color32 = Color32::from_rgb(255, 164, 101);
const NEIGHBOR_COLOR: Color32 = Color32::from_rgb(246, 137, 92);
const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const PATH_COLOR: Color32 = Color32::from_rgb(246, 206, 104);
const MATCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
const LABEL_COLOR: Color32 = Color32::from_gray(238);
const NODE_RING_COLOR: Color32 = Color32::from_rgba_premultiplied(15, 15, 15, 190);

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn update_screen_space(rect: Rect, pan: Vec2, zoom: f32, cache: &mut super::super::RenderGraph) {
        let scratch = &mut cache.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        for node in &cache.nodes {
            scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, node.world_pos));
            scratch
                .screen_radii
                .push((node.base_radius * zoom.powf(0.40)).clamp(2.5, 46.0));
        }
    }

    fn ensure_draw_order(cache: &mut super::super::RenderGraph) {
        if !cache.view_scratch.draw_order_dirty
            && cache.view_scratch.draw_order.len() == cache.nodes.len()
        {
            return;
        }

        cache.view_scratch.draw_order.clear();
        cache.view_scratch.draw_order.extend(0..cache.nodes.len());
        cache
            .view_scratch
            .draw_order
            .sort_by(|a, b| cache.nodes[*a].score.total_cmp(&cache.nodes[*b].score));
        cache.view_scratch.draw_order_dirty = false;
    }

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.render_graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let cache = self.graph_cache.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = cache
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &node.id, query).map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.render_graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let search_matches = self.cached_search_matches();
        let pan = self.pan;
        let zoom = self.zoom;
        let interaction_active = response.dragged();
        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let physics = PhysicsConfig {
            link_distance: self.link_distance,
            repulsion: self.repulsion,
            collision_padding: self.collision_padding,
            energy_decay: self.energy_decay,
            // World-space bounds covering the viewport at the minimum zoom,
            // so zoomed-out exploration still has slack.
            bounds_half_extent: (rect.size().max_elem() * 0.5) / MIN_ZOOM,
            delta_seconds: frame_delta_seconds,
        };

        if self.graph_cache.is_none() {
            self.rendered_node_count = 0;
            self.rendered_edge_count = 0;
            ui.label("No pages matched the current score/budget filters.");
            return;
        }

        let mut simulation_moving = false;
        if self.live_physics
            && let Some(cache) = self.graph_cache.as_mut()
        {
            simulation_moving = step_simulation(cache, physics);
        }
        if simulation_moving || interaction_active {
            ui.ctx().request_repaint();
        }

        let hovered_index = {
            let Some(cache) = self.graph_cache.as_mut() else {
                return;
            };

            Self::update_screen_space(rect, pan, zoom, cache);
            Self::visible_indices_into(
                rect,
                &cache.view_scratch.screen_positions,
                &cache.view_scratch.screen_radii,
                &mut cache.view_scratch.visible_indices,
            );
            cache.view_scratch.visible_mask.clear();
            cache
                .view_scratch
                .visible_mask
                .resize(cache.nodes.len(), false);
            for &index in &cache.view_scratch.visible_indices {
                cache.view_scratch.visible_mask[index] = true;
            }
            Self::ensure_draw_order(cache);

            Self::hovered_index(
                ui,
                &cache.view_scratch.visible_indices,
                &cache.view_scratch.screen_positions,
                &cache.view_scratch.screen_radii,
            )
            .map(|(index, _distance)| index)
        };

        if hovered_index.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        // While dragging, emphasis stays on the dragged node even when the
        // pointer briefly outruns it.
        self.set_hover(self.drag.or(hovered_index));
        self.handle_node_drag(rect, &response, hovered_index);

        if response.clicked_by(egui::PointerButton::Primary) {
            let clicked = hovered_index.and_then(|index| {
                self.graph_cache
                    .as_ref()
                    .and_then(|cache| cache.nodes.get(index))
                    .map(|node| node.id.clone())
            });
            self.set_selected(clicked);
        }

        let Some(cache) = self.graph_cache.as_ref() else {
            return;
        };

        let (path_nodes, path_edges) = match (&self.selected, self.hovered) {
            (Some(selected_id), Some(hovered)) => {
                match cache.index_by_id.get(selected_id).copied() {
                    Some(selected) if selected != hovered => {
                        highlight::shortest_path(cache, selected, hovered)
                    }
                    _ => (HashSet::new(), HashSet::new()),
                }
            }
            _ => (HashSet::new(), HashSet::new()),
        };

        let emphasis = self.emphasis.as_ref();
        let emphasis_active = emphasis.is_some();
        let match_active = !emphasis_active
            && search_matches
                .as_ref()
                .is_some_and(|matches| !matches.is_empty());

        let zoom_sqrt = zoom.sqrt();
        let mut rendered_edges = 0usize;
        for &(source, target) in &cache.edges {
            let start = cache.view_scratch.screen_positions[source];
            let end = cache.view_scratch.screen_positions[target];
            let either_visible = cache.view_scratch.visible_mask[source]
                || cache.view_scratch.visible_mask[target];
            if !either_visible && !edge_visible(rect, start, end, 2.5) {
                continue;
            }

            let on_path = path_edges.contains(&(source, target));
            let emphasized =
                emphasis.is_some_and(|state| state.edges.contains(&(source, target)));

            let (line_width, line_color) = if on_path {
                ((3.2 * zoom_sqrt).clamp(1.7, 5.6), PATH_COLOR)
            } else if emphasized {
                ((2.4 * zoom_sqrt).clamp(1.2, 4.2), NEIGHBOR_COLOR)
            } else if emphasis_active {
                (
                    (0.8 * zoom_sqrt).clamp(0.45, 2.0),
                    Color32::from_rgba_unmultiplied(78, 88, 102, 128),
                )
            } else {
                (
                    (1.1 * zoom_sqrt).clamp(0.6, 3.2),
                    Color32::from_rgba_unmultiplied(72, 78, 84, 190),
                )
            };

            painter.line_segment([start, end], Stroke::new(line_width, line_color));
            rendered_edges += 1;
        }
        self.rendered_edge_count = rendered_edges;

        for index in cache.view_scratch.draw_order.iter().copied() {
            if !cache.view_scratch.visible_mask[index] {
                continue;
            }

            let node = &cache.nodes[index];
            let position = cache.view_scratch.screen_positions[index];
            let mut radius = cache.view_scratch.screen_radii[index];

            let is_focus = emphasis.is_some_and(|state| state.focus == index);
            let is_neighbor = emphasis.is_some_and(|state| state.nodes.contains(&index));
            let on_path = path_nodes.contains(&index);
            let is_selected = self.selected.as_deref() == Some(node.id.as_str());
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            if is_focus {
                radius += 2.5;
            }

            let base = score_color(node.score, cache.min_score, cache.max_score);
            let mut dimmed = false;
            let color = if is_focus {
                FOCUS_COLOR
            } else if is_selected {
                SELECTED_COLOR
            } else if on_path {
                blend_color(base, PATH_COLOR, 0.7)
            } else if is_neighbor {
                blend_color(base, NEIGHBOR_COLOR, 0.6)
            } else if emphasis_active {
                dimmed = true;
                dim_color(base, 0.45)
            } else if is_match {
                blend_color(base, MATCH_COLOR, 0.65)
            } else if match_active {
                dimmed = true;
                dim_color(base, 0.4)
            } else {
                base
            };

            painter.circle_filled(position, radius, color);
            let ring_width = if is_focus || is_selected { 1.8 } else { 1.0 };
            painter.circle_stroke(position, radius, Stroke::new(ring_width, NODE_RING_COLOR));

            let labeled = is_focus
                || is_neighbor
                || is_selected
                || on_path
                || (is_match && zoom > 0.35)
                || radius > 17.0
                || zoom > 1.35;
            if labeled {
                let label_color = if dimmed {
                    Color32::from_gray(140)
                } else {
                    LABEL_COLOR
                };
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    truncate_label(&node.id, 28),
                    FontId::proportional(12.0),
                    label_color,
                );
            }
        }

        if let Some(index) = self.hovered
            && let Some(node) = cache.nodes.get(index)
        {
            let mut readout = format!(
                "{}  |  score {}  |  links {} out / {} in",
                node.id,
                format_score(node.score),
                cache.outgoing[index].len(),
                cache.incoming[index].len(),
            );

            if let Some(selected_id) = &self.selected
                && selected_id != &node.id
            {
                if path_nodes.is_empty() {
                    readout.push_str(&format!("  |  no link path from {selected_id}"));
                } else {
                    readout.push_str(&format!(
                        "  |  {} hops from {selected_id}",
                        path_nodes.len().saturating_sub(1)
                    ));
                }
            }

            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                readout,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}
