use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::ViewModel;
use super::super::highlight;
use super::super::physics::REHEAT_ENERGY;
use super::super::render_utils::{circle_visible, screen_to_world};

pub(in crate::app) const MIN_ZOOM: f32 = 0.1;
pub(in crate::app) const MAX_ZOOM: f32 = 4.0;

/// The interaction core is plain state mutation on the view model; the egui
/// handlers below only translate pointer events into these calls, so the
/// whole layer is testable without a rendering surface.
impl ViewModel {
    pub(in crate::app) fn set_hover(&mut self, hovered: Option<usize>) {
        if self.hovered == hovered {
            return;
        }

        self.hovered = hovered;
        self.emphasis = match (hovered, self.graph_cache.as_ref()) {
            (Some(focus), Some(cache)) => Some(highlight::neighbor_emphasis(cache, focus)),
            _ => None,
        };
    }

    pub(in crate::app) fn begin_drag(&mut self, index: usize) {
        let Some(cache) = self.graph_cache.as_mut() else {
            return;
        };
        let Some(node) = cache.nodes.get_mut(index) else {
            return;
        };

        node.pin = Some(node.world_pos);
        cache.sim.reheat(REHEAT_ENERGY);
        self.drag = Some(index);
    }

    pub(in crate::app) fn update_drag(&mut self, world: Vec2) {
        let Some(index) = self.drag else {
            return;
        };
        let Some(cache) = self.graph_cache.as_mut() else {
            return;
        };

        if let Some(node) = cache.nodes.get_mut(index) {
            node.pin = Some(world);
            node.world_pos = world;
            cache.sim.reheat(REHEAT_ENERGY);
        }
    }

    pub(in crate::app) fn end_drag(&mut self) {
        let Some(index) = self.drag.take() else {
            return;
        };
        let Some(cache) = self.graph_cache.as_mut() else {
            return;
        };

        if let Some(node) = cache.nodes.get_mut(index) {
            node.pin = None;
        }
        cache.sim.cool();
    }

    /// Zoom anchored at the pointer: the world point under the cursor stays
    /// under the cursor, and the scale never leaves [MIN_ZOOM, MAX_ZOOM].
    pub(in crate::app) fn apply_zoom_factor(&mut self, rect: Rect, pointer: Pos2, factor: f32) {
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);
        self.zoom = (self.zoom * factor.clamp(0.5, 2.0)).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn apply_zoom(&mut self, rect: Rect, pointer: Pos2, scroll: f32) {
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.apply_zoom_factor(rect, pointer, zoom_factor);
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let (scroll, pinch) = ui.input(|input| (input.raw_scroll_delta.y, input.zoom_delta()));
        if scroll.abs() <= f32::EPSILON && (pinch - 1.0).abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        if scroll.abs() > f32::EPSILON {
            self.apply_zoom(rect, pointer, scroll);
        }
        if (pinch - 1.0).abs() > f32::EPSILON {
            self.apply_zoom_factor(rect, pointer, pinch);
        }
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan_by(response.drag_delta());
        }
    }

    /// Primary drag on a node moves the node; primary drag on empty space
    /// pans the view.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(index) = hovered
        {
            self.begin_drag(index);
        }

        if self.drag.is_some() {
            if let Some(pointer) = response.interact_pointer_pos() {
                let world = screen_to_world(rect, self.pan, self.zoom, pointer);
                self.update_drag(world);
            }
            if response.drag_stopped_by(egui::PointerButton::Primary) {
                self.end_drag();
            }
        } else if response.dragged_by(egui::PointerButton::Primary) {
            self.pan_by(response.drag_delta());
        }
    }

    pub(in crate::app) fn visible_indices_into(
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
        out: &mut Vec<usize>,
    ) {
        out.clear();
        out.extend(
            (0..screen_positions.len())
                .filter(|&index| circle_visible(rect, screen_positions[index], screen_radii[index])),
        );
    }

    pub(in crate::app) fn hovered_index(
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<(usize, f32)> {
        let pointer_pos = ui.input(|input| input.pointer.hover_pos());
        pointer_pos.and_then(|pointer| {
            visible_indices
                .iter()
                .filter_map(|index| {
                    let distance = screen_positions[*index].distance(pointer);
                    if distance <= screen_radii[*index] {
                        Some((*index, distance))
                    } else {
                        None
                    }
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use eframe::egui::{Pos2, Rect, vec2};

    use crate::data::{PageGraph, PageLink};

    use super::super::super::physics::{SimPhase, step_simulation};
    use super::super::super::{PhysicsConfig, ViewModel};
    use super::*;

    fn page_graph(nodes: &[&str], links: &[(&str, &str)]) -> PageGraph {
        PageGraph::from_parts(
            nodes.iter().map(|id| (*id).to_owned()).collect(),
            links
                .iter()
                .map(|(source, target)| PageLink {
                    source: (*source).to_owned(),
                    target: (*target).to_owned(),
                })
                .collect(),
        )
    }

    fn model(nodes: &[&str], links: &[(&str, &str)]) -> ViewModel {
        let mut model = ViewModel::new(page_graph(nodes, links), None, 100, 0.0);
        model.rebuild_render_graph();
        model
    }

    fn index_of(model: &ViewModel, id: &str) -> usize {
        model.graph_cache.as_ref().unwrap().index_by_id[id]
    }

    #[test]
    fn hover_emphasizes_the_node_and_its_neighbors() {
        let mut model = model(&["X", "A", "B", "C"], &[("X", "A"), ("B", "X"), ("A", "C")]);
        let x = index_of(&model, "X");
        let a = index_of(&model, "A");
        let b = index_of(&model, "B");

        model.set_hover(Some(x));
        let emphasis = model.emphasis.as_ref().unwrap();
        assert_eq!(emphasis.focus, x);
        assert_eq!(emphasis.nodes, HashSet::from([x, a, b]));
        assert_eq!(emphasis.edges, HashSet::from([(x, a), (b, x)]));

        model.set_hover(None);
        assert!(model.emphasis.is_none());
        assert!(model.hovered.is_none());
    }

    #[test]
    fn drag_start_pins_at_the_current_position_and_reheats() {
        let mut model = model(&["A", "B"], &[("A", "B")]);
        let a = index_of(&model, "A");

        // Let the initial layout settle first.
        let config = PhysicsConfig::default();
        loop {
            let cache = model.graph_cache.as_mut().unwrap();
            if !step_simulation(cache, config) {
                break;
            }
        }

        model.begin_drag(a);
        let cache = model.graph_cache.as_ref().unwrap();
        assert_eq!(cache.nodes[a].pin, Some(cache.nodes[a].world_pos));
        assert_eq!(cache.sim.phase(), SimPhase::Running);
    }

    #[test]
    fn drag_move_follows_the_pointer_in_world_space() {
        let mut model = model(&["A", "B"], &[("A", "B")]);
        let a = index_of(&model, "A");

        model.begin_drag(a);
        let target = vec2(250.0, -80.0);
        model.update_drag(target);

        let cache = model.graph_cache.as_ref().unwrap();
        assert_eq!(cache.nodes[a].pin, Some(target));
        assert_eq!(cache.nodes[a].world_pos, target);

        // Forces cannot move it off the pin.
        let config = PhysicsConfig::default();
        let cache = model.graph_cache.as_mut().unwrap();
        for _ in 0..30 {
            step_simulation(cache, config);
        }
        assert_eq!(cache.nodes[a].world_pos, target);
    }

    #[test]
    fn drag_round_trip_restores_simulation_motion() {
        let mut model = model(&["A", "B"], &[("A", "B")]);
        let a = index_of(&model, "A");

        model.begin_drag(a);
        let pinned = model.graph_cache.as_ref().unwrap().nodes[a].world_pos;
        model.end_drag();

        let cache = model.graph_cache.as_ref().unwrap();
        assert!(cache.nodes[a].pin.is_none());
        assert_eq!(cache.sim.phase(), SimPhase::Cooling);
        assert!(model.drag.is_none());

        let config = PhysicsConfig::default();
        let cache = model.graph_cache.as_mut().unwrap();
        for _ in 0..30 {
            step_simulation(cache, config);
        }
        assert_ne!(cache.nodes[a].world_pos, pinned);
    }

    #[test]
    fn zoom_is_clamped_to_the_allowed_range() {
        let mut model = model(&["A"], &[]);
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
        let pointer = Pos2::new(400.0, 300.0);

        for _ in 0..400 {
            model.apply_zoom(rect, pointer, 120.0);
        }
        assert_eq!(model.zoom, MAX_ZOOM);

        for _ in 0..400 {
            model.apply_zoom(rect, pointer, -120.0);
        }
        assert_eq!(model.zoom, MIN_ZOOM);
    }

    #[test]
    fn zoom_keeps_the_world_point_under_the_pointer() {
        let mut model = model(&["A"], &[]);
        model.pan = vec2(40.0, -25.0);
        model.zoom = 1.3;

        let rect = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
        let pointer = Pos2::new(220.0, 410.0);
        let before = screen_to_world(rect, model.pan, model.zoom, pointer);

        model.apply_zoom(rect, pointer, 90.0);
        let after = screen_to_world(rect, model.pan, model.zoom, pointer);

        assert!((after - before).length() < 1e-3);
    }

    #[test]
    fn pan_accumulates_deltas() {
        let mut model = model(&["A"], &[]);
        model.pan_by(vec2(10.0, 4.0));
        model.pan_by(vec2(-3.0, 6.0));
        assert_eq!(model.pan, vec2(7.0, 10.0));
    }
}
