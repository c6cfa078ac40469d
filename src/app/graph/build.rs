use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::super::render_utils::{DEFAULT_NODE_RADIUS, node_radius};
use super::super::{RenderGraph, RenderNode, ViewModel};

/// Deterministic initial placement: nodes start on a circle whose radius
/// grows with the node count, so distinct indices get distinct positions.
pub(in crate::app) fn seed_position(index: usize, count: usize) -> Vec2 {
    let angle = (index as f32 / count.max(1) as f32) * TAU;
    let ring = 120.0 + ((count as f32).sqrt() * 14.0);
    vec2(angle.cos(), angle.sin()) * ring
}

impl ViewModel {
    pub(in crate::app) fn node_score(&self, id: &str) -> f64 {
        let score = self
            .scores
            .as_ref()
            .and_then(|scores| scores.get(id))
            .copied()
            .unwrap_or(0.0);
        if score.is_finite() && score >= 0.0 { score } else { 0.0 }
    }

    /// Picks the node subset to render. The whole graph fits inside the
    /// budget, or the highest-scoring nodes above the threshold win (ties by
    /// id), or, without scores, the lexicographically first ids win.
    fn selected_node_ids(&self) -> Vec<String> {
        if self.max_nodes == 0 {
            return Vec::new();
        }

        if self.graph.node_count() <= self.max_nodes {
            return self.graph.nodes.clone();
        }

        if self.scores.is_some() {
            let mut ranked = self
                .graph
                .nodes
                .iter()
                .map(|id| (self.node_score(id), id.as_str()))
                .filter(|(score, _)| *score >= self.min_score)
                .collect::<Vec<_>>();
            ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
            ranked.truncate(self.max_nodes);
            ranked.into_iter().map(|(_score, id)| id.to_owned()).collect()
        } else {
            let mut ids = self.graph.nodes.clone();
            ids.sort_unstable();
            ids.truncate(self.max_nodes);
            ids
        }
    }

    /// Links whose endpoints both survived selection, as index pairs.
    /// Dangling and budget-excluded links are skipped, self-loops and
    /// duplicates dropped.
    fn collect_edges(&self, index_by_id: &HashMap<String, usize>) -> Vec<(usize, usize)> {
        let mut edges = Vec::new();
        for link in &self.graph.links {
            if let (Some(&source), Some(&target)) = (
                index_by_id.get(&link.source),
                index_by_id.get(&link.target),
            ) && source != target
            {
                edges.push((source, target));
            }
        }
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        self.render_graph_revision = self.render_graph_revision.wrapping_add(1);
        self.search_match_cache = None;
        // Index-based transient state does not survive a rebuild.
        self.hovered = None;
        self.emphasis = None;
        self.drag = None;

        let ids = self.selected_node_ids();
        if ids.is_empty() {
            self.graph_cache = None;
            self.rendered_node_count = 0;
            self.rendered_edge_count = 0;
            self.graph_dirty = false;
            return;
        }

        let scores = ids.iter().map(|id| self.node_score(id)).collect::<Vec<_>>();
        let mut min_score = f64::INFINITY;
        let mut max_score = 0.0_f64;
        for &score in &scores {
            if score > 0.0 {
                min_score = min_score.min(score);
            }
            max_score = max_score.max(score);
        }
        if !min_score.is_finite() {
            min_score = 0.0;
        }

        let mut index_by_id = HashMap::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            index_by_id.insert(id.clone(), index);
        }
        let edges = self.collect_edges(&index_by_id);

        let mut prior_nodes = self
            .graph_cache
            .take()
            .map(|cache| {
                cache
                    .nodes
                    .into_iter()
                    .map(|node| (node.id.clone(), node))
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();

        let sized_by_score = self.scores.is_some();
        let count = ids.len();
        let nodes = ids
            .into_iter()
            .zip(scores)
            .enumerate()
            .map(|(index, (id, score))| {
                let base_radius = if sized_by_score {
                    node_radius(score, min_score, max_score)
                } else {
                    DEFAULT_NODE_RADIUS
                };

                if let Some(mut node) = prior_nodes.remove(&id) {
                    node.score = score;
                    node.base_radius = base_radius;
                    node.pin = None;
                    node
                } else {
                    RenderNode {
                        id,
                        world_pos: seed_position(index, count),
                        velocity: Vec2::ZERO,
                        pin: None,
                        score,
                        base_radius,
                    }
                }
            })
            .collect::<Vec<_>>();

        let mut cache = RenderGraph::new(nodes, edges);
        cache.sim.start();

        self.rendered_node_count = cache.nodes.len();
        self.rendered_edge_count = cache.edges.len();
        self.graph_cache = Some(cache);
        self.graph_dirty = false;
    }
}
