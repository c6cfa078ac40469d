use std::collections::{HashSet, VecDeque};

use super::{EmphasisState, RenderGraph};

/// Emphasis for a hovered node: the node itself, its direct neighbors in
/// either direction, and the edges connecting them.
pub(super) fn neighbor_emphasis(cache: &RenderGraph, focus: usize) -> EmphasisState {
    let mut nodes = HashSet::new();
    let mut edges = HashSet::new();
    nodes.insert(focus);

    if focus < cache.nodes.len() {
        for &target in &cache.outgoing[focus] {
            nodes.insert(target);
            edges.insert((focus, target));
        }
        for &source in &cache.incoming[focus] {
            nodes.insert(source);
            edges.insert((source, focus));
        }
    }

    EmphasisState {
        focus,
        nodes,
        edges,
    }
}

/// BFS shortest path from `from` to `to` following link direction. Returns
/// empty sets when the target is unreachable.
pub(super) fn shortest_path(
    cache: &RenderGraph,
    from: usize,
    to: usize,
) -> (HashSet<usize>, HashSet<(usize, usize)>) {
    let mut path_nodes = HashSet::new();
    let mut path_edges = HashSet::new();

    if from >= cache.nodes.len() || to >= cache.nodes.len() {
        return (path_nodes, path_edges);
    }

    if from == to {
        path_nodes.insert(from);
        return (path_nodes, path_edges);
    }

    let mut queue = VecDeque::from([from]);
    let mut visited = vec![false; cache.nodes.len()];
    let mut parent = vec![usize::MAX; cache.nodes.len()];
    visited[from] = true;

    while let Some(node) = queue.pop_front() {
        if node == to {
            break;
        }

        for &next in &cache.outgoing[node] {
            if !visited[next] {
                visited[next] = true;
                parent[next] = node;
                queue.push_back(next);
            }
        }
    }

    if !visited[to] {
        return (path_nodes, path_edges);
    }

    let mut cursor = to;
    path_nodes.insert(cursor);

    while cursor != from {
        let prev = parent[cursor];
        if prev == usize::MAX {
            break;
        }

        path_edges.insert((prev, cursor));
        path_nodes.insert(prev);
        cursor = prev;
    }

    (path_nodes, path_edges)
}

#[cfg(test)]
mod tests {
    use eframe::egui::Vec2;

    use super::super::{RenderGraph, RenderNode};
    use super::*;

    fn render_graph(count: usize, edges: &[(usize, usize)]) -> RenderGraph {
        let nodes = (0..count)
            .map(|index| RenderNode {
                id: format!("n{index}"),
                world_pos: Vec2::ZERO,
                velocity: Vec2::ZERO,
                pin: None,
                score: 0.0,
                base_radius: 6.0,
            })
            .collect();
        RenderGraph::new(nodes, edges.to_vec())
    }

    #[test]
    fn emphasis_covers_focus_and_direct_neighbors() {
        // 0 -> 1, 2 -> 0, 1 -> 3; node 3 is not adjacent to 0.
        let cache = render_graph(4, &[(0, 1), (2, 0), (1, 3)]);

        let emphasis = neighbor_emphasis(&cache, 0);
        assert_eq!(emphasis.focus, 0);
        assert_eq!(
            emphasis.nodes,
            HashSet::from([0, 1, 2]),
        );
        assert_eq!(emphasis.edges, HashSet::from([(0, 1), (2, 0)]));
    }

    #[test]
    fn path_follows_link_direction() {
        let cache = render_graph(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);

        let (nodes, edges) = shortest_path(&cache, 0, 2);
        assert_eq!(nodes, HashSet::from([0, 1, 2]));
        assert_eq!(edges, HashSet::from([(0, 1), (1, 2)]));
    }

    #[test]
    fn unreachable_target_yields_empty_sets() {
        let cache = render_graph(3, &[(0, 1)]);

        let (nodes, edges) = shortest_path(&cache, 1, 2);
        assert!(nodes.is_empty());
        assert!(edges.is_empty());
    }

    #[test]
    fn path_to_self_is_the_single_node() {
        let cache = render_graph(2, &[(0, 1)]);

        let (nodes, edges) = shortest_path(&cache, 0, 0);
        assert_eq!(nodes, HashSet::from([0]));
        assert!(edges.is_empty());
    }
}
