use std::collections::{HashMap, HashSet};

use log::debug;

use crate::data::{PageGraph, ScoreMap};

const DAMPING: f64 = 0.85;
const MAX_ITERATIONS: usize = 100;
const CONVERGENCE_TOLERANCE: f64 = 1e-6;

/// Computes PageRank over the directed link structure of the graph. Ranks
/// sum to 1; dangling-node mass is redistributed uniformly. Links whose
/// endpoints are unknown are ignored.
pub fn pagerank(graph: &PageGraph) -> ScoreMap {
    let node_count = graph.node_count();
    if node_count == 0 {
        return ScoreMap::new();
    }

    let mut index_by_id = HashMap::with_capacity(node_count);
    for (index, id) in graph.nodes.iter().enumerate() {
        index_by_id.insert(id.as_str(), index);
    }

    let mut out_neighbors = vec![HashSet::new(); node_count];
    for link in &graph.links {
        if let (Some(&source), Some(&target)) = (
            index_by_id.get(link.source.as_str()),
            index_by_id.get(link.target.as_str()),
        ) && source != target
        {
            out_neighbors[source].insert(target);
        }
    }

    let uniform = 1.0 / node_count as f64;
    let mut rank = vec![uniform; node_count];
    let mut iterations = MAX_ITERATIONS;

    for iteration in 0..MAX_ITERATIONS {
        let mut next = vec![(1.0 - DAMPING) * uniform; node_count];

        let dangling_mass: f64 = (0..node_count)
            .filter(|&index| out_neighbors[index].is_empty())
            .map(|index| rank[index])
            .sum();
        let dangling_share = DAMPING * dangling_mass * uniform;
        for value in &mut next {
            *value += dangling_share;
        }

        for (index, neighbors) in out_neighbors.iter().enumerate() {
            if neighbors.is_empty() {
                continue;
            }
            let contribution = DAMPING * rank[index] / neighbors.len() as f64;
            for &neighbor in neighbors {
                next[neighbor] += contribution;
            }
        }

        let diff: f64 = next
            .iter()
            .zip(rank.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        rank = next;

        if diff < CONVERGENCE_TOLERANCE {
            iterations = iteration + 1;
            break;
        }
    }

    debug!("pagerank finished after {iterations} iterations over {node_count} nodes");

    graph
        .nodes
        .iter()
        .enumerate()
        .map(|(index, id)| (id.clone(), rank[index]))
        .collect()
}
