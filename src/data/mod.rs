use std::collections::{HashMap, HashSet};

mod load;

pub use load::{load_graph, load_scores};

/// Per-node importance scores, keyed by node id. Values are sanitized to be
/// finite and non-negative at load time.
pub type ScoreMap = HashMap<String, f64>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLink {
    pub source: String,
    pub target: String,
}

/// A page-link graph as supplied by the data source. Immutable once built;
/// the render layer derives its own filtered view from it on every rebuild.
#[derive(Clone, Debug, Default)]
pub struct PageGraph {
    /// Unique node ids, input order preserved.
    pub nodes: Vec<String>,
    /// Directed links as loaded. Links whose endpoints are unknown are kept
    /// here and dropped at selection time.
    pub links: Vec<PageLink>,
}

impl PageGraph {
    pub fn from_parts(nodes: Vec<String>, links: Vec<PageLink>) -> Self {
        let mut seen = HashSet::with_capacity(nodes.len());
        let nodes = nodes
            .into_iter()
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .collect::<Vec<_>>();

        Self { nodes, links }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Links that reference at least one node absent from the node list.
    pub fn dangling_link_count(&self) -> usize {
        let known = self.nodes.iter().map(String::as_str).collect::<HashSet<_>>();
        self.links
            .iter()
            .filter(|link| {
                !known.contains(link.source.as_str()) || !known.contains(link.target.as_str())
            })
            .count()
    }
}
