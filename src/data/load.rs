use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Deserialize;

use super::{PageGraph, PageLink, ScoreMap};

#[derive(Debug, Deserialize)]
struct RawGraphFile {
    #[serde(default)]
    nodes: Vec<String>,
    #[serde(default)]
    links: Vec<RawLink>,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    source: String,
    target: String,
}

pub fn load_graph(path: &Path) -> Result<PageGraph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file {}", path.display()))?;

    let parsed: RawGraphFile = serde_json::from_str(&raw)
        .with_context(|| format!("invalid graph JSON in {}", path.display()))?;

    let links = parsed
        .links
        .into_iter()
        .map(|link| PageLink {
            source: link.source,
            target: link.target,
        })
        .collect();

    let graph = PageGraph::from_parts(parsed.nodes, links);

    let dangling = graph.dangling_link_count();
    if dangling > 0 {
        debug!("graph file {}: {dangling} dangling links", path.display());
    }
    debug!(
        "loaded {} nodes, {} links from {}",
        graph.node_count(),
        graph.link_count(),
        path.display()
    );

    Ok(graph)
}

pub fn load_scores(path: &Path) -> Result<ScoreMap> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read score file {}", path.display()))?;

    let parsed: ScoreMap = serde_json::from_str(&raw)
        .with_context(|| format!("invalid score JSON in {}", path.display()))?;

    let mut coerced = 0usize;
    let scores = parsed
        .into_iter()
        .map(|(id, score)| {
            if score.is_finite() && score >= 0.0 {
                (id, score)
            } else {
                coerced += 1;
                (id, 0.0)
            }
        })
        .collect::<ScoreMap>();

    if coerced > 0 {
        warn!(
            "score file {}: coerced {coerced} negative or non-finite values to 0",
            path.display()
        );
    }

    Ok(scores)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_graph_from_file() {
        let file = write_temp(
            r#"{
                "nodes": ["Python", "Programming", "Algorithm"],
                "links": [
                    {"source": "Python", "target": "Programming"},
                    {"source": "Programming", "target": "Algorithm"}
                ]
            }"#,
        );

        let graph = load_graph(file.path()).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.link_count(), 2);
        assert_eq!(graph.links[0].source, "Python");
        assert_eq!(graph.dangling_link_count(), 0);
    }

    #[test]
    fn duplicate_nodes_are_deduplicated_preserving_order() {
        let file = write_temp(r#"{"nodes": ["B", "A", "B", "C", "A"], "links": []}"#);

        let graph = load_graph(file.path()).unwrap();
        assert_eq!(graph.nodes, vec!["B", "A", "C"]);
    }

    #[test]
    fn dangling_links_are_kept_but_counted() {
        let file = write_temp(
            r#"{
                "nodes": ["A", "B"],
                "links": [
                    {"source": "A", "target": "B"},
                    {"source": "A", "target": "Missing"}
                ]
            }"#,
        );

        let graph = load_graph(file.path()).unwrap();
        assert_eq!(graph.link_count(), 2);
        assert_eq!(graph.dangling_link_count(), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_graph(Path::new("/nonexistent/graph.json")).is_err());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let file = write_temp("{\"nodes\": [");
        assert!(load_graph(file.path()).is_err());
    }

    #[test]
    fn negative_scores_are_coerced_to_zero() {
        let file = write_temp(r#"{"A": 0.25, "B": -3.0}"#);

        let scores = load_scores(file.path()).unwrap();
        assert_eq!(scores["A"], 0.25);
        assert_eq!(scores["B"], 0.0);
    }
}
