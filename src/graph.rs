//! builds the undirected similarity graph from normalized ani rows.
//!
//! The graph is an adjacency mapping restricted to a vertex universe (the
//! identifiers read from the aggregated fasta). Self comparisons and rows
//! referencing sequences outside the universe are discarded, the comparison
//! tool may legitimately report sequences filtered out upstream.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;

use crate::params::ClusterThresholds;

/// adjacency mapping. Every universe vertex has an entry, possibly empty.
/// Edges are recorded in both directions and parallel edges accumulate,
/// which is harmless to clustering but visible in neighbor counts.
pub type AniGraph = HashMap<String, Vec<String>>;

/// reads normalized 6-column rows and retains edges meeting the thresholds.
/// Malformed rows are dropped without aborting.
pub fn build_graph<'a, R: BufRead>(
    input: R,
    thresholds: &ClusterThresholds,
    valid_ids: impl IntoIterator<Item = &'a String>,
) -> std::io::Result<AniGraph> {
    let mut edges: AniGraph = valid_ids
        .into_iter()
        .map(|id| (id.clone(), Vec::new()))
        .collect();
    let mut nb_edges = 0usize;
    for line in input.lines() {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            log::trace!("dropping short row : {}", line);
            continue;
        }
        let (qname, tname) = (fields[0], fields[1]);
        if qname == tname || !edges.contains_key(qname) || !edges.contains_key(tname) {
            continue;
        }
        let ani = fields[3].parse::<f64>();
        let qcov = fields[4].parse::<f64>();
        let tcov = fields[5].parse::<f64>();
        match (ani, qcov, tcov) {
            (Ok(ani), Ok(qcov), Ok(tcov)) => {
                if thresholds.accept(ani, qcov, tcov) {
                    edges.get_mut(qname).unwrap().push(tname.to_string());
                    edges.get_mut(tname).unwrap().push(qname.to_string());
                    nb_edges += 1;
                }
            }
            _ => {
                log::trace!("dropping non numeric row : {}", line);
            }
        }
    }
    log::info!("build_graph, nb edges retained : {}", nb_edges);
    Ok(edges)
} // end of build_graph

/// builds the graph from the normalized ani file at path.
pub fn load_ani_edges<'a>(
    path: &Path,
    thresholds: &ClusterThresholds,
    valid_ids: impl IntoIterator<Item = &'a String>,
) -> anyhow::Result<AniGraph> {
    let file =
        File::open(path).with_context(|| format!("cannot open ani edge file {:?}", path))?;
    let graph = build_graph(BufReader::new(file), thresholds, valid_ids)?;
    Ok(graph)
} // end of load_ani_edges

//===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn universe(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn graph_from(rows: &str, thresholds: &ClusterThresholds, ids: &[&str]) -> AniGraph {
        let ids = universe(ids);
        build_graph(rows.as_bytes(), thresholds, ids.iter()).unwrap()
    }

    #[test]
    fn test_edge_is_undirected() {
        let rows = "x\ty\t1\t96.50\t90.00\t90.00\n";
        let graph = graph_from(rows, &ClusterThresholds::new(95.0, 85.0, 85.0), &["x", "y"]);
        assert_eq!(graph["x"], vec!["y".to_string()]);
        assert_eq!(graph["y"], vec!["x".to_string()]);
    }

    #[test]
    fn test_thresholds_inclusive_and_rejecting() {
        let rows = "x\ty\t1\t96.50\t90.00\t90.00\n";
        // same row fails when min_tcov is raised to 95
        let graph = graph_from(rows, &ClusterThresholds::new(95.0, 85.0, 95.0), &["x", "y"]);
        assert!(graph["x"].is_empty());
        assert!(graph["y"].is_empty());
        // exact threshold values pass
        let rows = "x\ty\t1\t95.00\t85.00\t85.00\n";
        let graph = graph_from(rows, &ClusterThresholds::new(95.0, 85.0, 85.0), &["x", "y"]);
        assert_eq!(graph["x"].len(), 1);
    }

    #[test]
    fn test_self_comparison_discarded() {
        let rows = "x\tx\t1\t99.00\t99.00\t99.00\n";
        let graph = graph_from(rows, &ClusterThresholds::default(), &["x"]);
        assert!(graph["x"].is_empty());
    }

    #[test]
    fn test_out_of_universe_rows_discarded() {
        let rows = "x\tz\t1\t99.00\t99.00\t99.00\nz\tx\t1\t99.00\t99.00\t99.00\n";
        let graph = graph_from(rows, &ClusterThresholds::default(), &["x", "y"]);
        assert!(graph["x"].is_empty());
        assert!(!graph.contains_key("z"));
    }

    #[test]
    fn test_every_vertex_has_an_entry() {
        let graph = graph_from("", &ClusterThresholds::default(), &["a", "b", "c"]);
        assert_eq!(graph.len(), 3);
        assert!(graph.values().all(|n| n.is_empty()));
    }

    #[test]
    fn test_parallel_edges_accumulate() {
        let rows = "x\ty\t1\t96.00\t90.00\t90.00\ny\tx\t1\t97.00\t90.00\t90.00\n";
        let graph = graph_from(rows, &ClusterThresholds::default(), &["x", "y"]);
        assert_eq!(graph["x"].len(), 2);
        assert_eq!(graph["y"].len(), 2);
    }

    #[test]
    fn test_malformed_rows_dropped() {
        let rows = "x\ty\t1\tbad\t90.00\t90.00\nx\ty\t1\t96.00\n";
        let graph = graph_from(rows, &ClusterThresholds::default(), &["x", "y"]);
        assert!(graph["x"].is_empty());
    }
}
