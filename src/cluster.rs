//! greedy star clustering of genomes into vOTUs.
//!
//! Genomes are visited longest first. Each still-unassigned genome founds a
//! cluster and claims its still-unassigned direct neighbors. Membership is one
//! hop only : a genome never joins a cluster through another member, so a chain
//! of marginal similarities cannot merge dissimilar genomes transitively.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;

use crate::graph::AniGraph;

/// representative -> members, representative first in each member list.
/// Iteration order is cluster discovery order, which output files must preserve.
pub type Clusters = IndexMap<String, Vec<String>>;

// total order over vertices : length descending, identifier ascending.
// The identifier tie break makes the whole clustering deterministic.
fn cmp_by_length_desc(
    a: &String,
    b: &String,
    seq_lengths: &HashMap<String, usize>,
) -> std::cmp::Ordering {
    seq_lengths[b].cmp(&seq_lengths[a]).then_with(|| a.cmp(b))
} // end of cmp_by_length_desc

/// Clusters sequences by greedy representative choice (star topology).
///
/// `edges` must only connect vertices present in `seq_lengths`. A vertex with
/// no graph entry is treated as having no neighbors and becomes a singleton
/// when its turn arrives. For fixed inputs the result is bit-identical across
/// runs, member ordering included.
pub fn greedy_star_clustering(
    seq_lengths: &HashMap<String, usize>,
    edges: &AniGraph,
) -> Clusters {
    let mut seqs_sorted: Vec<&String> = seq_lengths.keys().collect();
    seqs_sorted.sort_by(|a, b| cmp_by_length_desc(a, b, seq_lengths));
    //
    let mut unassigned: HashSet<&String> = seqs_sorted.iter().copied().collect();
    let mut clusters = Clusters::new();
    let no_neighbors = Vec::new();
    //
    for &seq_id in &seqs_sorted {
        if !unassigned.remove(seq_id) {
            continue;
        }
        let mut neighbor_list: Vec<&String> = edges
            .get(seq_id)
            .unwrap_or(&no_neighbors)
            .iter()
            .filter(|neighbor| unassigned.contains(*neighbor))
            .collect();
        neighbor_list.sort_by(|a, b| cmp_by_length_desc(a, b, seq_lengths));
        //
        let mut members = vec![seq_id.clone()];
        for neighbor in neighbor_list {
            // parallel edges can repeat a neighbor, only the first claim counts
            if unassigned.remove(neighbor) {
                members.push(neighbor.clone());
            }
        }
        clusters.insert(seq_id.clone(), members);
    }
    log::info!(
        "greedy_star_clustering, nb sequences : {}, nb clusters : {}",
        seq_lengths.len(),
        clusters.len()
    );
    clusters
} // end of greedy_star_clustering

/// dumps the partition as a tsv table : representative, tab, comma joined members.
pub fn write_clusters(path: &Path, clusters: &Clusters) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "representative\tmembers")?;
    for (rep_id, members) in clusters {
        writeln!(out, "{}\t{}", rep_id, members.join(","))?;
    }
    out.flush()?;
    Ok(())
} // end of write_clusters

/// dumps representative ids, one per line in discovery order.
/// This is the id list handed to the extraction tool building the final catalog.
pub fn write_representative_ids(path: &Path, clusters: &Clusters) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for rep_id in clusters.keys() {
        writeln!(out, "{}", rep_id)?;
    }
    out.flush()?;
    Ok(())
} // end of write_representative_ids

//===========================================================================
