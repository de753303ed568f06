//! end to end catalog construction.
//!
//! The pipeline aggregates input fasta files, runs an all vs all skani
//! comparison, normalizes its output, clusters the genomes into vOTUs and asks
//! seqkit to extract the representative records into the final catalog.
//! skani and seqkit are external processes, only the thread count is passed
//! through to skani, its internal parallelism is opaque to us.

use std::path::Path;
use std::process::Command;
use std::time::SystemTime;

use anyhow::{anyhow, Context};
use cpu_time::ProcessTime;

use crate::cluster::{self, Clusters};
use crate::fasta;
use crate::graph;
use crate::params::{ClusterThresholds, PipelineParams};
use crate::reformat;

const EXTERNAL_TOOLS: [&str; 2] = ["skani", "seqkit"];

fn find_in_path(tool: &str) -> bool {
    if let Some(paths) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&paths) {
            if dir.join(tool).is_file() {
                return true;
            }
        }
    }
    false
} // end of find_in_path

/// checks that skani and seqkit resolve on PATH before any work begins.
pub fn check_external_dependencies() -> anyhow::Result<()> {
    let missing: Vec<&str> = EXTERNAL_TOOLS
        .iter()
        .copied()
        .filter(|tool| !find_in_path(tool))
        .collect();
    if !missing.is_empty() {
        return Err(anyhow!(
            "missing external dependencies: {}. Install skani from https://github.com/bluenote-1577/skani \
             and seqkit from https://bioinf.shenwei.me/seqkit/, and ensure they are on your PATH.",
            missing.join(", ")
        ));
    }
    Ok(())
} // end of check_external_dependencies

/// runs an external command, failing fast on a non zero exit.
pub fn run_command(command: &mut Command, error_message: &str) -> anyhow::Result<()> {
    println!("--> Running: {:?}", command);
    log::info!("running command : {:?}", command);
    let status = command
        .status()
        .with_context(|| format!("{} Could not launch {:?}", error_message, command))?;
    if !status.success() {
        return Err(anyhow!(
            "{} Command failed ({}): {:?}",
            error_message,
            status,
            command
        ));
    }
    Ok(())
} // end of run_command

fn resident_mem_gb() -> Option<f64> {
    memory_stats::memory_stats().map(|usage| usage.physical_mem as f64 / 1.0e9)
} // end of resident_mem_gb

/// reads sequence lengths from fna, builds the similarity graph from the
/// normalized ani file, clusters and writes the cluster table to out.
/// It is an error if fna holds no sequence, nothing is written in that case.
pub fn perform_clustering(
    fna: &Path,
    ani: &Path,
    out: &Path,
    thresholds: &ClusterThresholds,
) -> anyhow::Result<Clusters> {
    let start_t = SystemTime::now();
    let cpu_start = ProcessTime::now();
    //
    println!("--> Reading and sorting sequences by length...");
    let seq_lengths = fasta::read_fasta_lengths(fna)?;
    if seq_lengths.is_empty() {
        return Err(anyhow!("no sequences found in {:?}, nothing to cluster", fna));
    }
    println!("    {} sequences loaded for clustering.", seq_lengths.len());
    //
    println!("\n--> Building similarity graph from ANI results...");
    let edges = graph::load_ani_edges(ani, thresholds, seq_lengths.keys())?;
    let nb_edges: usize = edges.values().map(|n| n.len()).sum::<usize>() / 2;
    println!("    {} edges retained that meet thresholds.", nb_edges);
    //
    println!("\n--> Performing greedy clustering...");
    let clusters = cluster::greedy_star_clustering(&seq_lengths, &edges);
    let cpu_time = cpu_start.elapsed().as_secs_f64();
    let elapsed_t = start_t.elapsed().unwrap_or_default().as_secs_f64();
    match resident_mem_gb() {
        Some(mem) => println!(
            "    Found {} total clusters. (elapsed time(s) {:.2}, cpu time(s) {:.2}, resident mem: {:.2} GB)",
            clusters.len(), elapsed_t, cpu_time, mem
        ),
        None => println!(
            "    Found {} total clusters. (elapsed time(s) {:.2}, cpu time(s) {:.2})",
            clusters.len(), elapsed_t, cpu_time
        ),
    }
    //
    println!("\n--> Writing cluster results...");
    cluster::write_clusters(out, &clusters)
        .with_context(|| format!("could not write cluster table {:?}", out))?;
    println!("Clustering complete. Results saved to {:?}.", out);
    Ok(clusters)
} // end of perform_clustering

/// the full pipeline : aggregate, skani, reformat, cluster, extract catalog.
pub fn run_pipeline(params: &PipelineParams) -> anyhow::Result<()> {
    check_external_dependencies()?;
    println!("Starting genome catalog creation pipeline");
    let output_dir = params.get_output_dir();
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output directory {:?}", output_dir))?;
    //
    println!("\n--- Step 1: Aggregating FASTA files ---");
    let all_fasta_path = output_dir.join("all_genomes.fa");
    let fasta_files = fasta::aggregate_fasta_dir(params.get_input_dir(), &all_fasta_path)?;
    println!(
        "Combined {} files into {:?}.",
        fasta_files.len(),
        all_fasta_path
    );
    //
    println!("\n--- Step 2: Calculating all-vs-all ANI with skani ---");
    let skani_output_path = output_dir.join("skani_results.txt");
    let mut skani_command = Command::new("skani");
    skani_command
        .arg("triangle")
        .arg(&all_fasta_path)
        .arg("-o")
        .arg(&skani_output_path)
        .arg("-t")
        .arg(params.get_threads().to_string())
        // each contig is an individual genome
        .arg("-i")
        // -m 200 recommended for small genomes, --slow for an accurate
        // alignment fraction, -E for an edge list, -s 90 screens at ~90% ANI
        .args(["-m", "200", "--slow", "-E", "--faster-small", "-s", "90"]);
    run_command(&mut skani_command, "skani execution failed.")?;
    println!("skani results saved to {:?}.", skani_output_path);
    //
    println!("\n--- Step 3: Reformatting skani output for clustering ---");
    let reformatted_ani_path = output_dir.join("ani_formatted.txt");
    reformat::format_skani_output(&skani_output_path, &reformatted_ani_path)?;
    println!("Formatted ANI data saved to {:?}.", reformatted_ani_path);
    //
    println!("\n--- Step 4: Clustering genomes into vOTUs ---");
    let cluster_path = output_dir.join(format!("{}_clusters.tsv", params.get_prefix()));
    let clusters = perform_clustering(
        &all_fasta_path,
        &reformatted_ani_path,
        &cluster_path,
        params.get_thresholds(),
    )?;
    //
    println!("\n--- Step 5: Generating final representative catalog ---");
    let representative_ids_path = output_dir.join("representative_ids.txt");
    cluster::write_representative_ids(&representative_ids_path, &clusters).with_context(|| {
        format!(
            "could not write representative ids {:?}",
            representative_ids_path
        )
    })?;
    params
        .dump_json(output_dir)
        .map_err(|msg| anyhow!(msg))?;
    //
    let final_fasta_path = output_dir.join(format!("{}_vOTU_catalog.fasta", params.get_prefix()));
    let mut seqkit_command = Command::new("seqkit");
    seqkit_command
        .arg("grep")
        .arg("-f")
        .arg(&representative_ids_path)
        .arg(&all_fasta_path)
        .arg("-o")
        .arg(&final_fasta_path);
    run_command(&mut seqkit_command, "seqkit grep failed.")?;
    println!("Final dereplicated catalog saved to {:?}.", final_fasta_path);
    //
    let final_count = fasta::count_fasta_records(&final_fasta_path)?;
    println!(
        "\nTotal representative sequences in the final catalog: {}",
        final_count
    );
    println!("\nWorkflow complete");
    Ok(())
} // end of run_pipeline

//===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_run_command_success_and_failure() {
        assert!(run_command(&mut Command::new("true"), "true failed.").is_ok());
        let err = run_command(&mut Command::new("false"), "false failed.").unwrap_err();
        assert!(err.to_string().contains("false failed."));
        assert!(run_command(&mut Command::new("vcatalog-no-such-tool"), "launch failed.").is_err());
    }

    #[test]
    fn test_find_in_path() {
        assert!(find_in_path("sh"));
        assert!(!find_in_path("vcatalog-no-such-tool"));
    }

    #[test]
    fn test_perform_clustering_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let fna = dir.path().join("all_genomes.fa");
        let mut file = std::fs::File::create(&fna).unwrap();
        // genome_a longest, genome_b close to it, genome_c unrelated
        write!(
            file,
            ">genome_a\n{}\n>genome_b\n{}\n>genome_c\n{}\n",
            "A".repeat(100),
            "C".repeat(90),
            "G".repeat(50)
        )
        .unwrap();
        let ani = dir.path().join("ani_formatted.txt");
        std::fs::write(&ani, "genome_a\tgenome_b\t1\t96.50\t90.00\t90.00\n").unwrap();
        let out = dir.path().join("clusters.tsv");
        let clusters = perform_clustering(
            &fna,
            &ani,
            &out,
            &ClusterThresholds::new(95.0, 85.0, 85.0),
        )
        .unwrap();
        assert_eq!(clusters.len(), 2);
        let table = std::fs::read_to_string(&out).unwrap();
        assert_eq!(table, "representative\tmembers\ngenome_a\tgenome_a,genome_b\ngenome_c\tgenome_c\n");
    }

    #[test]
    fn test_perform_clustering_empty_fasta_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let fna = dir.path().join("all_genomes.fa");
        std::fs::write(&fna, "").unwrap();
        let ani = dir.path().join("ani_formatted.txt");
        std::fs::write(&ani, "").unwrap();
        let out = dir.path().join("clusters.tsv");
        let res = perform_clustering(&fna, &ani, &out, &ClusterThresholds::default());
        assert!(res.is_err());
        // fatal before any clustering work, no partial output
        assert!(!out.exists());
    }
}
