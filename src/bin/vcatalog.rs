//! vcatalog --input_dir [-i] dir --output_dir [-o] dir [--threads nb] [--min_ani a] [--min_qcov q] [--min_tcov t] [--prefix p]
//!
//! --input_dir : directory containing the fasta files (*.fa, *.fasta, *.fna) to dereplicate.
//! --output_dir : directory receiving all intermediate and final outputs.
//! --threads : number of threads passed to skani. Defaults to the number of logical cpus.
//! --min_ani : minimum ANI percentage for an edge (default 95).
//! --min_qcov : minimum query coverage percentage (default 0, unconstrained).
//! --min_tcov : minimum target coverage percentage (default 85).
//! --prefix : prefix of the cluster table and catalog file names (default catalog).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Arg, Command};

// for logging (debug mostly, switched at run time through RUST_LOG)
use env_logger::Builder;

use vcatalog::params::{ClusterThresholds, PipelineParams};
use vcatalog::pipeline::run_pipeline;

// install a logger facility
pub fn init_log() -> u64 {
    Builder::from_default_env().init();
    println!("\n ************** initializing logger *****************\n");
    return 1;
}

fn main() -> Result<(), anyhow::Error> {
    let _ = init_log();
    //
    let matches = Command::new("vcatalog")
        .version("0.1.0")
        .about("Dereplicates a collection of viral genomes into a vOTU catalog by greedy ANI clustering")
        .arg(Arg::new("input_dir")
            .short('i')
            .long("input_dir")
            .help("directory containing input FASTA files (*.fa, *.fasta, *.fna)")
            .required(true)
            .value_name("INPUT_DIR"))
        .arg(Arg::new("output_dir")
            .short('o')
            .long("output_dir")
            .help("directory to store all output files")
            .required(true)
            .value_name("OUTPUT_DIR"))
        .arg(Arg::new("threads")
            .short('t')
            .long("threads")
            .help("number of threads to use for skani (default: number of logical cpus)")
            .value_name("THREADS"))
        .arg(Arg::new("min_ani")
            .long("min_ani")
            .help("minimum ANI percentage for clustering")
            .default_value("95.0")
            .value_name("MIN_ANI"))
        .arg(Arg::new("min_qcov")
            .long("min_qcov")
            .help("minimum query coverage percentage for clustering")
            .default_value("0.0")
            .value_name("MIN_QCOV"))
        .arg(Arg::new("min_tcov")
            .long("min_tcov")
            .help("minimum target coverage percentage for clustering")
            .default_value("85.0")
            .value_name("MIN_TCOV"))
        .arg(Arg::new("prefix")
            .long("prefix")
            .help("prefix for output file names")
            .default_value("catalog")
            .value_name("PREFIX"))
        .get_matches();
    //
    let input_dir = PathBuf::from(matches.get_one::<String>("input_dir").unwrap());
    let output_dir = PathBuf::from(matches.get_one::<String>("output_dir").unwrap());
    let threads = match matches.get_one::<String>("threads") {
        Some(threads) => threads
            .parse::<usize>()
            .with_context(|| "threads must be an integer")?,
        None => num_cpus::get(),
    };
    let min_ani = matches
        .get_one::<String>("min_ani")
        .unwrap()
        .parse::<f64>()
        .with_context(|| "min_ani must be numeric")?;
    let min_qcov = matches
        .get_one::<String>("min_qcov")
        .unwrap()
        .parse::<f64>()
        .with_context(|| "min_qcov must be numeric")?;
    let min_tcov = matches
        .get_one::<String>("min_tcov")
        .unwrap()
        .parse::<f64>()
        .with_context(|| "min_tcov must be numeric")?;
    let prefix = matches.get_one::<String>("prefix").unwrap().clone();
    //
    log::info!(
        "vcatalog, input_dir : {:?}, output_dir : {:?}, threads : {}, min_ani : {}, min_qcov : {}, min_tcov : {}",
        input_dir, output_dir, threads, min_ani, min_qcov, min_tcov
    );
    let params = PipelineParams::new(
        input_dir,
        output_dir,
        threads,
        ClusterThresholds::new(min_ani, min_qcov, min_tcov),
        prefix,
    );
    run_pipeline(&params)
} // end of main
