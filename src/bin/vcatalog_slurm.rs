//! vcatalog-slurm : generates a Slurm sbatch script for a vcatalog run.
//!
//! Slurm options : --job-name [-J], --time, --mem, --partition [-p], --account [-A],
//!                 --cpus-per-task (also sets --threads of the pipeline),
//!                 --mail-user, --mail-type, --sbatch-file, --log-output
//! Pipeline options forwarded to vcatalog : --input_dir [-i], --output_dir [-o],
//!                 --min_ani, --min_qcov, --min_tcov, --prefix

use std::path::PathBuf;

use anyhow::Context;
use clap::{Arg, Command};

// for logging (debug mostly, switched at run time through RUST_LOG)
use env_logger::Builder;

use vcatalog::slurm::{generate_sbatch, SlurmParams};

// install a logger facility
pub fn init_log() -> u64 {
    Builder::from_default_env().init();
    println!("\n ************** initializing logger *****************\n");
    return 1;
}

fn main() -> Result<(), anyhow::Error> {
    let _ = init_log();
    //
    let matches = Command::new("vcatalog-slurm")
        .version("0.1.0")
        .about("Generate a Slurm batch script running the vcatalog pipeline")
        .arg(Arg::new("job_name")
            .short('J')
            .long("job-name")
            .help("name of the job")
            .default_value("vcatalog")
            .value_name("NAME"))
        .arg(Arg::new("time")
            .long("time")
            .help("wall time limit (HH:MM:SS)")
            .default_value("01:00:00")
            .value_name("TIME"))
        .arg(Arg::new("mem")
            .long("mem")
            .help("memory allocation (e.g. 8G, 16000M)")
            .default_value("8G")
            .value_name("MEM"))
        .arg(Arg::new("partition")
            .short('p')
            .long("partition")
            .help("partition to submit the job to")
            .value_name("PARTITION"))
        .arg(Arg::new("account")
            .short('A')
            .long("account")
            .help("account/project name to charge")
            .value_name("ACCOUNT"))
        .arg(Arg::new("cpus_per_task")
            .long("cpus-per-task")
            .help("number of CPU cores, also sets --threads for the pipeline")
            .default_value("4")
            .value_name("CPUS"))
        .arg(Arg::new("mail_user")
            .long("mail-user")
            .help("email address for notifications")
            .value_name("MAIL"))
        .arg(Arg::new("mail_type")
            .long("mail-type")
            .help("notify on state change (BEGIN, END, FAIL, ALL)")
            .default_value("FAIL")
            .value_name("TYPE"))
        .arg(Arg::new("sbatch_file")
            .long("sbatch-file")
            .help("name of the generated sbatch file")
            .default_value("submit_vcatalog.sbatch")
            .value_name("FILE"))
        .arg(Arg::new("log_output")
            .long("log-output")
            .help("filename pattern for stdout/stderr (%x=job_name, %j=job_id)")
            .default_value("%x_%j.out")
            .value_name("PATTERN"))
        .arg(Arg::new("input_dir")
            .short('i')
            .long("input_dir")
            .help("input directory (passed to vcatalog)")
            .required(true)
            .value_name("INPUT_DIR"))
        .arg(Arg::new("output_dir")
            .short('o')
            .long("output_dir")
            .help("output directory (passed to vcatalog)")
            .required(true)
            .value_name("OUTPUT_DIR"))
        .arg(Arg::new("min_ani")
            .long("min_ani")
            .help("minimum ANI (passed to vcatalog)")
            .default_value("95.0")
            .value_name("MIN_ANI"))
        .arg(Arg::new("min_qcov")
            .long("min_qcov")
            .help("minimum query coverage (passed to vcatalog)")
            .default_value("0.0")
            .value_name("MIN_QCOV"))
        .arg(Arg::new("min_tcov")
            .long("min_tcov")
            .help("minimum target coverage (passed to vcatalog)")
            .default_value("85.0")
            .value_name("MIN_TCOV"))
        .arg(Arg::new("prefix")
            .long("prefix")
            .help("output prefix (passed to vcatalog)")
            .default_value("catalog")
            .value_name("PREFIX"))
        .get_matches();
    //
    let params = SlurmParams {
        job_name: matches.get_one::<String>("job_name").unwrap().clone(),
        time: matches.get_one::<String>("time").unwrap().clone(),
        mem: matches.get_one::<String>("mem").unwrap().clone(),
        partition: matches.get_one::<String>("partition").cloned(),
        account: matches.get_one::<String>("account").cloned(),
        cpus_per_task: matches
            .get_one::<String>("cpus_per_task")
            .unwrap()
            .parse::<usize>()
            .with_context(|| "cpus-per-task must be an integer")?,
        mail_user: matches.get_one::<String>("mail_user").cloned(),
        mail_type: matches.get_one::<String>("mail_type").unwrap().clone(),
        log_output: matches.get_one::<String>("log_output").unwrap().clone(),
        input_dir: matches.get_one::<String>("input_dir").unwrap().clone(),
        output_dir: matches.get_one::<String>("output_dir").unwrap().clone(),
        min_ani: matches
            .get_one::<String>("min_ani")
            .unwrap()
            .parse::<f64>()
            .with_context(|| "min_ani must be numeric")?,
        min_qcov: matches
            .get_one::<String>("min_qcov")
            .unwrap()
            .parse::<f64>()
            .with_context(|| "min_qcov must be numeric")?,
        min_tcov: matches
            .get_one::<String>("min_tcov")
            .unwrap()
            .parse::<f64>()
            .with_context(|| "min_tcov must be numeric")?,
        prefix: matches.get_one::<String>("prefix").unwrap().clone(),
    };
    //
    let content = generate_sbatch(&params);
    let output_path = PathBuf::from(matches.get_one::<String>("sbatch_file").unwrap());
    std::fs::write(&output_path, &content)
        .with_context(|| format!("could not write sbatch file {:?}", output_path))?;
    log::info!("generated sbatch file {:?}", output_path);
    println!("Generated Slurm script: {:?}", output_path);
    println!("Submit with: sbatch {:?}", output_path);
    Ok(())
} // end of main
