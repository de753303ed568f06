//! generation of a Slurm sbatch script wrapping a vcatalog run.
//!
//! The script mirrors --cpus-per-task into the pipeline --threads argument so
//! skani uses exactly the cores the job reserved.

/// Everything needed to write the sbatch file : Slurm directives plus the
/// pipeline arguments forwarded to vcatalog.
#[derive(Clone)]
pub struct SlurmParams {
    /// job name
    pub job_name: String,
    /// wall time limit (HH:MM:SS)
    pub time: String,
    /// memory allocation (e.g. 8G, 16000M)
    pub mem: String,
    /// partition to submit to, directive omitted when None
    pub partition: Option<String>,
    /// account to charge, directive omitted when None
    pub account: Option<String>,
    /// reserved cores, also sets --threads of the pipeline
    pub cpus_per_task: usize,
    /// mail address for notifications, mail directives omitted when None
    pub mail_user: Option<String>,
    /// notification events (BEGIN, END, FAIL, ALL)
    pub mail_type: String,
    /// stdout/stderr filename pattern (%x = job name, %j = job id)
    pub log_output: String,
    /// pipeline arguments
    pub input_dir: String,
    pub output_dir: String,
    pub min_ani: f64,
    pub min_qcov: f64,
    pub min_tcov: f64,
    pub prefix: String,
} // end of struct SlurmParams

impl Default for SlurmParams {
    fn default() -> Self {
        SlurmParams {
            job_name: "vcatalog".to_string(),
            time: "01:00:00".to_string(),
            mem: "8G".to_string(),
            partition: None,
            account: None,
            cpus_per_task: 4,
            mail_user: None,
            mail_type: "FAIL".to_string(),
            log_output: "%x_%j.out".to_string(),
            input_dir: String::new(),
            output_dir: String::new(),
            min_ani: 95.0,
            min_qcov: 0.0,
            min_tcov: 85.0,
            prefix: "catalog".to_string(),
        }
    }
} // end of default for SlurmParams

/// builds the content of the sbatch file.
pub fn generate_sbatch(params: &SlurmParams) -> String {
    let mut lines = vec!["#!/bin/bash".to_string(), String::new()];
    //
    lines.push(format!("#SBATCH --job-name={}", params.job_name));
    lines.push(format!("#SBATCH --time={}", params.time));
    lines.push(format!("#SBATCH --mem={}", params.mem));
    lines.push(format!("#SBATCH --cpus-per-task={}", params.cpus_per_task));
    lines.push(format!("#SBATCH --output={}", params.log_output));
    if let Some(partition) = &params.partition {
        lines.push(format!("#SBATCH --partition={}", partition));
    }
    if let Some(account) = &params.account {
        lines.push(format!("#SBATCH --account={}", account));
    }
    if let Some(mail_user) = &params.mail_user {
        lines.push(format!("#SBATCH --mail-user={}", mail_user));
        lines.push(format!("#SBATCH --mail-type={}", params.mail_type));
    }
    //
    lines.push(String::new());
    lines.push("# Exit on error".to_string());
    lines.push("set -e".to_string());
    lines.push(String::new());
    lines.push("echo \"Starting vcatalog job on $(hostname)\"".to_string());
    lines.push("date".to_string());
    lines.push(String::new());
    //
    let command = [
        "vcatalog".to_string(),
        "--input_dir".to_string(),
        format!("\"{}\"", params.input_dir),
        "--output_dir".to_string(),
        format!("\"{}\"", params.output_dir),
        "--threads".to_string(),
        params.cpus_per_task.to_string(),
        "--min_ani".to_string(),
        params.min_ani.to_string(),
        "--min_qcov".to_string(),
        params.min_qcov.to_string(),
        "--min_tcov".to_string(),
        params.min_tcov.to_string(),
        "--prefix".to_string(),
        format!("\"{}\"", params.prefix),
    ];
    lines.push(command.join(" "));
    lines.push(String::new());
    lines.push("echo \"Job complete.\"".to_string());
    lines.push("date".to_string());
    //
    lines.join("\n") + "\n"
} // end of generate_sbatch

//===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_sbatch_content() {
        let params = SlurmParams {
            job_name: "test_job".to_string(),
            time: "02:00:00".to_string(),
            cpus_per_task: 16,
            input_dir: "data/in".to_string(),
            output_dir: "data/out".to_string(),
            ..SlurmParams::default()
        };
        let content = generate_sbatch(&params);
        assert!(content.starts_with("#!/bin/bash\n"));
        assert!(content.contains("#SBATCH --job-name=test_job"));
        assert!(content.contains("#SBATCH --time=02:00:00"));
        assert!(content.contains("#SBATCH --cpus-per-task=16"));
        assert!(content.contains("vcatalog"));
        assert!(content.contains("--threads 16"));
        assert!(content.contains("--input_dir \"data/in\""));
        // no partition/account/mail directives unless requested
        assert!(!content.contains("--partition"));
        assert!(!content.contains("--account"));
        assert!(!content.contains("--mail-user"));
    }

    #[test]
    fn test_generate_sbatch_optional_directives() {
        let params = SlurmParams {
            partition: Some("short".to_string()),
            account: Some("lab42".to_string()),
            mail_user: Some("user@example.org".to_string()),
            input_dir: "in".to_string(),
            output_dir: "out".to_string(),
            ..SlurmParams::default()
        };
        let content = generate_sbatch(&params);
        assert!(content.contains("#SBATCH --partition=short"));
        assert!(content.contains("#SBATCH --account=lab42"));
        assert!(content.contains("#SBATCH --mail-user=user@example.org"));
        assert!(content.contains("#SBATCH --mail-type=FAIL"));
    }
}
