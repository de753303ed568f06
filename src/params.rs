//! structures related to clustering and pipeline parameters

use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::to_writer;

/// Thresholds applied to a candidate similarity edge, all on a percentage scale
/// with inclusive comparisons. An edge is kept when ani, query coverage and
/// target coverage are all at or above their minimum.
#[derive(Copy, Clone, Serialize, Deserialize)]
pub struct ClusterThresholds {
    /// minimum ANI percentage
    min_ani: f64,
    /// minimum query coverage percentage. Defaults to 0 (unconstrained), the
    /// two coverage thresholds are configured independently on purpose.
    min_qcov: f64,
    /// minimum target coverage percentage
    min_tcov: f64,
} // end of struct ClusterThresholds

impl Default for ClusterThresholds {
    fn default() -> Self {
        ClusterThresholds {
            min_ani: 95.0,
            min_qcov: 0.0,
            min_tcov: 85.0,
        }
    }
} // end of default for ClusterThresholds

impl ClusterThresholds {
    pub fn new(min_ani: f64, min_qcov: f64, min_tcov: f64) -> Self {
        ClusterThresholds {
            min_ani,
            min_qcov,
            min_tcov,
        }
    } // end of new

    /// returns minimum ani
    pub fn get_min_ani(&self) -> f64 {
        self.min_ani
    }

    /// returns minimum query coverage
    pub fn get_min_qcov(&self) -> f64 {
        self.min_qcov
    }

    /// returns minimum target coverage
    pub fn get_min_tcov(&self) -> f64 {
        self.min_tcov
    }

    /// true if an edge with these values passes all three thresholds
    pub fn accept(&self, ani: f64, qcov: f64, tcov: f64) -> bool {
        ani >= self.min_ani && qcov >= self.min_qcov && tcov >= self.min_tcov
    }
} // end of impl ClusterThresholds

//=========================================================================================

/// Gathers all parameters of a catalog run.
/// Dumped to json in the output directory so a catalog records how it was built.
#[derive(Clone, Serialize, Deserialize)]
pub struct PipelineParams {
    /// directory containing input fasta files
    input_dir: PathBuf,
    /// directory receiving all outputs
    output_dir: PathBuf,
    /// number of threads passed through to skani
    threads: usize,
    /// edge acceptance thresholds
    thresholds: ClusterThresholds,
    /// prefix of output file names
    prefix: String,
} // end of struct PipelineParams

impl PipelineParams {
    pub fn new(
        input_dir: PathBuf,
        output_dir: PathBuf,
        threads: usize,
        thresholds: ClusterThresholds,
        prefix: String,
    ) -> Self {
        PipelineParams {
            input_dir,
            output_dir,
            threads,
            thresholds,
            prefix,
        }
    } // end of new

    pub fn get_input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn get_output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn get_threads(&self) -> usize {
        self.threads
    }

    pub fn get_thresholds(&self) -> &ClusterThresholds {
        &self.thresholds
    }

    pub fn get_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn dump_json(&self, dirpath: &Path) -> Result<(), String> {
        //
        let filepath = dirpath.join("parameters.json");
        //
        log::info!("dumping PipelineParams in json file : {:?}", filepath);
        //
        let fileres = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&filepath);
        if fileres.is_err() {
            log::error!(
                "PipelineParams dump : dump could not open file {:?}",
                filepath.as_os_str()
            );
            println!(
                "PipelineParams dump: could not open file {:?}",
                filepath.as_os_str()
            );
            return Err("PipelineParams dump failed".to_string());
        }
        //
        let mut writer = BufWriter::new(fileres.unwrap());
        to_writer(&mut writer, &self).map_err(|_| "PipelineParams dump failed".to_string())?;
        //
        Ok(())
    } // end of dump_json

    /// reload from a json dump, to check how a given catalog was produced.
    pub fn reload_json(dirpath: &Path) -> Result<Self, String> {
        log::info!("in reload_json");
        //
        let filepath = dirpath.join("parameters.json");
        let fileres = OpenOptions::new().read(true).open(&filepath);
        if fileres.is_err() {
            log::error!(
                "PipelineParams reload_json : reload could not open file {:?}",
                filepath.as_os_str()
            );
            println!(
                "PipelineParams reload_json: could not open file {:?}",
                filepath.as_os_str()
            );
            return Err("PipelineParams reload_json could not open file".to_string());
        }
        //
        let loadfile = fileres.unwrap();
        let reader = BufReader::new(loadfile);
        let params: Self = serde_json::from_reader(reader)
            .map_err(|_| "PipelineParams reload_json parse failed".to_string())?;
        //
        log::info!(
            "PipelineParams reload, min_ani : {}, min_qcov : {}, min_tcov : {}",
            params.thresholds.get_min_ani(),
            params.thresholds.get_min_qcov(),
            params.thresholds.get_min_tcov()
        );
        //
        Ok(params)
    } // end of reload_json
} // end of impl PipelineParams

//===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_defaults() {
        let thresholds = ClusterThresholds::default();
        assert_eq!(thresholds.get_min_ani(), 95.0);
        assert_eq!(thresholds.get_min_qcov(), 0.0);
        assert_eq!(thresholds.get_min_tcov(), 85.0);
    }

    #[test]
    fn test_threshold_accept_is_inclusive() {
        let thresholds = ClusterThresholds::new(95.0, 85.0, 85.0);
        assert!(thresholds.accept(95.0, 85.0, 85.0));
        assert!(thresholds.accept(96.5, 90.0, 90.0));
        assert!(!thresholds.accept(94.99, 90.0, 90.0));
        assert!(!thresholds.accept(96.5, 84.99, 90.0));
        assert!(!thresholds.accept(96.5, 90.0, 84.99));
    }

    #[test]
    fn test_params_dump_reload() {
        let dir = tempfile::tempdir().unwrap();
        let params = PipelineParams::new(
            PathBuf::from("genomes"),
            PathBuf::from("out"),
            8,
            ClusterThresholds::new(97.0, 10.0, 80.0),
            "catalog".to_string(),
        );
        params.dump_json(dir.path()).unwrap();
        let reloaded = PipelineParams::reload_json(dir.path()).unwrap();
        assert_eq!(reloaded.get_threads(), 8);
        assert_eq!(reloaded.get_prefix(), "catalog");
        assert_eq!(reloaded.get_thresholds().get_min_ani(), 97.0);
        assert_eq!(reloaded.get_thresholds().get_min_qcov(), 10.0);
        assert_eq!(reloaded.get_thresholds().get_min_tcov(), 80.0);
    }

    #[test]
    fn test_params_reload_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PipelineParams::reload_json(dir.path()).is_err());
    }
}
