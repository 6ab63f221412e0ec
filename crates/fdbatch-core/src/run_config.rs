//! Run and simulation configuration.
//!
//! Both configurations are plain serde structs read from JSON. Parameters are
//! kept as a list rather than a map so that their order (which drives the
//! order of `set`/`depends` lines) survives a round trip.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::PRECISION_RANGE;
use crate::error::BatchError;

/// Estimation method understood by the fitting tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Maximum likelihood.
    Ml,
    /// Kolmogorov-Smirnov.
    #[default]
    Ks,
    /// Chi-square.
    Cs,
}

impl Method {
    /// Keyword used in control files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ml => "ml",
            Self::Ks => "ks",
            Self::Cs => "cs",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One model parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name (`a`, `zr`, `v`, ...).
    pub name: String,
    /// Value used when the parameter is fixed.
    pub value: f64,
    /// Whether the parameter is fixed to `value` instead of estimated.
    #[serde(default)]
    pub fixed: bool,
    /// Columns the parameter is allowed to vary by, in order.
    #[serde(default)]
    pub depends_on: Vec<String>,
}

impl ParameterSpec {
    fn free(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            fixed: false,
            depends_on: Vec::new(),
        }
    }

    fn fixed(name: &str, value: f64) -> Self {
        Self {
            fixed: true,
            ..Self::free(name, value)
        }
    }
}

/// Default parameter set of the diffusion model.
#[must_use]
pub fn default_parameters() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::free("a", 1.0),
        ParameterSpec::free("zr", 0.5),
        ParameterSpec::free("v", 1.0),
        ParameterSpec::free("t0", 0.3),
        ParameterSpec::fixed("d", 0.0),
        ParameterSpec::fixed("szr", 0.0),
        ParameterSpec::fixed("sv", 0.0),
        ParameterSpec::fixed("st0", 0.0),
        ParameterSpec::fixed("p", 0.0),
    ]
}

/// Paths to the external executables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executables {
    /// Parameter-fitting tool (`fast-dm`).
    pub fit: PathBuf,
    /// Curve-prediction tool (`plot-cdf`).
    #[serde(default)]
    pub predict_cdf: Option<PathBuf>,
    /// Sample-construction tool (`construct-samples`).
    #[serde(default)]
    pub construct_samples: Option<PathBuf>,
}

/// Which artifacts are written next to the consolidated table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOptions {
    /// Write a reusable `session.ctl`.
    #[serde(default = "enabled")]
    pub control_file: bool,
    /// Compute merged empirical/predicted CDF files.
    #[serde(default = "enabled")]
    pub cdf: bool,
}

fn enabled() -> bool {
    true
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            control_file: true,
            cdf: true,
        }
    }
}

fn default_precision() -> f64 {
    3.0
}

fn default_jobs() -> usize {
    1
}

/// Static configuration of one estimation batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Estimation method.
    #[serde(default)]
    pub method: Method,
    /// Fitting precision.
    #[serde(default = "default_precision")]
    pub precision: f64,
    /// Model parameters, in control-file order.
    #[serde(default = "default_parameters")]
    pub parameters: Vec<ParameterSpec>,
    /// Dataset column names. Read from the first dataset when empty.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Index of the response column.
    pub response_column: Option<usize>,
    /// Index of the reaction-time column.
    pub time_column: Option<usize>,
    /// Number of fitting processes run at once.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Dataset files.
    pub datasets: Vec<PathBuf>,
    /// Directory the session directory is created in.
    pub output_dir: PathBuf,
    /// Requested session directory name.
    pub session_name: String,
    /// External tools.
    pub executables: Executables,
    /// Extra artifacts.
    #[serde(default)]
    pub save: SaveOptions,
}

impl RunConfig {
    /// Load a run configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, BatchError> {
        let content = std::fs::read_to_string(path).map_err(|e| BatchError::io(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| BatchError::Config(format!("{}: {e}", path.display())))
    }

    /// Name of the response column, if set and in range.
    #[must_use]
    pub fn response_name(&self) -> Option<&str> {
        self.response_column
            .and_then(|i| self.columns.get(i))
            .map(String::as_str)
    }

    /// Name of the reaction-time column, if set and in range.
    #[must_use]
    pub fn time_name(&self) -> Option<&str> {
        self.time_column
            .and_then(|i| self.columns.get(i))
            .map(String::as_str)
    }

    /// Check every precondition of a batch.
    pub fn validate(&self) -> Result<(), BatchError> {
        let fail = |msg: &str| Err(BatchError::Config(msg.to_string()));

        if self.datasets.is_empty() {
            return fail("no data files loaded");
        }
        let (Some(response), Some(time)) = (self.response_column, self.time_column) else {
            return fail("both a response column and a reaction-time column must be specified");
        };
        if response == time {
            return fail("response and reaction-time columns must differ");
        }
        if response >= self.columns.len() || time >= self.columns.len() {
            return Err(BatchError::Config(format!(
                "column index out of range (dataset has {} columns)",
                self.columns.len()
            )));
        }
        let reserved = [&self.columns[response], &self.columns[time]];
        for param in &self.parameters {
            if let Some(col) = param.depends_on.iter().find(|c| reserved.contains(c)) {
                return Err(BatchError::Config(format!(
                    "parameter {} cannot depend on {col}, which is the response or time column",
                    param.name
                )));
            }
        }
        if !(PRECISION_RANGE.0..=PRECISION_RANGE.1).contains(&self.precision) {
            return Err(BatchError::Config(format!(
                "precision {} outside [{}, {}]",
                self.precision, PRECISION_RANGE.0, PRECISION_RANGE.1
            )));
        }
        if self.jobs == 0 {
            return fail("at least one job must run at a time");
        }
        if self.session_name.trim().is_empty() {
            return fail("no session name specified");
        }
        if !self.output_dir.is_dir() {
            return Err(BatchError::Config(format!(
                "output location {} does not exist",
                self.output_dir.display()
            )));
        }
        if !self.executables.fit.is_file() {
            return Err(BatchError::Config(format!(
                "could not find fast-dm executable at {}",
                self.executables.fit.display()
            )));
        }
        Ok(())
    }
}

/// The eight diffusion-model parameters used for simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffusionParameters {
    pub a: f64,
    pub zr: f64,
    pub v: f64,
    pub t0: f64,
    pub d: f64,
    pub szr: f64,
    pub sv: f64,
    pub st0: f64,
}

impl Default for DiffusionParameters {
    fn default() -> Self {
        Self {
            a: 1.0,
            zr: 0.5,
            v: 1.0,
            t0: 0.3,
            d: 0.0,
            szr: 0.0,
            sv: 0.0,
            st0: 0.0,
        }
    }
}

fn default_sim_precision() -> f64 {
    4.0
}

fn default_trials() -> u32 {
    500
}

fn default_samples() -> u32 {
    1
}

/// Configuration of one sample-construction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Generating parameters.
    #[serde(default)]
    pub parameters: DiffusionParameters,
    /// Simulation precision.
    #[serde(default = "default_sim_precision")]
    pub precision: f64,
    /// Trials per sample.
    #[serde(default = "default_trials")]
    pub trials: u32,
    /// Number of samples.
    #[serde(default = "default_samples")]
    pub samples: u32,
    /// Deterministic (non-random) sampling.
    #[serde(default)]
    pub deterministic: bool,
    /// Directory the simulation directory is created in.
    pub output_dir: PathBuf,
    /// Requested simulation directory name.
    pub session_name: String,
    /// Sample-construction tool.
    pub construct_samples: PathBuf,
}

impl SimulationConfig {
    /// Load a simulation configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, BatchError> {
        let content = std::fs::read_to_string(path).map_err(|e| BatchError::io(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| BatchError::Config(format!("{}: {e}", path.display())))
    }

    /// Check the preconditions of a simulation run.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.session_name.trim().is_empty() {
            return Err(BatchError::Config("no directory name specified".into()));
        }
        if !self.output_dir.is_dir() {
            return Err(BatchError::Config(format!(
                "output location {} does not exist",
                self.output_dir.display()
            )));
        }
        if !self.construct_samples.is_file() {
            return Err(BatchError::Config(format!(
                "could not find construct-samples executable at {}",
                self.construct_samples.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn sample_config(dir: &Path) -> RunConfig {
        let fit = dir.join("fast-dm");
        std::fs::write(&fit, "").unwrap();
        RunConfig {
            method: Method::Ks,
            precision: 3.0,
            parameters: default_parameters(),
            columns: vec!["RESPONSE".into(), "TIME".into(), "cond".into()],
            response_column: Some(0),
            time_column: Some(1),
            jobs: 2,
            datasets: vec![dir.join("s1.dat")],
            output_dir: dir.to_path_buf(),
            session_name: "session".into(),
            executables: Executables {
                fit,
                predict_cdf: None,
                construct_samples: None,
            },
            save: SaveOptions::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        let dir = TempDir::new().unwrap();
        assert!(sample_config(dir.path()).validate().is_ok());
    }

    #[test]
    fn empty_datasets_rejected() {
        let dir = TempDir::new().unwrap();
        let mut cfg = sample_config(dir.path());
        cfg.datasets.clear();
        assert!(matches!(cfg.validate(), Err(BatchError::Config(_))));
    }

    #[test]
    fn response_and_time_must_be_set_and_distinct() {
        let dir = TempDir::new().unwrap();
        let mut cfg = sample_config(dir.path());
        cfg.time_column = None;
        assert!(cfg.validate().is_err());

        cfg.time_column = Some(0);
        assert!(cfg.validate().is_err());

        cfg.time_column = Some(7);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn dependency_on_response_column_rejected() {
        let dir = TempDir::new().unwrap();
        let mut cfg = sample_config(dir.path());
        cfg.parameters[0].depends_on = vec!["TIME".into()];
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("cannot depend on TIME"));

        cfg.parameters[0].depends_on = vec!["cond".into()];
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn precision_out_of_range_rejected() {
        let dir = TempDir::new().unwrap();
        let mut cfg = sample_config(dir.path());
        cfg.precision = 5.5;
        assert!(cfg.validate().is_err());
        cfg.precision = 1.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_jobs_rejected() {
        let dir = TempDir::new().unwrap();
        let mut cfg = sample_config(dir.path());
        cfg.jobs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_executable_rejected() {
        let dir = TempDir::new().unwrap();
        let mut cfg = sample_config(dir.path());
        cfg.executables.fit = dir.path().join("nope");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn json_defaults_fill_in() {
        let json = r#"{
            "response_column": 0,
            "time_column": 1,
            "datasets": ["a.dat"],
            "output_dir": "/tmp",
            "session_name": "s",
            "executables": { "fit": "/usr/bin/fast-dm" }
        }"#;
        let cfg: RunConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.method, Method::Ks);
        assert!((cfg.precision - 3.0).abs() < f64::EPSILON);
        assert_eq!(cfg.jobs, 1);
        assert_eq!(cfg.parameters.len(), 9);
        assert_eq!(cfg.parameters[0].name, "a");
        assert!(cfg.parameters[4].fixed);
        assert!(cfg.save.cdf && cfg.save.control_file);
    }

    #[test]
    fn method_parses_lowercase() {
        let m: Method = serde_json::from_str("\"ml\"").unwrap();
        assert_eq!(m, Method::Ml);
        assert_eq!(Method::Cs.to_string(), "cs");
        assert!(serde_json::from_str::<Method>("\"xx\"").is_err());
    }

    #[test]
    fn simulation_defaults() {
        let json = r#"{
            "output_dir": "/tmp",
            "session_name": "sim",
            "construct_samples": "/usr/bin/construct-samples"
        }"#;
        let cfg: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.trials, 500);
        assert_eq!(cfg.samples, 1);
        assert!(!cfg.deterministic);
        assert!((cfg.precision - 4.0).abs() < f64::EPSILON);
        assert_eq!(cfg.parameters, DiffusionParameters::default());
    }

    #[test]
    fn from_file_reports_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(RunConfig::from_file(&path), Err(BatchError::Config(_))));
        assert!(matches!(
            RunConfig::from_file(&dir.path().join("missing.json")),
            Err(BatchError::Io { .. })
        ));
    }
}
