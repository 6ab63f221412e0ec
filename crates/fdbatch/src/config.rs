//! Application configuration from CLI flags and environment.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use fdbatch_core::dataset::common_header;
use fdbatch_core::error::BatchError;
use fdbatch_core::run_config::RunConfig;

/// Batch parameter estimation and sample construction for fast-dm.
#[derive(Parser, Debug)]
#[command(name = "fdbatch", version = crate::version::version(), about)]
pub struct AppConfig {
    /// Verbose output (tool output and info-level logging).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only print result paths).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fit every dataset of a run configuration and aggregate the estimates.
    Estimate(EstimateArgs),
    /// Construct simulated samples.
    Simulate(SimulateArgs),
    /// Print the control-file template of a run configuration.
    Template(TemplateArgs),
    /// Generate shell completion.
    Completion {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments of `estimate`.
#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// Run configuration (JSON).
    #[arg(short, long)]
    pub config: PathBuf,

    /// Concurrent fitting processes per wave.
    #[arg(short, long, env = "FDBATCH_JOBS")]
    pub jobs: Option<usize>,

    /// Session name, overriding the configuration.
    #[arg(long)]
    pub session: Option<String>,

    /// Skip the CDF pass.
    #[arg(long)]
    pub no_cdf: bool,
}

impl EstimateArgs {
    /// Load the run configuration and apply the command-line overrides.
    pub fn load(&self) -> Result<RunConfig, BatchError> {
        let mut run = load_run_config(&self.config)?;
        if let Some(jobs) = self.jobs {
            run.jobs = jobs;
        }
        if let Some(session) = &self.session {
            run.session_name.clone_from(session);
        }
        if self.no_cdf {
            run.save.cdf = false;
        }
        Ok(run)
    }
}

/// Arguments of `simulate`.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Simulation configuration (JSON).
    #[arg(short, long)]
    pub config: PathBuf,
}

/// Arguments of `template`.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Run configuration (JSON).
    #[arg(short, long)]
    pub config: PathBuf,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

/// Read a run configuration, taking the column names from the datasets'
/// shared header when the file does not list them.
pub fn load_run_config(path: &Path) -> Result<RunConfig, BatchError> {
    let mut run = RunConfig::from_file(path)?;
    if !run.datasets.is_empty() {
        let header = common_header(&run.datasets)?;
        if run.columns.is_empty() {
            run.columns = header;
        }
    }
    Ok(run)
}
