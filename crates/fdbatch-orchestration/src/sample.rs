//! Single-shot sample construction.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use fdbatch_core::constants::{DEFAULT_POLL_INTERVAL, SAMPLE_ERROR_MARKER};
use fdbatch_core::error::BatchError;
use fdbatch_core::observer::ProgressObserver;
use fdbatch_core::progress::CancellationToken;
use fdbatch_core::run_config::SimulationConfig;
use fdbatch_core::session::SessionDirectory;

use crate::process::{wait_all, CapturedProcess, WaitOutcome};

/// Name pattern of the generated sample files; the tool replaces `%d`.
pub const SAMPLE_FILE_PATTERN: &str = "sim_%d.lst";

/// How a sample-construction run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// The tool exited on its own.
    Completed,
    /// The caller cancelled the run and the tool was killed.
    Cancelled,
}

/// Summary of a sample-construction run.
#[derive(Debug, Clone)]
pub struct SampleReport {
    pub outcome: SampleOutcome,
    /// Simulation directory the samples were written to.
    pub directory: PathBuf,
    /// Output path pattern passed to the tool.
    pub pattern: PathBuf,
    /// Tool output lines mentioning `error`. Informational only.
    pub error_lines: Vec<String>,
}

/// Runs the sample-construction tool once.
pub struct SampleConstructionRunner<'a> {
    config: &'a SimulationConfig,
    poll_interval: Duration,
}

impl<'a> SampleConstructionRunner<'a> {
    #[must_use]
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self {
            config,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the liveness poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Tool arguments, excluding the trailing `-o <pattern>`.
    #[must_use]
    pub fn sample_args(&self) -> Vec<String> {
        let c = self.config;
        let p = &c.parameters;
        let mut args: Vec<String> = [
            ("-a", p.a),
            ("-z", p.zr),
            ("-v", p.v),
            ("-t", p.t0),
            ("-d", p.d),
            ("-Z", p.szr),
            ("-V", p.sv),
            ("-T", p.st0),
        ]
        .into_iter()
        .flat_map(|(flag, value)| [flag.to_string(), format!("{value:?}")])
        .collect();
        args.extend([
            "-n".to_string(),
            c.trials.to_string(),
            "-N".to_string(),
            c.samples.to_string(),
            "-p".to_string(),
            format!("{:?}", c.precision),
        ]);
        if !c.deterministic {
            args.push("-r".to_string());
        }
        args
    }

    /// Create the simulation directory and run the tool to completion or
    /// cancellation.
    pub fn run(
        &self,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
    ) -> Result<SampleReport, BatchError> {
        self.config.validate()?;
        let session = SessionDirectory::resolve(&self.config.output_dir, &self.config.session_name)?;
        session.create()?;
        let directory = session.root();
        let pattern = directory.join(SAMPLE_FILE_PATTERN);

        let mut args = self.sample_args();
        args.push("-o".to_string());
        args.push(pattern.to_string_lossy().into_owned());
        info!(directory = %directory.display(), samples = self.config.samples, "Constructing samples");

        let mut tool = vec![CapturedProcess::spawn(
            &self.config.construct_samples,
            &args,
            session.name(),
        )?];
        let waited = wait_all(&mut tool, cancel, self.poll_interval)?;
        let outcome = if waited == WaitOutcome::Cancelled || cancel.is_cancelled() {
            SampleOutcome::Cancelled
        } else {
            SampleOutcome::Completed
        };

        let error_lines: Vec<String> = tool[0]
            .output()?
            .lines()
            .filter(|l| l.contains(SAMPLE_ERROR_MARKER))
            .map(str::to_string)
            .collect();
        for line in &error_lines {
            observer.on_log(line);
        }

        info!(?outcome, "Sample construction finished");
        Ok(SampleReport {
            outcome,
            directory,
            pattern,
            error_lines,
        })
    }
}
