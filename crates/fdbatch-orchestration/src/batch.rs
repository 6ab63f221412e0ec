//! Wave-based batch runner for the fitting tool.
//!
//! Datasets are processed in sequential waves of at most `jobs` concurrent
//! processes. A wave is aggregated into the consolidated table only after
//! every one of its processes exited cleanly; a failure or a cancellation
//! ends the batch, leaving the rows of earlier waves in place. A wave during
//! which cancellation was requested is never aggregated.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use fdbatch_core::constants::{DEFAULT_POLL_INTERVAL, ERROR_MARKERS};
use fdbatch_core::error::{BatchError, FailureReason};
use fdbatch_core::observer::ProgressObserver;
use fdbatch_core::progress::{CancellationToken, ProgressUpdate};
use fdbatch_core::run_config::RunConfig;
use fdbatch_core::session::{dataset_file_name, SessionDirectory};
use fdbatch_core::template::ConfigTemplate;

use crate::aggregate::ResultAggregator;
use crate::process::{wait_all, CapturedProcess, WaitOutcome};

/// Terminal state of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every dataset was fitted and aggregated.
    Completed,
    /// A job reported an error or produced unusable output.
    Failed(FailureReason),
    /// The caller cancelled the batch.
    Cancelled,
}

/// Summary of a finished batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// How the batch ended.
    pub outcome: BatchOutcome,
    /// Datasets aggregated into the table.
    pub completed: usize,
    /// Datasets in the batch.
    pub total: usize,
    /// Waves started.
    pub waves: usize,
    /// Session directory the results live in.
    pub session: SessionDirectory,
    /// Consolidated table.
    pub table: PathBuf,
    /// Wall time.
    pub duration: Duration,
}

/// One fitting job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    /// Position of the dataset in the batch.
    pub index: usize,
    /// Dataset file.
    pub dataset: PathBuf,
    /// Dataset file name.
    pub name: String,
    /// Scratch control file.
    pub control_file: PathBuf,
    /// Parameter file the tool is told to write.
    pub output_file: PathBuf,
}

impl JobDescriptor {
    fn new(index: usize, dataset: &Path, session: &SessionDirectory) -> Self {
        let name = dataset_file_name(dataset);
        Self {
            index,
            dataset: dataset.to_path_buf(),
            control_file: session.scratch_control_file(index),
            output_file: session.parameter_file(&name),
            name,
        }
    }
}

/// Sizes of the waves needed for `total` datasets at `jobs` per wave.
#[must_use]
pub fn plan_waves(total: usize, jobs: usize) -> Vec<usize> {
    let jobs = jobs.max(1);
    (0..total.div_ceil(jobs))
        .map(|w| jobs.min(total - w * jobs))
        .collect()
}

/// First error marker contained in captured tool output.
///
/// Matching is a case-sensitive substring search, so `"no error found"`
/// counts as an error.
#[must_use]
pub fn find_error_marker(output: &str) -> Option<&'static str> {
    ERROR_MARKERS.into_iter().find(|m| output.contains(m))
}

/// Runs the fitting tool over every dataset of a [`RunConfig`].
pub struct JobBatchRunner<'a> {
    config: &'a RunConfig,
    template: ConfigTemplate,
    poll_interval: Duration,
}

impl<'a> JobBatchRunner<'a> {
    /// Create a runner for a configuration.
    #[must_use]
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            template: ConfigTemplate::build(config),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the liveness poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Control-file template used for every job.
    #[must_use]
    pub fn template(&self) -> &ConfigTemplate {
        &self.template
    }

    /// Run the batch to a terminal state.
    ///
    /// `Err` is returned only for faults of the coordinator itself (invalid
    /// configuration, file system, spawning); job failures and cancellation
    /// come back as [`BatchOutcome`] values.
    pub fn run(
        &self,
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
    ) -> Result<BatchReport, BatchError> {
        self.config.validate()?;
        let start = Instant::now();

        let session = SessionDirectory::resolve(&self.config.output_dir, &self.config.session_name)?;
        let params_dir = session.parameters_dir();
        std::fs::create_dir_all(&params_dir).map_err(|e| BatchError::io(&params_dir, e))?;
        if self.config.save.control_file {
            self.write_session_control_file(&session)?;
        }
        let mut aggregator = ResultAggregator::create(&session.table_path())?;

        let total = self.config.datasets.len();
        let jobs: Vec<JobDescriptor> = self
            .config
            .datasets
            .iter()
            .enumerate()
            .map(|(i, d)| JobDescriptor::new(i, d, &session))
            .collect();
        info!(
            session = %session.name(),
            datasets = total,
            jobs = self.config.jobs,
            "Starting batch"
        );

        let mut waves = 0usize;
        let mut offset = 0usize;
        let outcome = 'waves: {
            for size in plan_waves(total, self.config.jobs) {
                let wave = &jobs[offset..offset + size];
                offset += size;
                if cancel.is_cancelled() {
                    break 'waves BatchOutcome::Cancelled;
                }
                waves += 1;
                info!(wave = waves, size = wave.len(), "Starting wave");

                match self.run_wave(wave, cancel, observer)? {
                    WaveResult::Cancelled => break 'waves BatchOutcome::Cancelled,
                    WaveResult::Failed(reason) => break 'waves BatchOutcome::Failed(reason),
                    WaveResult::Exited => {}
                }

                for job in wave {
                    let row = match aggregator.normalize(&job.name, &job.output_file) {
                        Ok(row) => row,
                        Err(reason) => break 'waves BatchOutcome::Failed(reason),
                    };
                    aggregator.append(&row)?;
                    observer.on_progress(&ProgressUpdate::new(aggregator.rows(), total, &job.name));
                }
            }
            BatchOutcome::Completed
        };

        match &outcome {
            BatchOutcome::Completed => info!(datasets = total, "Batch completed"),
            BatchOutcome::Failed(reason) => warn!("Batch failed: {reason}"),
            BatchOutcome::Cancelled => info!(completed = aggregator.rows(), "Batch cancelled"),
        }

        Ok(BatchReport {
            outcome,
            completed: aggregator.rows(),
            total,
            waves,
            table: session.table_path(),
            session,
            duration: start.elapsed(),
        })
    }

    fn run_wave(
        &self,
        wave: &[JobDescriptor],
        cancel: &CancellationToken,
        observer: &dyn ProgressObserver,
    ) -> Result<WaveResult, BatchError> {
        let mut processes = Vec::with_capacity(wave.len());
        for job in wave {
            let contents = self.template.render(
                &job.dataset.to_string_lossy(),
                &job.output_file.to_string_lossy(),
            );
            std::fs::write(&job.control_file, contents)
                .map_err(|e| BatchError::io(&job.control_file, e))?;
            processes.push(CapturedProcess::spawn(
                &self.config.executables.fit,
                [&job.control_file],
                job.name.clone(),
            )?);
        }

        let waited = wait_all(&mut processes, cancel, self.poll_interval)?;
        // The tools may have exited before the tick that would have seen the
        // token; the wave still counts as cancelled.
        if waited == WaitOutcome::Cancelled || cancel.is_cancelled() {
            remove_control_files(wave);
            return Ok(WaveResult::Cancelled);
        }

        for (job, process) in wave.iter().zip(&processes) {
            let log = process.output()?;
            observer.on_log(&log);
            if let Some(marker) = find_error_marker(&log) {
                // Control files of a failed wave stay behind for inspection.
                return Ok(WaveResult::Failed(FailureReason::ErrorMarker {
                    dataset: job.name.clone(),
                    marker: marker.to_string(),
                }));
            }
        }

        remove_control_files(wave);
        Ok(WaveResult::Exited)
    }

    /// Write `session.ctl`, a control file that fits every dataset of the
    /// data directory in one fitting-tool run.
    fn write_session_control_file(&self, session: &SessionDirectory) -> Result<(), BatchError> {
        let Some(first) = self.config.datasets.first() else {
            return Ok(());
        };
        let data_dir = first.parent().unwrap_or_else(|| Path::new("."));
        let pattern = match first.extension() {
            Some(ext) => format!("*.{}", ext.to_string_lossy()),
            None => "*".to_string(),
        };
        let load = data_dir.join(pattern);
        let save = session.parameters_dir().join("*.dat");
        let path = session.control_file_path();
        std::fs::write(
            &path,
            self.template
                .render(&load.to_string_lossy(), &save.to_string_lossy()),
        )
        .map_err(|e| BatchError::io(&path, e))
    }
}

enum WaveResult {
    Exited,
    Failed(FailureReason),
    Cancelled,
}

fn remove_control_files(wave: &[JobDescriptor]) {
    for job in wave {
        if let Err(e) = std::fs::remove_file(&job.control_file) {
            debug!("could not remove {}: {e}", job.control_file.display());
        }
    }
}
