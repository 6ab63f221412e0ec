//! Predicted and empirical CDFs for every dataset of a finished batch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use fdbatch_core::constants::{DEFAULT_POLL_INTERVAL, PARAMETER_FILE_PREFIX};
use fdbatch_core::dataset::load_signed_times;
use fdbatch_core::ecdf::{parse_curve, CdfRecord, EmpiricalCdf};
use fdbatch_core::error::BatchError;
use fdbatch_core::observer::ProgressObserver;
use fdbatch_core::params_file::ParameterFile;
use fdbatch_core::progress::CancellationToken;
use fdbatch_core::run_config::RunConfig;
use fdbatch_core::session::{dataset_file_name, dataset_stem, SessionDirectory};

use crate::batch::{BatchOutcome, BatchReport};
use crate::process::{wait_all, CapturedProcess};

/// Command-line flag of the curve-prediction tool for a parameter name.
#[must_use]
pub fn predict_flag(name: &str) -> Option<&'static str> {
    match name {
        "a" => Some("-a"),
        "zr" => Some("-z"),
        "v" => Some("-v"),
        "t0" => Some("-t"),
        "d" => Some("-d"),
        "szr" => Some("-Z"),
        "sv" => Some("-V"),
        "st0" => Some("-T"),
        "precision" => Some("-p"),
        _ => None,
    }
}

/// Arguments for the curve-prediction tool.
///
/// Parameters without a flag (`fit`, `time`, ...) are skipped, values that
/// do not parse as numbers are passed through unchanged.
#[must_use]
pub fn predict_cdf_args(params: &ParameterFile, output: &Path) -> Vec<String> {
    let mut args = Vec::new();
    for (name, value) in params.entries() {
        let Some(flag) = predict_flag(name) else {
            continue;
        };
        args.push(flag.to_string());
        args.push(
            value
                .parse::<f64>()
                .map_or_else(|_| value.to_string(), |v| format!("{v:.2}")),
        );
    }
    args.push("-o".to_string());
    args.push(output.to_string_lossy().into_owned());
    args
}

/// Result of a CDF pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CdfReport {
    /// Merged files written.
    pub written: Vec<PathBuf>,
    /// Datasets skipped because of an error.
    pub skipped: Vec<String>,
}

/// Writes `<cdf>/parameters_<stem>_cdf.csv` for every dataset of a batch.
pub struct CdfPostProcessor<'a> {
    config: &'a RunConfig,
    session: SessionDirectory,
    predict_cdf: PathBuf,
    response_column: usize,
    time_column: usize,
    poll_interval: Duration,
}

impl<'a> CdfPostProcessor<'a> {
    /// Processor for a finished batch.
    ///
    /// `None` unless the batch completed, curves were requested, and the
    /// configuration names a curve-prediction tool and both roles.
    #[must_use]
    pub fn for_batch(config: &'a RunConfig, report: &BatchReport) -> Option<Self> {
        if report.outcome != BatchOutcome::Completed || !config.save.cdf {
            return None;
        }
        let predict_cdf = config.executables.predict_cdf.clone()?;
        Some(Self {
            config,
            session: report.session.clone(),
            predict_cdf,
            response_column: config.response_column?,
            time_column: config.time_column?,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Override the liveness poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Process every dataset. Per-dataset problems are reported and skipped.
    pub fn run(&self, observer: &dyn ProgressObserver) -> Result<CdfReport, BatchError> {
        let cdf_dir = self.session.cdf_dir();
        std::fs::create_dir_all(&cdf_dir).map_err(|e| BatchError::io(&cdf_dir, e))?;

        let mut report = CdfReport::default();
        for dataset in &self.config.datasets {
            let name = dataset_file_name(dataset);
            match self.process(dataset, &cdf_dir, observer) {
                Ok(path) => {
                    debug!(dataset = %name, "CDF written to {}", path.display());
                    report.written.push(path);
                }
                Err(e) => {
                    warn!(dataset = %name, "CDF skipped: {e}");
                    observer.on_log(&format!("Could not compute CDF for {name}: {e}"));
                    report.skipped.push(name);
                }
            }
        }
        info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            "CDF post-processing finished"
        );
        Ok(report)
    }

    fn process(
        &self,
        dataset: &Path,
        cdf_dir: &Path,
        observer: &dyn ProgressObserver,
    ) -> Result<PathBuf, BatchError> {
        let params_path = self.session.parameter_file(&dataset_file_name(dataset));
        let params = ParameterFile::read(&params_path).map_err(|e| BatchError::io(&params_path, e))?;

        let stem = dataset_stem(dataset);
        let predicted_path = cdf_dir.join(format!(".{PARAMETER_FILE_PREFIX}{stem}_cdf.csv"));
        let merged_path = cdf_dir.join(format!("{PARAMETER_FILE_PREFIX}{stem}_cdf.csv"));

        let mut tool = vec![CapturedProcess::spawn(
            &self.predict_cdf,
            predict_cdf_args(&params, &predicted_path),
            dataset_file_name(dataset),
        )?];
        // Runs to completion; cancellation is not offered once a batch is done.
        let merged = wait_all(&mut tool, &CancellationToken::new(), self.poll_interval)
            .and_then(|_| tool[0].output())
            .and_then(|log| {
                observer.on_log(&log);
                self.merge(dataset, &predicted_path, &merged_path)
            });

        if predicted_path.exists() {
            if let Err(e) = std::fs::remove_file(&predicted_path) {
                debug!("could not remove {}: {e}", predicted_path.display());
            }
        }
        merged.map(|()| merged_path)
    }

    fn merge(&self, dataset: &Path, predicted_path: &Path, merged_path: &Path) -> Result<(), BatchError> {
        let predicted_text =
            std::fs::read_to_string(predicted_path).map_err(|e| BatchError::io(predicted_path, e))?;
        let predicted = parse_curve(&predicted_text).map_err(|reason| BatchError::ParameterFile {
            path: predicted_path.to_path_buf(),
            reason,
        })?;

        let times = load_signed_times(dataset, self.response_column, self.time_column)?;
        let empirical = EmpiricalCdf::new(&times).with_finite_left_edge();
        let record = CdfRecord::new(empirical, predicted);
        std::fs::write(merged_path, record.to_table()).map_err(|e| BatchError::io(merged_path, e))
    }
}
