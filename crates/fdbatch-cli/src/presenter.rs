//! CLI report presenter and progress display.

use indicatif::{ProgressBar, ProgressStyle};

use fdbatch_core::observer::ProgressObserver;
use fdbatch_core::progress::ProgressUpdate;
use fdbatch_orchestration::batch::{BatchOutcome, BatchReport};
use fdbatch_orchestration::cdf::CdfReport;
use fdbatch_orchestration::interfaces::ReportPresenter;
use fdbatch_orchestration::sample::{SampleOutcome, SampleReport};

use crate::output::{batch_summary, cdf_summary, sample_summary};
use crate::ui::{print_error, print_success, print_warning};

/// CLI report presenter.
pub struct CLIReportPresenter {
    verbose: bool,
    quiet: bool,
}

impl CLIReportPresenter {
    #[must_use]
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }
}

impl ReportPresenter for CLIReportPresenter {
    fn present_batch(&self, report: &BatchReport) {
        let mut lines = batch_summary(report).into_iter();
        let headline = lines.next().unwrap_or_default();
        match &report.outcome {
            BatchOutcome::Completed if self.quiet => println!("{}", report.table.display()),
            BatchOutcome::Completed => print_success(&headline),
            BatchOutcome::Failed(_) => print_error(&headline),
            BatchOutcome::Cancelled => print_warning(&headline),
        }
        if self.quiet {
            return;
        }
        for line in lines {
            println!("  {line}");
        }
    }

    fn present_cdf(&self, report: &CdfReport) {
        if self.quiet {
            return;
        }
        for line in cdf_summary(report) {
            println!("  {line}");
        }
        if self.verbose {
            for path in &report.written {
                println!("    {}", path.display());
            }
        }
    }

    fn present_samples(&self, report: &SampleReport) {
        if self.quiet {
            if report.outcome == SampleOutcome::Completed {
                println!("{}", report.directory.display());
            }
            return;
        }
        let mut lines = sample_summary(report).into_iter();
        let headline = lines.next().unwrap_or_default();
        match report.outcome {
            SampleOutcome::Completed => print_success(&headline),
            SampleOutcome::Cancelled => print_warning(&headline),
        }
        for line in lines {
            println!("  {line}");
        }
    }

    fn present_error(&self, error: &str) {
        print_error(error);
    }
}

/// Progress bar over the datasets of a batch.
///
/// Tool output is printed above the bar in verbose mode and dropped
/// otherwise (it still reaches `tracing` through the logging observer).
pub struct CLIProgressObserver {
    bar: ProgressBar,
    echo_tool_output: bool,
}

impl CLIProgressObserver {
    /// Visible progress bar for `total` datasets.
    #[must_use]
    pub fn new(total: usize, echo_tool_output: bool) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg} ({elapsed})")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        Self {
            bar,
            echo_tool_output,
        }
    }

    /// Observer that draws nothing.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            echo_tool_output: false,
        }
    }

    /// Remove the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl ProgressObserver for CLIProgressObserver {
    fn on_progress(&self, update: &ProgressUpdate) {
        self.bar.set_length(update.total as u64);
        self.bar.set_position(update.completed as u64);
        self.bar.set_message(update.dataset.clone());
    }

    fn on_log(&self, message: &str) {
        if !self.echo_tool_output {
            return;
        }
        for line in message.lines().filter(|l| !l.trim().is_empty()) {
            self.bar.println(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn hidden_bar_tracks_position() {
        let observer = CLIProgressObserver::hidden();
        observer.on_progress(&ProgressUpdate::new(2, 5, "s2.dat"));
        assert_eq!(observer.position(), 2);
        observer.on_log("fit done\n");
        observer.finish();
    }

    #[test]
    fn presenter_modes() {
        let report = CdfReport {
            written: vec![PathBuf::from("cdf/parameters_s1_cdf.csv")],
            skipped: vec![],
        };
        CLIReportPresenter::new(true, false).present_cdf(&report);
        CLIReportPresenter::new(false, true).present_cdf(&report);
        CLIReportPresenter::new(false, false).present_error("no data files loaded");
    }

    #[test]
    fn sample_presenter_quiet_prints_directory_only() {
        let report = SampleReport {
            outcome: SampleOutcome::Cancelled,
            directory: PathBuf::from("sim"),
            pattern: PathBuf::from("sim/sim_%d.lst"),
            error_lines: vec![],
        };
        CLIReportPresenter::new(false, true).present_samples(&report);
        CLIReportPresenter::new(false, false).present_samples(&report);
    }
}
