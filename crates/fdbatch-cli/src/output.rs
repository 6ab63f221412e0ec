//! CLI output formatting.

use std::time::Duration;

use fdbatch_orchestration::batch::{BatchOutcome, BatchReport};
use fdbatch_orchestration::cdf::CdfReport;
use fdbatch_orchestration::sample::{SampleOutcome, SampleReport};

/// Format a duration for display.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.2}s")
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:.1}s")
    }
}

/// Summary lines for a finished batch. The first line is the headline.
#[must_use]
pub fn batch_summary(report: &BatchReport) -> Vec<String> {
    let headline = match &report.outcome {
        BatchOutcome::Completed => format!("Batch completed: {} dataset(s)", report.total),
        BatchOutcome::Failed(reason) => format!("Batch failed: {reason}"),
        BatchOutcome::Cancelled => format!(
            "Batch cancelled after {}/{} dataset(s)",
            report.completed, report.total
        ),
    };
    vec![
        headline,
        format!("Session: {}", report.session.root().display()),
        format!(
            "Datasets: {}/{} in {} wave(s), {}",
            report.completed,
            report.total,
            report.waves,
            format_duration(report.duration)
        ),
        format!("Estimates: {}", report.table.display()),
    ]
}

/// Summary lines for a CDF pass.
#[must_use]
pub fn cdf_summary(report: &CdfReport) -> Vec<String> {
    let mut lines = vec![format!("CDF files written: {}", report.written.len())];
    if !report.skipped.is_empty() {
        lines.push(format!("CDF skipped for: {}", report.skipped.join(", ")));
    }
    lines
}

/// Summary lines for a sample-construction run.
#[must_use]
pub fn sample_summary(report: &SampleReport) -> Vec<String> {
    let status = match report.outcome {
        SampleOutcome::Completed => "completed",
        SampleOutcome::Cancelled => "cancelled",
    };
    let mut lines = vec![
        format!("Simulation {status}"),
        format!("Samples: {}", report.pattern.display()),
    ];
    if !report.error_lines.is_empty() {
        lines.push(format!("Tool reported {} error line(s)", report.error_lines.len()));
    }
    lines
}
