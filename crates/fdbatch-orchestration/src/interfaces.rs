//! Orchestration interfaces.

use crate::batch::BatchReport;
use crate::cdf::CdfReport;
use crate::sample::SampleReport;

/// Trait for presenting run results to the user.
pub trait ReportPresenter: Send + Sync {
    /// Present the result of an estimation batch.
    fn present_batch(&self, report: &BatchReport);

    /// Present the result of a CDF pass.
    fn present_cdf(&self, report: &CdfReport);

    /// Present the result of a sample-construction run.
    fn present_samples(&self, report: &SampleReport);

    /// Present an error.
    fn present_error(&self, error: &str);
}
