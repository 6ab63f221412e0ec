//! # fdbatch-orchestration
//!
//! Wave-based execution of the fitting tool, result aggregation, CDF
//! post-processing, and sample construction.

pub mod aggregate;
pub mod batch;
pub mod cdf;
pub mod interfaces;
pub mod process;
pub mod sample;

#[cfg(all(test, unix))]
mod test_support;

pub use batch::{BatchOutcome, BatchReport, JobBatchRunner};
pub use cdf::{CdfPostProcessor, CdfReport};
pub use interfaces::ReportPresenter;
pub use sample::{SampleConstructionRunner, SampleOutcome, SampleReport};
