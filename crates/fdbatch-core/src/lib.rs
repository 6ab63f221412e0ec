//! # fdbatch-core
//!
//! Core library for running fast-dm over many datasets: run configuration,
//! control-file templates, session layout, parameter-file parsing, dataset
//! loading, empirical CDFs, cancellation, and progress observers.

pub mod constants;
pub mod dataset;
pub mod ecdf;
pub mod error;
pub mod observer;
pub mod observers;
pub mod params_file;
pub mod progress;
pub mod run_config;
pub mod session;
pub mod template;

// Re-exports
pub use constants::exit_codes;
pub use ecdf::{CdfRecord, EmpiricalCdf};
pub use error::{BatchError, FailureReason};
pub use observer::{ProgressObserver, ProgressSubject};
pub use params_file::ParameterFile;
pub use progress::{CancellationToken, ProgressUpdate};
pub use run_config::{Method, RunConfig, SimulationConfig};
pub use session::SessionDirectory;
pub use template::ConfigTemplate;
