//! Error handling and exit codes.

use fdbatch_core::constants::exit_codes;
use fdbatch_core::error::BatchError;
use fdbatch_orchestration::batch::BatchOutcome;
use fdbatch_orchestration::sample::SampleOutcome;

/// Exit code for a coordinator error.
pub fn handle_error(err: &BatchError) -> i32 {
    match err {
        BatchError::Config(_) | BatchError::SessionExhausted { .. } | BatchError::Dataset { .. } => {
            exit_codes::ERROR_CONFIG
        }
        BatchError::Io { .. } | BatchError::Spawn { .. } | BatchError::ParameterFile { .. } => {
            exit_codes::ERROR_GENERIC
        }
    }
}

/// Exit code for any error reaching the top level.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<BatchError>()
        .map_or(exit_codes::ERROR_GENERIC, handle_error)
}

/// Exit code for the terminal state of a batch.
pub fn batch_exit_code(outcome: &BatchOutcome) -> i32 {
    match outcome {
        BatchOutcome::Completed => exit_codes::SUCCESS,
        BatchOutcome::Failed(_) => exit_codes::ERROR_BATCH_FAILED,
        BatchOutcome::Cancelled => exit_codes::ERROR_CANCELED,
    }
}

/// Exit code for a sample-construction run.
pub fn sample_exit_code(outcome: SampleOutcome) -> i32 {
    match outcome {
        SampleOutcome::Completed => exit_codes::SUCCESS,
        SampleOutcome::Cancelled => exit_codes::ERROR_CANCELED,
    }
}
