//! Error types shared by the batch engine.
//!
//! `BatchError` covers faults of the coordinator itself (bad configuration,
//! file system, spawning). `FailureReason` describes why a batch ended in the
//! terminal `Failed` state; it is carried as a value, not propagated with `?`.

use std::path::PathBuf;

/// Error type for batch setup and coordinator I/O.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The run configuration is not usable.
    #[error("configuration error: {0}")]
    Config(String),

    /// A file system operation failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// An external executable could not be started.
    #[error("failed to spawn {}: {source}", program.display())]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// No free session directory name within the suffix cap.
    #[error("no free session name for {name:?} in {} after {attempts} attempts", dir.display())]
    SessionExhausted {
        /// Output directory.
        dir: PathBuf,
        /// Requested session name.
        name: String,
        /// Number of names tried.
        attempts: usize,
    },

    /// A dataset file is malformed.
    #[error("dataset {}: {reason}", path.display())]
    Dataset {
        /// Dataset path.
        path: PathBuf,
        /// What is wrong.
        reason: String,
    },

    /// A parameter file holds a value the caller cannot use.
    #[error("parameter file {}: {reason}", path.display())]
    ParameterFile {
        /// Parameter file path.
        path: PathBuf,
        /// What is wrong.
        reason: String,
    },
}

impl BatchError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why a batch stopped in the `Failed` state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    /// The fitting tool printed an error marker.
    #[error("fast-dm reported {marker:?} while processing {dataset}")]
    ErrorMarker {
        /// Dataset file name.
        dataset: String,
        /// Marker that matched.
        marker: String,
    },

    /// The fitting tool exited without writing its parameter file.
    #[error("no parameter file was written for {dataset}")]
    MissingOutput {
        /// Dataset file name.
        dataset: String,
    },

    /// A parameter file lacks a column of the canonical header.
    #[error("parameter {key:?} missing from the estimates of {dataset}")]
    MissingKey {
        /// Dataset file name.
        dataset: String,
        /// Canonical header entry that was not found.
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_error_display() {
        let err = BatchError::Config("no data files loaded".into());
        assert_eq!(err.to_string(), "configuration error: no data files loaded");

        let err = BatchError::io(
            "/tmp/x",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/x"));
    }

    #[test]
    fn failure_reason_display() {
        let reason = FailureReason::ErrorMarker {
            dataset: "s1.dat".into(),
            marker: "error".into(),
        };
        assert!(reason.to_string().contains("s1.dat"));

        let reason = FailureReason::MissingKey {
            dataset: "s2.dat".into(),
            key: "zr".into(),
        };
        assert!(reason.to_string().contains("\"zr\""));
    }
}
