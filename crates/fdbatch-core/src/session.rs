//! Session directory resolution and layout.

use std::path::{Path, PathBuf};

use crate::constants::{
    ALL_ESTIMATES_NAME, CDF_DIR, MAX_SESSION_SUFFIXES, PARAMETERS_DIR, PARAMETER_FILE_PREFIX,
    SESSION_CONTROL_NAME,
};
use crate::error::BatchError;

/// A session directory that did not exist when it was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDirectory {
    output_dir: PathBuf,
    name: String,
}

impl SessionDirectory {
    /// Pick a session name that does not collide with an existing directory.
    ///
    /// A colliding name gets `_1` appended, repeatedly (`run`, `run_1`,
    /// `run_1_1`, ...), for at most [`MAX_SESSION_SUFFIXES`] attempts.
    pub fn resolve(output_dir: &Path, requested: &str) -> Result<Self, BatchError> {
        let mut name = requested.to_string();
        for _ in 0..=MAX_SESSION_SUFFIXES {
            if !output_dir.join(&name).exists() {
                return Ok(Self {
                    output_dir: output_dir.to_path_buf(),
                    name,
                });
            }
            name.push_str("_1");
        }
        Err(BatchError::SessionExhausted {
            dir: output_dir.to_path_buf(),
            name: requested.to_string(),
            attempts: MAX_SESSION_SUFFIXES + 1,
        })
    }

    /// Resolved session name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Session root (`<output>/<name>`).
    #[must_use]
    pub fn root(&self) -> PathBuf {
        self.output_dir.join(&self.name)
    }

    /// Directory of per-dataset parameter files.
    #[must_use]
    pub fn parameters_dir(&self) -> PathBuf {
        self.root().join(PARAMETERS_DIR)
    }

    /// Directory of merged CDF files.
    #[must_use]
    pub fn cdf_dir(&self) -> PathBuf {
        self.root().join(CDF_DIR)
    }

    /// Consolidated estimates table.
    #[must_use]
    pub fn table_path(&self) -> PathBuf {
        self.root().join(ALL_ESTIMATES_NAME)
    }

    /// Reusable control file.
    #[must_use]
    pub fn control_file_path(&self) -> PathBuf {
        self.root().join(SESSION_CONTROL_NAME)
    }

    /// Parameter file written for a dataset file name.
    #[must_use]
    pub fn parameter_file(&self, dataset_name: &str) -> PathBuf {
        self.parameters_dir()
            .join(format!("{PARAMETER_FILE_PREFIX}{dataset_name}"))
    }

    /// Scratch control file of the job with the given global index.
    #[must_use]
    pub fn scratch_control_file(&self, index: usize) -> PathBuf {
        self.parameters_dir().join(format!(".controlfile_{index}.ctl"))
    }

    /// Create the session root (and parents).
    pub fn create(&self) -> Result<(), BatchError> {
        let root = self.root();
        std::fs::create_dir_all(&root).map_err(|e| BatchError::io(root, e))
    }
}

/// File name component of a dataset path, as used in the table and file names.
#[must_use]
pub fn dataset_file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy().into_owned(), |n| n.to_string_lossy().into_owned())
}

/// File name without its last extension.
#[must_use]
pub fn dataset_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| dataset_file_name(path), |n| n.to_string_lossy().into_owned())
}
