//! Consolidated estimates table.
//!
//! Different datasets can list their estimates in different orders (or
//! estimate different subsets) depending on which parameters ended up fixed.
//! The first dataset aggregated fixes the column order; every later dataset
//! is re-ordered to match it.

use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use fdbatch_core::constants::{TABLE_DATASET_COLUMN, TABLE_DELIMITER};
use fdbatch_core::error::{BatchError, FailureReason};
use fdbatch_core::params_file::ParameterFile;

/// One normalized table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Dataset file name.
    pub dataset: String,
    /// Values in canonical header order.
    pub values: Vec<String>,
}

/// Append-only writer of the consolidated table.
pub struct ResultAggregator {
    path: PathBuf,
    writer: LineWriter<File>,
    header: Option<Vec<String>>,
    header_written: bool,
    rows: usize,
}

impl ResultAggregator {
    /// Open (or create) the table for appending.
    pub fn create(path: &Path) -> Result<Self, BatchError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| BatchError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: LineWriter::new(file),
            header: None,
            header_written: false,
            rows: 0,
        })
    }

    /// Canonical header, once fixed.
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.header.as_deref()
    }

    /// Number of data rows written.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Table location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a dataset's parameter file and order its values canonically.
    ///
    /// The first successful call fixes the canonical header.
    pub fn normalize(&mut self, dataset: &str, output: &Path) -> Result<TableRow, FailureReason> {
        let Ok(file) = ParameterFile::read(output) else {
            return Err(FailureReason::MissingOutput {
                dataset: dataset.to_string(),
            });
        };
        let header = self.header.get_or_insert_with(|| file.names().to_vec());

        let values = header
            .iter()
            .map(|key| {
                file.get(key)
                    .map(str::to_string)
                    .ok_or_else(|| FailureReason::MissingKey {
                        dataset: dataset.to_string(),
                        key: key.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TableRow {
            dataset: dataset.to_string(),
            values,
        })
    }

    /// Write a row, preceded by the header line if this is the first one.
    pub fn append(&mut self, row: &TableRow) -> Result<(), BatchError> {
        let delim = TABLE_DELIMITER.to_string();
        if !self.header_written {
            if let Some(header) = &self.header {
                let mut line = vec![TABLE_DATASET_COLUMN.to_string()];
                line.extend(header.iter().cloned());
                writeln!(self.writer, "{}", line.join(&delim))
                    .map_err(|e| BatchError::io(&self.path, e))?;
                self.header_written = true;
            }
        }

        let mut line = vec![row.dataset.clone()];
        line.extend(row.values.iter().cloned());
        writeln!(self.writer, "{}", line.join(&delim)).map_err(|e| BatchError::io(&self.path, e))?;
        self.rows += 1;
        debug!(dataset = %row.dataset, rows = self.rows, "Row appended");
        Ok(())
    }
}
