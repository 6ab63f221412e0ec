//! Dataset files: `#`-prefixed header line followed by numeric rows.

use std::path::{Path, PathBuf};

use crate::error::BatchError;

fn dataset_error(path: &Path, reason: impl Into<String>) -> BatchError {
    BatchError::Dataset {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|f| !f.is_empty())
}

/// Read the column names from a dataset's header line.
///
/// The first line must start with `#`; `# a b`, `#a b` and `#\ta\tb` are
/// all accepted.
pub fn read_header(path: &Path) -> Result<Vec<String>, BatchError> {
    let content = std::fs::read_to_string(path).map_err(|e| BatchError::io(path, e))?;
    let first = content.lines().next().unwrap_or_default();
    let Some(rest) = first.strip_prefix('#') else {
        return Err(dataset_error(
            path,
            "no header found; the first row must start with '#' and name the columns",
        ));
    };
    let columns: Vec<String> = fields(rest).map(str::to_string).collect();
    if columns.is_empty() {
        return Err(dataset_error(path, "header names no columns"));
    }
    Ok(columns)
}

/// Read the shared header of a set of datasets.
///
/// Every dataset must carry exactly the same columns as the first one.
pub fn common_header(paths: &[PathBuf]) -> Result<Vec<String>, BatchError> {
    let Some(first) = paths.first() else {
        return Err(BatchError::Config("no data files loaded".into()));
    };
    let header = read_header(first)?;
    for path in &paths[1..] {
        if read_header(path)? != header {
            return Err(dataset_error(
                path,
                "header does not match the header of the previous file(s)",
            ));
        }
    }
    Ok(header)
}

/// Load the signed reaction times of a dataset.
///
/// Reaction times of rows whose response is `0` are negated, which folds the
/// lower response boundary onto the negative half of one axis.
pub fn load_signed_times(
    path: &Path,
    response_column: usize,
    time_column: usize,
) -> Result<Vec<f64>, BatchError> {
    let content = std::fs::read_to_string(path).map_err(|e| BatchError::io(path, e))?;
    let needed = response_column.max(time_column) + 1;
    let mut times = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let row: Vec<&str> = fields(trimmed).collect();
        if row.len() < needed {
            return Err(dataset_error(
                path,
                format!("line {} has {} columns, expected at least {needed}", lineno + 1, row.len()),
            ));
        }
        let parse = |idx: usize| {
            row[idx].parse::<f64>().map_err(|_| {
                dataset_error(
                    path,
                    format!("line {}: {:?} is not a number", lineno + 1, row[idx]),
                )
            })
        };
        let response = parse(response_column)?;
        let time = parse(time_column)?;
        #[allow(clippy::float_cmp)]
        let signed = if response == 0.0 { -time } else { time };
        times.push(signed);
    }

    if times.is_empty() {
        return Err(dataset_error(path, "no data rows"));
    }
    Ok(times)
}
