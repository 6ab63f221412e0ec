//! Empirical CDFs and the merged empirical/predicted curve record.

use std::fmt::Write as _;

use crate::constants::CDF_PLOT_MARKER;

/// Text written where one side of a merged record has run out.
pub const NAN_SENTINEL: &str = "NaN";

/// Step-function empirical CDF.
///
/// Follows the usual convention of a leading `(-inf, 0)` point, so a sample
/// of `n` values yields `n + 1` points.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalCdf {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl EmpiricalCdf {
    /// Compute the empirical CDF of a sample. NaN values are ignored.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(sample: &[f64]) -> Self {
        let mut sorted: Vec<f64> = sample.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len() as f64;

        let mut x = Vec::with_capacity(sorted.len() + 1);
        let mut y = Vec::with_capacity(sorted.len() + 1);
        x.push(f64::NEG_INFINITY);
        y.push(0.0);
        for (i, value) in sorted.into_iter().enumerate() {
            x.push(value);
            y.push((i + 1) as f64 / n);
        }
        Self { x, y }
    }

    /// Replace every `-inf` x value with the smallest finite x value.
    ///
    /// Leaves the curve untouched when it has no finite x value.
    #[must_use]
    pub fn with_finite_left_edge(mut self) -> Self {
        let min_finite = self
            .x
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .min_by(f64::total_cmp);
        if let Some(min) = min_finite {
            for v in &mut self.x {
                if *v == f64::NEG_INFINITY {
                    *v = min;
                }
            }
        }
        self
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the curve has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Parse a two-column `x y` curve file. `#` lines and blank lines are skipped.
pub fn parse_curve(content: &str) -> Result<(Vec<f64>, Vec<f64>), String> {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(x), Some(y)) = (fields.next(), fields.next()) else {
            return Err(format!("line {}: expected two columns", lineno + 1));
        };
        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|_| format!("line {}: {s:?} is not a number", lineno + 1))
        };
        xs.push(parse(x)?);
        ys.push(parse(y)?);
    }
    Ok((xs, ys))
}

/// Empirical and predicted curves of one dataset, merged by position.
#[derive(Debug, Clone, PartialEq)]
pub struct CdfRecord {
    pub empirical_x: Vec<f64>,
    pub empirical_y: Vec<f64>,
    pub predicted_x: Vec<f64>,
    pub predicted_y: Vec<f64>,
}

impl CdfRecord {
    /// Combine an empirical CDF with a predicted curve.
    #[must_use]
    pub fn new(empirical: EmpiricalCdf, predicted: (Vec<f64>, Vec<f64>)) -> Self {
        Self {
            empirical_x: empirical.x,
            empirical_y: empirical.y,
            predicted_x: predicted.0,
            predicted_y: predicted.1,
        }
    }

    /// Number of rows of the merged table (the longest sequence).
    #[must_use]
    pub fn rows(&self) -> usize {
        self.empirical_x
            .len()
            .max(self.empirical_y.len())
            .max(self.predicted_x.len())
            .max(self.predicted_y.len())
    }

    /// Render the merged, tab-delimited table with its `cdf-plot` header.
    #[must_use]
    pub fn to_table(&self) -> String {
        let mut out = format!("# x_emp\ty_emp\tx_pred\ty_pred; {CDF_PLOT_MARKER}\n");
        let columns = [
            &self.empirical_x,
            &self.empirical_y,
            &self.predicted_x,
            &self.predicted_y,
        ];
        for row in 0..self.rows() {
            let cells: Vec<String> = columns
                .iter()
                .map(|col| col.get(row).map_or_else(|| NAN_SENTINEL.to_string(), |v| format!("{v:?}")))
                .collect();
            let _ = writeln!(out, "{}", cells.join("\t"));
        }
        out
    }
}
