//! Column statistics and z-score normalization.

use crate::core::Matrix;
use serde::{Deserialize, Serialize};

/// Mean and sample standard deviation of one column.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Column mean
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); NaN for fewer than 2 rows
    pub std: f64,
}

impl ColumnStats {
    /// Whether the column can be standardized.
    pub fn has_variance(&self) -> bool {
        self.std.is_finite() && self.std > 0.0
    }
}

/// Per-column statistics, accumulated in `f64`.
pub fn column_stats(m: &Matrix) -> Vec<ColumnStats> {
    let n = m.rows();
    let mut means = vec![0.0f64; m.cols()];
    let mut variances = vec![0.0f64; m.cols()];

    for r in 0..n {
        for (c, &v) in m.row(r).iter().enumerate() {
            means[c] += v as f64;
        }
    }
    for mean in &mut means {
        *mean /= n.max(1) as f64;
    }

    for r in 0..n {
        for (c, &v) in m.row(r).iter().enumerate() {
            variances[c] += (v as f64 - means[c]).powi(2);
        }
    }

    means
        .into_iter()
        .zip(variances)
        .map(|(mean, sum_sq)| ColumnStats {
            mean,
            std: if n > 1 {
                (sum_sq / (n - 1) as f64).sqrt()
            } else {
                f64::NAN
            },
        })
        .collect()
}

/// Standardize every column in place: `(v - mean) / std`.
///
/// Columns without variance (constant, or fewer than two rows) become zero.
pub fn z_norm(m: &mut Matrix) {
    let stats = column_stats(m);
    for r in 0..m.rows() {
        for (c, s) in stats.iter().enumerate() {
            let value = if s.has_variance() {
                ((m.get(r, c) as f64 - s.mean) / s.std) as f32
            } else {
                0.0
            };
            m.set(r, c, value);
        }
    }
}
