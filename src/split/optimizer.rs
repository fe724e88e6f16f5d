//! Search for the day-range split whose volumes best match the target ratios.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Target share of transactions per split.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.6,
            val: 0.2,
            test: 0.2,
        }
    }
}

impl SplitRatios {
    pub fn new(train: f64, val: f64, test: f64) -> Result<Self> {
        let ratios = Self { train, val, test };
        ratios.validate()?;
        Ok(ratios)
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.train, self.val, self.test]
    }

    /// Every ratio finite and positive, summing to 1.
    pub fn validate(&self) -> Result<()> {
        let ratios = self.as_array();
        if ratios.iter().any(|r| !r.is_finite() || *r <= 0.0) {
            return Err(Error::Config(format!(
                "split ratios must be positive, got {:?}",
                ratios
            )));
        }
        let sum: f64 = ratios.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(Error::Config(format!(
                "split ratios must sum to 1, got {}",
                sum
            )));
        }
        Ok(())
    }
}

/// The chosen cut points and the days of each split.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitPlan {
    /// First validation day
    pub i: usize,
    /// First test day
    pub j: usize,
    /// Worst relative error of the three splits
    pub score: f64,
    /// Transactions per split
    pub totals: [usize; 3],
    pub train_days: Vec<usize>,
    pub val_days: Vec<usize>,
    pub test_days: Vec<usize>,
}

impl SplitPlan {
    fn new(i: usize, j: usize, n_days: usize, score: f64, totals: [usize; 3]) -> Self {
        Self {
            i,
            j,
            score,
            totals,
            train_days: (0..i).collect(),
            val_days: (i..j).collect(),
            test_days: (j..n_days).collect(),
        }
    }

    /// Days of each split, train first.
    pub fn days(&self) -> [&[usize]; 3] {
        [&self.train_days, &self.val_days, &self.test_days]
    }
}

/// Exhaustive search over contiguous three-way day partitions.
#[derive(Clone, Debug)]
pub struct SplitOptimizer {
    ratios: SplitRatios,
}

impl SplitOptimizer {
    pub fn new(ratios: SplitRatios) -> Result<Self> {
        ratios.validate()?;
        Ok(Self { ratios })
    }

    pub fn ratios(&self) -> &SplitRatios {
        &self.ratios
    }

    /// Score of cutting `counts` into `[0,i)`, `[i,j)`, `[j,n)`.
    ///
    /// The score is the largest `|observed - target| / target` over the three
    /// splits. `None` when any split would be empty or the cut is invalid.
    pub fn score(&self, counts: &[usize], i: usize, j: usize) -> Option<f64> {
        if i > j || j > counts.len() {
            return None;
        }
        let totals = [
            counts[..i].iter().sum(),
            counts[i..j].iter().sum(),
            counts[j..].iter().sum(),
        ];
        self.score_totals(totals)
    }

    fn score_totals(&self, totals: [usize; 3]) -> Option<f64> {
        if totals.iter().any(|&t| t == 0) {
            return None;
        }
        let sum: usize = totals.iter().sum();
        totals
            .iter()
            .zip(self.ratios.as_array())
            .map(|(&t, target)| ((t as f64 / sum as f64) - target).abs() / target)
            .reduce(f64::max)
    }

    /// Best cut over all `0 <= i <= j < n_days`, scanned with `i` outer.
    ///
    /// Ties keep the first pair scanned. Fails when every candidate leaves a
    /// split without transactions.
    pub fn search(&self, counts: &[usize]) -> Result<SplitPlan> {
        let n_days = counts.len();
        let mut prefix = Vec::with_capacity(n_days + 1);
        prefix.push(0usize);
        for &c in counts {
            prefix.push(prefix[prefix.len() - 1] + c);
        }
        let total = prefix[n_days];

        let mut best: Option<(usize, usize, f64, [usize; 3])> = None;
        for i in 0..n_days {
            for j in i..n_days {
                let totals = [prefix[i], prefix[j] - prefix[i], total - prefix[j]];
                let Some(score) = self.score_totals(totals) else {
                    continue;
                };
                if best.map_or(true, |(_, _, s, _)| score < s) {
                    best = Some((i, j, score, totals));
                }
            }
        }

        let (i, j, score, totals) = best.ok_or_else(|| {
            Error::Split(format!(
                "target ratio {:?} cannot be met: {} transactions over {} days leave an empty split",
                self.ratios.as_array(),
                total,
                n_days
            ))
        })?;

        Ok(SplitPlan::new(i, j, n_days, score, totals))
    }
}
