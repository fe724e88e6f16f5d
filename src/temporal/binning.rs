//! Day bucketing of transactions.

use crate::core::{Error, Result, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};

/// Transactions falling in `[day * 86400, (day + 1) * 86400)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    /// Day index
    pub day: usize,
    /// Ascending edge indices in this window
    pub edge_indices: Vec<usize>,
    /// Illicit edges in this window
    pub illicit: usize,
}

impl DayBucket {
    /// Number of transactions in the window.
    pub fn transactions(&self) -> usize {
        self.edge_indices.len()
    }

    /// Mean label in the window; `None` when the window is empty.
    pub fn illicit_ratio(&self) -> Option<f64> {
        if self.edge_indices.is_empty() {
            None
        } else {
            Some(self.illicit as f64 / self.edge_indices.len() as f64)
        }
    }
}

/// Day buckets covering the whole ledger, one per day from 0 to the last.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayBins {
    buckets: Vec<DayBucket>,
    total: usize,
}

impl DayBins {
    /// Bucket edges by timestamp. `n_days = max_ts / 86400 + 1`.
    pub fn from_timestamps(timestamps: &[u64], labels: &[u8]) -> Result<Self> {
        if timestamps.len() != labels.len() {
            return Err(Error::Shape(format!(
                "{} timestamps but {} labels",
                timestamps.len(),
                labels.len()
            )));
        }
        let max_ts = timestamps.iter().copied().max().ok_or(Error::EmptyLedger)?;
        let n_days = (max_ts / SECONDS_PER_DAY) as usize + 1;

        let mut buckets: Vec<DayBucket> = (0..n_days)
            .map(|day| DayBucket {
                day,
                edge_indices: Vec::new(),
                illicit: 0,
            })
            .collect();

        for (e, (&ts, &label)) in timestamps.iter().zip(labels).enumerate() {
            let bucket = &mut buckets[(ts / SECONDS_PER_DAY) as usize];
            bucket.edge_indices.push(e);
            bucket.illicit += (label == 1) as usize;
        }

        Ok(Self {
            buckets,
            total: timestamps.len(),
        })
    }

    pub fn n_days(&self) -> usize {
        self.buckets.len()
    }

    pub fn buckets(&self) -> &[DayBucket] {
        &self.buckets
    }

    pub fn bucket(&self, day: usize) -> Option<&DayBucket> {
        self.buckets.get(day)
    }

    /// Total number of binned transactions.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Transactions per day.
    pub fn counts(&self) -> Vec<usize> {
        self.buckets.iter().map(DayBucket::transactions).collect()
    }

    /// Illicit ratio of a day weighted by its share of all transactions.
    pub fn weighted_illicit_ratio(&self, day: usize) -> f64 {
        match self.buckets.get(day) {
            Some(b) if self.total > 0 => b.illicit as f64 / self.total as f64,
            _ => 0.0,
        }
    }

    /// Edge indices of `days`, concatenated in the given day order.
    pub fn gather(&self, days: &[usize]) -> Vec<usize> {
        let len = days
            .iter()
            .filter_map(|&d| self.buckets.get(d))
            .map(DayBucket::transactions)
            .sum();
        let mut inds = Vec::with_capacity(len);
        for b in days.iter().filter_map(|&d| self.buckets.get(d)) {
            inds.extend_from_slice(&b.edge_indices);
        }
        inds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = SECONDS_PER_DAY;

    #[test]
    fn test_bucket_boundaries() {
        let timestamps = vec![0, DAY - 1, DAY, 3 * DAY + 5];
        let labels = vec![0, 1, 0, 1];
        let bins = DayBins::from_timestamps(&timestamps, &labels).unwrap();

        assert_eq!(bins.n_days(), 4);
        assert_eq!(bins.counts(), vec![2, 1, 0, 1]);
        assert_eq!(bins.bucket(0).unwrap().edge_indices, vec![0, 1]);
        assert_eq!(bins.bucket(1).unwrap().edge_indices, vec![2]);
        assert_eq!(bins.bucket(3).unwrap().edge_indices, vec![3]);
    }

    #[test]
    fn test_illicit_ratios() {
        let timestamps = vec![0, 10, 20, 2 * DAY];
        let labels = vec![1, 0, 0, 1];
        let bins = DayBins::from_timestamps(&timestamps, &labels).unwrap();

        assert!((bins.bucket(0).unwrap().illicit_ratio().unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(bins.bucket(1).unwrap().illicit_ratio(), None);
        assert_eq!(bins.weighted_illicit_ratio(0), 0.25);
        assert_eq!(bins.weighted_illicit_ratio(1), 0.0);
    }

    #[test]
    fn test_unsorted_timestamps() {
        let timestamps = vec![2 * DAY, 0, DAY + 1, 1];
        let bins = DayBins::from_timestamps(&timestamps, &[0; 4]).unwrap();
        assert_eq!(bins.bucket(0).unwrap().edge_indices, vec![1, 3]);
        assert_eq!(bins.gather(&[2, 0]), vec![0, 1, 3]);
    }

    #[test]
    fn test_empty_and_mismatched() {
        assert!(matches!(
            DayBins::from_timestamps(&[], &[]),
            Err(Error::EmptyLedger)
        ));
        assert!(matches!(
            DayBins::from_timestamps(&[0, 1], &[0]),
            Err(Error::Shape(_))
        ));
    }
}
