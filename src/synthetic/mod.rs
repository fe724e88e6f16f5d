//! Seeded synthetic ledgers.
//!
//! Produces transaction tables with a chosen number of transactions per day,
//! for tests, benchmarks and quick trials of the pipeline without real data.

use crate::core::{Error, Result, SECONDS_PER_DAY};
use crate::ledger::TransactionRecord;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::Path;
use tracing::info;

/// Number of distinct currencies drawn from.
const CURRENCIES: u32 = 15;
/// Number of distinct payment formats drawn from.
const PAYMENT_FORMATS: u32 = 7;

/// Generator of synthetic ledgers.
#[derive(Clone, Debug)]
pub struct SyntheticLedger {
    /// Transactions per day, day 0 first
    pub per_day: Vec<usize>,
    pub num_accounts: u64,
    /// Probability of a transaction being labelled illicit
    pub illicit_rate: f64,
    pub seed: u64,
    /// Timestamp of the first day's midnight
    pub start_timestamp: i64,
}

impl Default for SyntheticLedger {
    fn default() -> Self {
        Self {
            per_day: vec![100; 10],
            num_accounts: 50,
            illicit_rate: 0.05,
            seed: 1,
            // 2022-09-01T00:00:00Z
            start_timestamp: 1_661_990_400,
        }
    }
}

impl SyntheticLedger {
    /// `days` days with `per_day` transactions each.
    pub fn uniform(days: usize, per_day: usize) -> Self {
        Self {
            per_day: vec![per_day; days],
            ..Default::default()
        }
    }

    /// Explicit per-day transaction counts.
    pub fn with_counts(counts: Vec<usize>) -> Self {
        Self {
            per_day: counts,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_illicit_rate(mut self, rate: f64) -> Self {
        self.illicit_rate = rate;
        self
    }

    pub fn with_accounts(mut self, accounts: u64) -> Self {
        self.num_accounts = accounts;
        self
    }

    pub fn total(&self) -> usize {
        self.per_day.iter().sum()
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.illicit_rate) {
            return Err(Error::Config(format!(
                "illicit rate must be in [0, 1], got {}",
                self.illicit_rate
            )));
        }
        if self.num_accounts < 2 {
            return Err(Error::Config(
                "a synthetic ledger needs at least two accounts".into(),
            ));
        }
        if self.total() == 0 {
            return Err(Error::EmptyLedger);
        }
        Ok(())
    }

    /// Generate the records, ordered by timestamp.
    ///
    /// The first transaction falls exactly on the first non-empty day's
    /// midnight, so day buckets of the normalized ledger line up with the
    /// generated days from there on.
    pub fn generate(&self) -> Result<Vec<TransactionRecord>> {
        self.validate()?;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut records = Vec::with_capacity(self.total());

        for (day, &count) in self.per_day.iter().enumerate() {
            let midnight = self.start_timestamp + (day as u64 * SECONDS_PER_DAY) as i64;
            let mut offsets: Vec<i64> = (0..count)
                .map(|_| rng.gen_range(0..SECONDS_PER_DAY as i64))
                .collect();
            if records.is_empty() {
                if let Some(first) = offsets.first_mut() {
                    *first = 0;
                }
            }
            offsets.sort_unstable();

            for offset in offsets {
                let from_id = rng.gen_range(0..self.num_accounts);
                let to_id = (from_id + rng.gen_range(1..self.num_accounts)) % self.num_accounts;
                let cents: u64 = rng.gen_range(100..1_000_000);
                records.push(TransactionRecord {
                    from_id,
                    to_id,
                    timestamp: midnight + offset,
                    amount_received: cents as f64 / 100.0,
                    received_currency: rng.gen_range(0..CURRENCIES) as f64,
                    payment_format: rng.gen_range(0..PAYMENT_FORMATS) as f64,
                    is_laundering: rng.gen_bool(self.illicit_rate) as u8,
                });
            }
        }
        Ok(records)
    }

    /// Generate and write the ledger as CSV. Returns the number of rows.
    pub fn write_csv(&self, path: &Path) -> Result<usize> {
        let records = self.generate()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(path)?;
        for record in &records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        info!(
            "Wrote {} synthetic transactions over {} days to {}",
            records.len(),
            self.per_day.len(),
            path.display()
        );
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::temporal::DayBins;

    #[test]
    fn test_deterministic() {
        let gen = SyntheticLedger::uniform(3, 20).with_seed(7);
        assert_eq!(gen.generate().unwrap(), gen.generate().unwrap());

        let other = SyntheticLedger::uniform(3, 20).with_seed(8);
        assert_ne!(gen.generate().unwrap(), other.generate().unwrap());
    }

    #[test]
    fn test_day_counts_preserved() {
        let gen = SyntheticLedger::with_counts(vec![5, 0, 12, 3]);
        let ledger = Ledger::from_records(&gen.generate().unwrap()).unwrap();
        let bins = DayBins::from_timestamps(&ledger.graph.timestamps, &ledger.graph.y).unwrap();
        assert_eq!(bins.counts(), vec![5, 0, 12, 3]);
    }

    #[test]
    fn test_no_self_loops() {
        let records = SyntheticLedger::uniform(2, 50).with_accounts(3).generate().unwrap();
        assert!(records.iter().all(|r| r.from_id != r.to_id && r.to_id < 3));
    }

    #[test]
    fn test_illicit_rate_bounds() {
        let none = SyntheticLedger::uniform(2, 50).with_illicit_rate(0.0);
        assert!(none.generate().unwrap().iter().all(|r| r.is_laundering == 0));

        let all = SyntheticLedger::uniform(2, 50).with_illicit_rate(1.0);
        assert!(all.generate().unwrap().iter().all(|r| r.is_laundering == 1));

        let bad = SyntheticLedger::uniform(2, 50).with_illicit_rate(1.5);
        assert!(matches!(bad.generate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_rejected() {
        let gen = SyntheticLedger::with_counts(vec![0, 0]);
        assert!(matches!(gen.generate(), Err(Error::EmptyLedger)));
    }

    #[test]
    fn test_write_csv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("synthetic_formatted_transactions.csv");
        let gen = SyntheticLedger::uniform(4, 10);

        assert_eq!(gen.write_csv(&path).unwrap(), 40);
        let ledger = Ledger::load(&path).unwrap();
        assert_eq!(ledger.num_edges(), 40);
        assert_eq!(ledger.origin, gen.start_timestamp);
    }
}
