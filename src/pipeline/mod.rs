//! Data pipeline: from a transaction ledger to cached train/val/test graphs.
//!
//! `get_data` checks the cache first. On a miss it loads the ledger, bins it by
//! day, searches the split, materializes and persists every split, and then
//! rereads all six artifacts so callers always get what is on disk.

pub mod materialize;

pub use materialize::{build_split_graph, materialize, SplitIndices};

use crate::cache::{DatasetCache, SplitArtifacts};
use crate::config::PipelineConfig;
use crate::core::{Result, SplitName, SECONDS_PER_DAY};
use crate::graph::PreparedGraph;
use crate::ledger::Ledger;
use crate::split::{SplitOptimizer, SplitPlan, SplitRatios};
use crate::temporal::DayBins;
use tracing::{debug, info, warn};

/// The three split graphs and the edge indices of each split's own days.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitData {
    pub train: PreparedGraph,
    pub val: PreparedGraph,
    pub test: PreparedGraph,
    pub train_inds: Vec<usize>,
    pub val_inds: Vec<usize>,
    pub test_inds: Vec<usize>,
}

impl SplitData {
    /// Wrap loaded artifacts, converting each graph when `reverse_mp` is set.
    pub fn from_artifacts(artifacts: SplitArtifacts, reverse_mp: bool, ports: bool) -> Self {
        let SplitArtifacts {
            train,
            val,
            test,
            train_inds,
            val_inds,
            test_inds,
        } = artifacts;

        if reverse_mp {
            info!("Converting train, val and test data to hetero");
        }
        Self {
            train: PreparedGraph::prepare(train, reverse_mp, ports),
            val: PreparedGraph::prepare(val, reverse_mp, ports),
            test: PreparedGraph::prepare(test, reverse_mp, ports),
            train_inds,
            val_inds,
            test_inds,
        }
    }

    pub fn graph(&self, split: SplitName) -> &PreparedGraph {
        match split {
            SplitName::Train => &self.train,
            SplitName::Val => &self.val,
            SplitName::Test => &self.test,
        }
    }

    pub fn inds(&self, split: SplitName) -> &[usize] {
        match split {
            SplitName::Train => &self.train_inds,
            SplitName::Val => &self.val_inds,
            SplitName::Test => &self.test_inds,
        }
    }
}

/// Bin the ledger by day and search the best split.
pub fn plan_split(ledger: &Ledger, ratios: &SplitRatios) -> Result<(DayBins, SplitPlan)> {
    let bins = DayBins::from_timestamps(&ledger.graph.timestamps, &ledger.graph.y)?;
    info!(
        "number of days and transactions in the data: {} days, {} transactions",
        bins.n_days(),
        bins.total()
    );
    for bucket in bins.buckets() {
        debug!(
            "day {}: {} transactions, illicit ratio {}, weighted illicit ratio {:.6}",
            bucket.day,
            bucket.transactions(),
            bucket
                .illicit_ratio()
                .map(|r| format!("{:.4}", r))
                .unwrap_or_else(|| "n/a".to_string()),
            bins.weighted_illicit_ratio(bucket.day)
        );
    }

    let plan = SplitOptimizer::new(*ratios)?.search(&bins.counts())?;
    info!(
        "Calculate split: i={}, j={}, score={:.4}, totals={:?}",
        plan.i, plan.j, plan.score, plan.totals
    );
    Ok((bins, plan))
}

/// Make sure the artifacts for `config` exist, computing them on a miss.
///
/// A cache hit returns without touching the ledger.
pub fn prepare(config: &PipelineConfig) -> Result<DatasetCache> {
    config.split.validate()?;
    let source = config.data_path()?;
    let cache = DatasetCache::new(source, config)?;

    if cache.is_complete() {
        info!("Using the local formatted data of {}", source.display());
        return Ok(cache);
    }
    if cache.paths().is_partial() {
        warn!(
            "Incomplete cache in {}, recomputing all artifacts",
            cache.paths().dir().display()
        );
    }

    {
        let ledger = Ledger::load(source)?;
        ledger.log_stats();

        let (bins, plan) = plan_split(&ledger, &config.split)?;
        let inds = SplitIndices::from_plan(&bins, &plan);
        drop(bins);

        log_split_summary(&ledger, &inds, &plan);
        materialize(&ledger, &inds, &cache, config.ports)?;
    }

    cache.write_manifest(config)?;
    Ok(cache)
}

/// Load the train/val/test graphs and index sets for `config`.
pub fn get_data(config: &PipelineConfig) -> Result<SplitData> {
    let cache = prepare(config)?;
    let artifacts = cache.load()?;
    Ok(SplitData::from_artifacts(
        artifacts,
        config.reverse_mp,
        config.ports,
    ))
}

fn log_split_summary(ledger: &Ledger, inds: &SplitIndices, plan: &SplitPlan) {
    let y = &ledger.graph.y;
    for (split, days) in SplitName::ALL.iter().zip(plan.days()) {
        let split_inds = inds.get(*split);
        let illicit = split_inds.iter().filter(|&&e| y[e] == 1).count();
        let ir = if split_inds.is_empty() {
            0.0
        } else {
            illicit as f64 / split_inds.len() as f64
        };
        info!(
            "Total {} samples: {:.2}% || IR: {:.2}% || {} days: {}",
            split,
            split_inds.len() as f64 / y.len() as f64 * 100.0,
            ir * 100.0,
            split,
            describe_days(days, ledger.origin)
        );
        debug!("{} days: {:?}", split, days);
    }
}

/// `first..=last (date to date)` for a contiguous day range.
fn describe_days(days: &[usize], origin: i64) -> String {
    match (days.first(), days.last()) {
        (Some(&first), Some(&last)) => format!(
            "{}..={} ({} to {})",
            first,
            last,
            day_date(origin, first),
            day_date(origin, last)
        ),
        _ => "[]".to_string(),
    }
}

fn day_date(origin: i64, day: usize) -> String {
    let secs = origin + (day as u64 * SECONDS_PER_DAY) as i64;
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| format!("day {}", day))
}
