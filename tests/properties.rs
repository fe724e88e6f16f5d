//! Property tests for day binning, the split search and normalization.

use amlgraph::core::{Matrix, SECONDS_PER_DAY};
use amlgraph::graph::{column_stats, z_norm};
use amlgraph::split::{SplitOptimizer, SplitRatios};
use amlgraph::temporal::DayBins;
use proptest::prelude::*;

/// Exhaustive scan over every cut, first minimum wins.
fn oracle(optimizer: &SplitOptimizer, counts: &[usize]) -> Option<(usize, usize, f64)> {
    let n = counts.len();
    let mut best: Option<(usize, usize, f64)> = None;
    for i in 0..=n {
        for j in i..=n {
            if let Some(score) = optimizer.score(counts, i, j) {
                if best.map_or(true, |(_, _, s)| score < s) {
                    best = Some((i, j, score));
                }
            }
        }
    }
    best
}

fn ratios() -> impl Strategy<Value = SplitRatios> {
    (1u32..10, 1u32..10, 1u32..10).prop_map(|(a, b, c)| {
        let sum = (a + b + c) as f64;
        SplitRatios {
            train: a as f64 / sum,
            val: b as f64 / sum,
            test: c as f64 / sum,
        }
    })
}

proptest! {
    #[test]
    fn bins_partition_every_edge(
        timestamps in prop::collection::vec(0u64..10 * SECONDS_PER_DAY, 1..200),
    ) {
        let labels: Vec<u8> = timestamps.iter().map(|t| (t % 2) as u8).collect();
        let bins = DayBins::from_timestamps(&timestamps, &labels).unwrap();

        let max = *timestamps.iter().max().unwrap();
        prop_assert_eq!(bins.n_days() as u64, max / SECONDS_PER_DAY + 1);
        prop_assert_eq!(bins.total(), timestamps.len());

        let mut seen = vec![0usize; timestamps.len()];
        for bucket in bins.buckets() {
            prop_assert!(bucket.edge_indices.windows(2).all(|w| w[0] < w[1]));
            for &e in &bucket.edge_indices {
                prop_assert_eq!((timestamps[e] / SECONDS_PER_DAY) as usize, bucket.day);
                seen[e] += 1;
            }
        }
        prop_assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn search_matches_oracle(
        counts in prop::collection::vec(0usize..50, 1..=10),
        ratios in ratios(),
    ) {
        let optimizer = SplitOptimizer::new(ratios).unwrap();
        match (optimizer.search(&counts), oracle(&optimizer, &counts)) {
            (Ok(plan), Some((i, j, score))) => {
                prop_assert_eq!((plan.i, plan.j), (i, j));
                prop_assert_eq!(plan.score, score);
            }
            (Err(_), None) => {}
            (plan, expected) => {
                prop_assert!(false, "search {:?} vs oracle {:?}", plan, expected);
            }
        }
    }

    #[test]
    fn split_days_are_ordered(counts in prop::collection::vec(1usize..1000, 3..60)) {
        let plan = SplitOptimizer::new(SplitRatios::default())
            .unwrap()
            .search(&counts)
            .unwrap();

        let all: Vec<usize> = plan.days().concat();
        prop_assert_eq!(all, (0..counts.len()).collect::<Vec<_>>());
        prop_assert!(!plan.train_days.is_empty());
        prop_assert!(!plan.val_days.is_empty());
        prop_assert!(!plan.test_days.is_empty());
        prop_assert_eq!(plan.totals.iter().sum::<usize>(), counts.iter().sum::<usize>());
    }

    #[test]
    fn z_norm_standardizes_columns(
        rows in 2usize..40,
        cols in 1usize..4,
        seed in prop::collection::vec(-1000.0f32..1000.0, 160),
    ) {
        let data: Vec<f32> = seed.iter().cycle().take(rows * cols).copied().collect();
        let mut m = Matrix::new(rows, cols, data).unwrap();
        let before = column_stats(&m);
        z_norm(&mut m);

        for (c, stats) in column_stats(&m).iter().enumerate() {
            if before[c].has_variance() {
                prop_assert!(stats.mean.abs() < 1e-3, "mean {}", stats.mean);
                prop_assert!((stats.std - 1.0).abs() < 1e-3, "std {}", stats.std);
            } else {
                prop_assert!(m.column(c).iter().all(|&v| v == 0.0));
            }
        }
    }
}
