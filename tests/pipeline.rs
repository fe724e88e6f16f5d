//! End-to-end tests of ledger preparation and the split cache.

use amlgraph::cache::DatasetCache;
use amlgraph::config::PipelineConfig;
use amlgraph::core::SplitName;
use amlgraph::dataset::{AmlWorld, RAW_FILE};
use amlgraph::graph::{column_stats, GraphData, PreparedGraph};
use amlgraph::ledger::Ledger;
use amlgraph::pipeline::{self, build_split_graph, get_data, SplitIndices};
use amlgraph::synthetic::SyntheticLedger;
use amlgraph::Error;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LEDGER_FILE: &str = "HI-Small_formatted_transactions.csv";

fn write_ledger(dir: &Path) -> PathBuf {
    let path = dir.join(LEDGER_FILE);
    SyntheticLedger::uniform(10, 100)
        .with_illicit_rate(0.1)
        .write_csv(&path)
        .unwrap();
    path
}

fn homogeneous(graph: &PreparedGraph) -> &GraphData {
    graph.as_homogeneous().expect("homogeneous graph")
}

#[test]
fn test_get_data_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::ledger(write_ledger(dir.path()));

    let data = get_data(&config).unwrap();

    assert_eq!(data.train_inds, (0..600).collect::<Vec<_>>());
    assert_eq!(data.val_inds, (600..800).collect::<Vec<_>>());
    assert_eq!(data.test_inds, (800..1000).collect::<Vec<_>>());

    assert_eq!(data.train.num_edges(), 600);
    // validation graph holds train and validation edges, test the whole ledger
    assert_eq!(data.val.num_edges(), 800);
    assert_eq!(data.test.num_edges(), 1000);

    for split in SplitName::ALL {
        let graph = homogeneous(data.graph(split));
        assert_eq!(graph.edge_attr.cols(), 6);
        assert_eq!(graph.num_nodes(), 50);
    }
}

#[test]
fn test_reread_matches_in_memory_build() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(dir.path());
    let config = PipelineConfig::ledger(&path);
    let data = get_data(&config).unwrap();

    let ledger = Ledger::load(&path).unwrap();
    let (bins, plan) = pipeline::plan_split(&ledger, &config.split).unwrap();
    let inds = SplitIndices::from_plan(&bins, &plan);

    for split in SplitName::ALL {
        let built = build_split_graph(&ledger, &inds, split, true).unwrap();
        assert_eq!(homogeneous(data.graph(split)), &built);
        assert_eq!(data.inds(split), inds.get(split));
    }
}

#[test]
fn test_cache_hit_skips_ledger() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(dir.path());
    let config = PipelineConfig::ledger(&path);
    let first = get_data(&config).unwrap();

    std::fs::write(&path, "not,a,ledger\n1,2,3\n").unwrap();
    let second = get_data(&config).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_artifact_layout() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(dir.path());
    let config = PipelineConfig::ledger(&path);
    get_data(&config).unwrap();

    let cache = DatasetCache::new(&path, &config).unwrap();
    let prefix = format!("HI-Small_{}", cache.key().short());
    for name in ["train", "val", "test", "train_inds", "val_inds", "test_inds"] {
        let artifact = dir.path().join(format!("{}_{}.bin", prefix, name));
        assert!(artifact.is_file(), "missing {}", artifact.display());
    }

    let manifest = cache.read_manifest().unwrap();
    assert_eq!(manifest.key, cache.key().to_hex());
    assert!(manifest.ports);
}

#[test]
fn test_partial_cache_recomputed() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(dir.path());
    let config = PipelineConfig::ledger(&path);
    let first = get_data(&config).unwrap();

    let cache = DatasetCache::new(&path, &config).unwrap();
    std::fs::remove_file(cache.paths().inds(SplitName::Test)).unwrap();
    assert!(cache.paths().is_partial());

    let second = get_data(&config).unwrap();
    assert_eq!(first, second);
    assert!(cache.is_complete());
}

#[test]
fn test_ports_flag_changes_cache_entry() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(dir.path());
    let with_ports = PipelineConfig::ledger(&path);
    let without_ports = PipelineConfig::ledger(&path).with_ports(false);

    let a = DatasetCache::new(&path, &with_ports).unwrap();
    let b = DatasetCache::new(&path, &without_ports).unwrap();
    assert_ne!(a.key(), b.key());

    let data = get_data(&without_ports).unwrap();
    assert_eq!(homogeneous(&data.train).edge_attr.cols(), 4);
    assert!(!a.is_complete());
}

#[test]
fn test_reverse_mp_shares_cache() {
    let dir = TempDir::new().unwrap();
    let path = write_ledger(dir.path());
    let plain = get_data(&PipelineConfig::ledger(&path)).unwrap();
    let hetero = get_data(&PipelineConfig::ledger(&path).with_reverse_mp(true)).unwrap();

    let forward = homogeneous(&plain.train);
    let graph = hetero.train.as_heterogeneous().expect("hetero graph");

    assert_eq!(graph.to.edge_index, forward.edge_index);
    assert_eq!(graph.rev_to.edge_index.src, forward.edge_index.dst);
    assert_eq!(graph.rev_to.edge_index.dst, forward.edge_index.src);
    assert_eq!(graph.y, forward.y);
    // in and out ports trade places on the reverse relation
    assert_eq!(graph.rev_to.edge_attr.column(4), forward.edge_attr.column(5));
    assert_eq!(graph.rev_to.edge_attr.column(5), forward.edge_attr.column(4));
    assert_eq!(graph.rev_to.edge_attr.column(1), forward.edge_attr.column(1));
}

#[test]
fn test_features_normalized() {
    let dir = TempDir::new().unwrap();
    let data = get_data(&PipelineConfig::ledger(write_ledger(dir.path()))).unwrap();
    let train = homogeneous(&data.train);

    for stats in column_stats(&train.edge_attr) {
        if stats.std == 0.0 {
            assert!(stats.mean.abs() < 1e-6);
        } else {
            assert!(stats.mean.abs() < 1e-4, "mean {}", stats.mean);
            assert!((stats.std - 1.0).abs() < 1e-4, "std {}", stats.std);
        }
    }
    // constant placeholder node feature
    assert!(train.x.as_slice().iter().all(|&v| v == 0.0));
}

#[test]
fn test_missing_column_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tx.csv");
    std::fs::write(
        &path,
        "from_id,to_id,Timestamp,Amount Received,Received Currency,Payment Format\n0,1,10,5.0,1,1\n",
    )
    .unwrap();

    match get_data(&PipelineConfig::ledger(&path)) {
        Err(Error::Schema { missing, .. }) => assert_eq!(missing, vec!["Is Laundering"]),
        other => panic!("expected schema error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_single_day_cannot_split() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("one_day.csv");
    SyntheticLedger::uniform(1, 50).write_csv(&path).unwrap();

    let result = get_data(&PipelineConfig::ledger(&path));
    assert!(matches!(result, Err(Error::Split(_))));
}

#[test]
fn test_aml_world_splits() {
    let root = TempDir::new().unwrap();
    std::fs::create_dir_all(root.path().join("raw")).unwrap();
    SyntheticLedger::uniform(10, 100)
        .write_csv(&root.path().join("raw").join(RAW_FILE))
        .unwrap();

    let dataset = AmlWorld::new(root.path(), true).unwrap();
    let val = dataset.split(SplitName::Val).unwrap();

    assert_eq!(val.graph.num_edges(), 800);
    assert_eq!(val.edge_attr().cols(), 6);
    let (attr, inds) = val.index_attr();
    assert_eq!(attr, "val_inds");
    assert_eq!(inds.len(), 200);
    assert!(root.path().join("processed").is_dir());

    let config = PipelineConfig::aml_world(root.path()).with_reverse_mp(true);
    let data = amlgraph::dataset::load_aml_world(&config).unwrap();
    assert!(data.test.as_heterogeneous().is_some());
    assert_eq!(data.test.num_edges(), 1000);
}
