//! Cache Manager
//!
//! Persists the six split artifacts of a dataset and reloads them on later runs.
//! Artifacts are immutable once written; there is no invalidation and no
//! locking, so two processes populating the same key will race.

pub mod codec;
pub mod key;
pub mod paths;

pub use codec::{read_artifact, write_artifact, CompressionStats};
pub use key::{canonical_source, FORMAT_VERSION};
pub use paths::CachePaths;

use crate::config::PipelineConfig;
use crate::core::{now, CacheKey, Result, SplitName, Timestamp};
use crate::graph::GraphData;
use crate::ledger::{EDGE_FEATURES, NODE_FEATURES};
use crate::split::SplitRatios;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Description of how a cache entry was produced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Full hex cache key
    pub key: String,
    /// Ledger the artifacts were built from
    pub source: PathBuf,
    /// When the artifacts were written
    pub created: Timestamp,
    pub edge_features: Vec<String>,
    pub node_features: Vec<String>,
    pub ports: bool,
    pub split: SplitRatios,
    pub format_version: u8,
}

/// The six persisted objects of one dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitArtifacts {
    pub train: GraphData,
    pub val: GraphData,
    pub test: GraphData,
    pub train_inds: Vec<usize>,
    pub val_inds: Vec<usize>,
    pub test_inds: Vec<usize>,
}

impl SplitArtifacts {
    pub fn graph(&self, split: SplitName) -> &GraphData {
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

/// Cache entry of one dataset under one configuration.
#[derive(Clone, Debug)]
pub struct DatasetCache {
    source: PathBuf,
    key: CacheKey,
    paths: CachePaths,
}

impl DatasetCache {
    /// Locate the cache entry of `source` prepared under `config`.
    pub fn new(source: &Path, config: &PipelineConfig) -> Result<Self> {
        let key = CacheKey::derive(source, config)?;
        let paths = CachePaths::for_source(source, &key, config.out_dir.as_deref());
        debug!("cache key for {}: {}", source.display(), key);

        Ok(Self {
            source: source.to_path_buf(),
            key,
            paths,
        })
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn paths(&self) -> &CachePaths {
        &self.paths
    }

    /// Whether all six artifacts exist.
    pub fn is_complete(&self) -> bool {
        self.paths.is_complete()
    }

    /// Write a split's graph and index set.
    pub fn store_split(&self, split: SplitName, graph: &GraphData, inds: &[usize]) -> Result<()> {
        std::fs::create_dir_all(self.paths.dir())?;
        write_artifact(&self.paths.graph(split), graph)?;
        write_artifact(&self.paths.inds(split), &inds)?;
        Ok(())
    }

    /// Record how the entry was produced.
    pub fn write_manifest(&self, config: &PipelineConfig) -> Result<()> {
        let manifest = CacheManifest {
            key: self.key.to_hex(),
            source: canonical_source(&self.source)?,
            created: now(),
            edge_features: EDGE_FEATURES.iter().map(|s| s.to_string()).collect(),
            node_features: NODE_FEATURES.iter().map(|s| s.to_string()).collect(),
            ports: config.ports,
            split: config.split,
            format_version: FORMAT_VERSION,
        };
        std::fs::write(self.paths.manifest(), serde_json::to_string_pretty(&manifest)?)?;
        Ok(())
    }

    pub fn read_manifest(&self) -> Result<CacheManifest> {
        let text = std::fs::read_to_string(self.paths.manifest())?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn load_graph(&self, split: SplitName) -> Result<GraphData> {
        read_artifact(&self.paths.graph(split))
    }

    pub fn load_inds(&self, split: SplitName) -> Result<Vec<usize>> {
        read_artifact(&self.paths.inds(split))
    }

    /// Read all six artifacts.
    pub fn load(&self) -> Result<SplitArtifacts> {
        Ok(SplitArtifacts {
            train: self.load_graph(SplitName::Train)?,
            val: self.load_graph(SplitName::Val)?,
            test: self.load_graph(SplitName::Test)?,
            train_inds: self.load_inds(SplitName::Train)?,
            val_inds: self.load_inds(SplitName::Val)?,
            test_inds: self.load_inds(SplitName::Test)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EdgeIndex, Matrix};

    fn create_graph(edges: usize) -> GraphData {
        GraphData::new(
            Matrix::filled(2, 1, 0.0),
            vec![0; edges],
            EdgeIndex::new(vec![0; edges], vec![1; edges]).unwrap(),
            Matrix::filled(edges, 4, 0.5),
            (0..edges as u64).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_store_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("LI-Small_formatted_transactions.csv");
        let config = PipelineConfig::ledger(&source);
        let cache = DatasetCache::new(&source, &config).unwrap();

        assert!(!cache.is_complete());
        for (n, split) in SplitName::ALL.iter().enumerate() {
            let inds: Vec<usize> = (0..n + 1).collect();
            cache.store_split(*split, &create_graph(n + 1), &inds).unwrap();
        }
        assert!(cache.is_complete());

        let artifacts = cache.load().unwrap();
        assert_eq!(artifacts.val, create_graph(2));
        assert_eq!(artifacts.inds(SplitName::Test), &[0, 1, 2]);
        assert_eq!(artifacts.graph(SplitName::Train).num_edges(), 1);
    }

    #[test]
    fn test_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tx.csv");
        let config = PipelineConfig::ledger(&source).with_ports(false);
        let cache = DatasetCache::new(&source, &config).unwrap();

        cache.write_manifest(&config).unwrap();
        let manifest = cache.read_manifest().unwrap();
        assert_eq!(manifest.key, cache.key().to_hex());
        assert!(!manifest.ports);
        assert_eq!(manifest.edge_features.len(), 4);
        assert_eq!(manifest.format_version, FORMAT_VERSION);
    }

    #[test]
    fn test_out_dir_created_on_store() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tx.csv");
        let config = PipelineConfig::ledger(&source).with_out_dir(dir.path().join("processed"));
        let cache = DatasetCache::new(&source, &config).unwrap();

        cache.store_split(SplitName::Train, &create_graph(1), &[0]).unwrap();
        assert!(dir.path().join("processed").is_dir());
        assert!(cache.paths().is_partial());
    }
}
