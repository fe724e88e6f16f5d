//! AMLworld-style dataset loader.
//!
//! A dataset root holds `raw/formatted_transactions.csv`; prepared splits are
//! cached under `processed/`. Each split is loaded on its own as a graph plus
//! the index set of that split's days.

use crate::config::PipelineConfig;
use crate::core::{EdgeIndex, Error, Matrix, Result, SplitName};
use crate::graph::GraphData;
use crate::pipeline::{self, SplitData};
use crate::split::SplitRatios;
use std::path::{Path, PathBuf};
use tracing::info;

/// Ledger file name inside `raw/`.
pub const RAW_FILE: &str = "formatted_transactions.csv";

/// One split of an AMLworld dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitGraph {
    pub split: SplitName,
    pub graph: GraphData,
    /// Edge indices of this split's days (`tr_inds`, `val_inds` or `te_inds`)
    pub inds: Vec<usize>,
}

impl SplitGraph {
    pub fn x(&self) -> &Matrix {
        &self.graph.x
    }

    pub fn y(&self) -> &[u8] {
        &self.graph.y
    }

    pub fn edge_index(&self) -> &EdgeIndex {
        &self.graph.edge_index
    }

    pub fn edge_attr(&self) -> &Matrix {
        &self.graph.edge_attr
    }

    pub fn timestamps(&self) -> &[u64] {
        &self.graph.timestamps
    }

    /// Index set together with its attribute name.
    pub fn index_attr(&self) -> (&'static str, &[usize]) {
        (self.split.index_attr(), &self.inds)
    }
}

/// Dataset rooted at a directory.
#[derive(Clone, Debug)]
pub struct AmlWorld {
    root: PathBuf,
    config: PipelineConfig,
}

impl AmlWorld {
    /// Open the dataset at `root`, failing before any work if it is unusable.
    pub fn new(root: impl Into<PathBuf>, ports: bool) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Config(format!(
                "dataset root {} is not a directory",
                root.display()
            )));
        }
        let raw = root.join("raw").join(RAW_FILE);
        if !raw.is_file() {
            return Err(Error::Config(format!(
                "dataset root {} has no {}",
                root.display(),
                Path::new("raw").join(RAW_FILE).display()
            )));
        }

        let config = PipelineConfig::ledger(raw)
            .with_out_dir(root.join("processed"))
            .with_ports(ports);
        Ok(Self { root, config })
    }

    /// Use non-default split ratios.
    pub fn with_split(mut self, ratios: SplitRatios) -> Self {
        self.config.split = ratios;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load one split, preparing the dataset first if needed.
    pub fn split(&self, split: SplitName) -> Result<SplitGraph> {
        let cache = pipeline::prepare(&self.config)?;
        Ok(SplitGraph {
            split,
            graph: cache.load_graph(split)?,
            inds: cache.load_inds(split)?,
        })
    }
}

/// Load all three splits from the configured dataset root.
pub fn load_aml_world(config: &PipelineConfig) -> Result<SplitData> {
    let root = config
        .root
        .as_deref()
        .ok_or_else(|| Error::Config("the aml_world loader requires a dataset root".into()))?;
    let dataset = AmlWorld::new(root, config.ports)?.with_split(config.split);
    info!("Loading AMLworld dataset from {}", dataset.root().display());

    let train = dataset.split(SplitName::Train)?;
    let val = dataset.split(SplitName::Val)?;
    let test = dataset.split(SplitName::Test)?;

    Ok(SplitData::from_artifacts(
        crate::cache::SplitArtifacts {
            train: train.graph,
            val: val.graph,
            test: test.graph,
            train_inds: train.inds,
            val_inds: val.inds,
            test_inds: test.inds,
        },
        config.reverse_mp,
        config.ports,
    ))
}
