//! Pipeline configuration.
//!
//! Read from a JSON file (`data_config.json` style) and overridden by CLI flags.

use crate::core::{Error, Result};
use crate::split::SplitRatios;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which loader produces the split graphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderKind {
    /// Split and materialize a raw transaction ledger
    #[default]
    Ledger,
    /// Load from an AMLworld-style dataset root
    AmlWorld,
}

/// Configuration consumed by the data pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Path to the raw transaction table
    pub data: Option<PathBuf>,
    /// Dataset root for the AMLworld loader
    pub root: Option<PathBuf>,
    /// Loader selection
    pub loader: LoaderKind,
    /// Convert each split into a graph with reverse relations
    pub reverse_mp: bool,
    /// Append port numberings to edge attributes
    pub ports: bool,
    /// Target split proportions
    pub split: SplitRatios,
    /// Directory for cache artifacts (defaults to the ledger's directory)
    pub out_dir: Option<PathBuf>,
    /// Seed for synthetic data generation
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data: None,
            root: None,
            loader: LoaderKind::Ledger,
            reverse_mp: false,
            ports: true,
            split: SplitRatios::default(),
            out_dir: None,
            seed: 1,
        }
    }
}

impl PipelineConfig {
    /// Config for splitting the ledger at `path`.
    pub fn ledger(path: impl Into<PathBuf>) -> Self {
        Self {
            data: Some(path.into()),
            ..Default::default()
        }
    }

    /// Config for the AMLworld loader rooted at `root`.
    pub fn aml_world(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            loader: LoaderKind::AmlWorld,
            ..Default::default()
        }
    }

    pub fn with_reverse_mp(mut self, enabled: bool) -> Self {
        self.reverse_mp = enabled;
        self
    }

    pub fn with_ports(mut self, enabled: bool) -> Self {
        self.ports = enabled;
        self
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    pub fn with_split(mut self, split: SplitRatios) -> Self {
        self.split = split;
        self
    }

    /// Load a config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Check the config is usable for the selected loader.
    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        match self.loader {
            LoaderKind::Ledger => {
                self.data_path()?;
            }
            LoaderKind::AmlWorld => {
                if self.root.is_none() {
                    return Err(Error::Config(
                        "the aml_world loader requires a dataset root".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Path of the raw ledger.
    pub fn data_path(&self) -> Result<&Path> {
        self.data
            .as_deref()
            .ok_or_else(|| Error::Config("no transaction ledger path configured".into()))
    }
}
