//! Cache path utilities.
//!
//! Artifacts sit beside the ledger (or in an explicit output directory) and are
//! named `{basename}{key}_{artifact}.bin`, where `basename` is the ledger file
//! name cut at the `formatted` marker.

use crate::core::{CacheKey, SplitName};
use std::path::{Path, PathBuf};

/// Marker separating the dataset name from the rest of the ledger file name.
pub const BASENAME_MARKER: &str = "formatted";

/// Artifact file extension.
pub const ARTIFACT_EXT: &str = "bin";

/// The six artifact paths of one dataset, plus its manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachePaths {
    dir: PathBuf,
    prefix: String,
}

impl CachePaths {
    /// Paths for `source` under `key`, in `out_dir` or the source's directory.
    pub fn for_source(source: &Path, key: &CacheKey, out_dir: Option<&Path>) -> Self {
        let dir = match out_dir {
            Some(dir) => dir.to_path_buf(),
            None => source
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        Self {
            dir,
            prefix: format!("{}{}", basename(source), key.short()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Graph artifact of a split.
    pub fn graph(&self, split: SplitName) -> PathBuf {
        self.artifact(split.as_str())
    }

    /// Index-set artifact of a split.
    pub fn inds(&self, split: SplitName) -> PathBuf {
        self.artifact(&format!("{}_inds", split.as_str()))
    }

    /// Informational manifest (not part of the hit check).
    pub fn manifest(&self) -> PathBuf {
        self.dir.join(format!("{}_manifest.json", self.prefix))
    }

    /// All six artifact paths: three graphs, then three index sets.
    pub fn all(&self) -> Vec<PathBuf> {
        SplitName::ALL
            .iter()
            .map(|&s| self.graph(s))
            .chain(SplitName::ALL.iter().map(|&s| self.inds(s)))
            .collect()
    }

    /// Cache hit: every artifact exists.
    pub fn is_complete(&self) -> bool {
        self.all().iter().all(|p| p.exists())
    }

    /// Some but not all artifacts exist.
    pub fn is_partial(&self) -> bool {
        let present = self.all().iter().filter(|p| p.exists()).count();
        present > 0 && present < 6
    }

    fn artifact(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.{}", self.prefix, name, ARTIFACT_EXT))
    }
}

/// File name of `source` with the marker and everything after it removed.
/// Without the marker, the file stem followed by `_`.
pub fn basename(source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.find(BASENAME_MARKER) {
        Some(pos) => name[..pos].to_string(),
        None => {
            let stem = source
                .file_stem()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("{}_", stem)
        }
    }
}
