//! Cache key derivation.
//!
//! The key covers everything that changes the artifacts: the dataset location,
//! the feature sets, the port option and the split ratios.

use crate::config::PipelineConfig;
use crate::core::{CacheKey, Error, Result};
use crate::ledger::{EDGE_FEATURES, NODE_FEATURES};
use sha3::{Digest, Sha3_256};
use std::path::{Path, PathBuf};

/// Artifact format version. Bumping it orphans every existing cache.
pub const FORMAT_VERSION: u8 = 1;

/// SHA3-256 over length-prefixed parts.
pub fn sha3_256_multi(parts: &[&[u8]]) -> CacheKey {
    let mut hasher = Sha3_256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    CacheKey::new(bytes)
}

/// Absolute path of `source` with its directory resolved.
///
/// Only the directory must exist, so a key can be derived for a ledger that
/// has been moved away once its artifacts are cached.
pub fn canonical_source(source: &Path) -> Result<PathBuf> {
    let file_name = source
        .file_name()
        .ok_or_else(|| Error::Config(format!("{} is not a file path", source.display())))?;
    let dir = source
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let dir = dir.canonicalize().map_err(|e| {
        Error::Config(format!("dataset directory {} not found: {}", dir.display(), e))
    })?;
    Ok(dir.join(file_name))
}

impl CacheKey {
    /// Key for the artifacts of `source` prepared under `config`.
    pub fn derive(source: &Path, config: &PipelineConfig) -> Result<Self> {
        let source = canonical_source(source)?;
        let source = source.to_string_lossy();
        let edge_features = EDGE_FEATURES.join("\u{1f}");
        let node_features = NODE_FEATURES.join("\u{1f}");
        let ratios: Vec<u8> = config
            .split
            .as_array()
            .iter()
            .flat_map(|r| r.to_le_bytes())
            .collect();

        Ok(sha3_256_multi(&[
            &[FORMAT_VERSION][..],
            source.as_bytes(),
            edge_features.as_bytes(),
            node_features.as_bytes(),
            &[config.ports as u8],
            &ratios,
        ]))
    }
}
