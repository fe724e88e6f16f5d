//! On-disk artifact encoding: bincode, LZ4-compressed, behind a magic header.

use crate::cache::key::FORMAT_VERSION;
use crate::core::{Error, Result};
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Leading bytes of every artifact.
pub const MAGIC: &[u8; 4] = b"AMLG";

const HEADER_LEN: usize = MAGIC.len() + 1;

/// Size statistics of one encoded artifact.
#[derive(Clone, Debug, Default)]
pub struct CompressionStats {
    /// Serialized size in bytes
    pub original_size: usize,
    /// Compressed size in bytes
    pub compressed_size: usize,
    /// Compression ratio (original / compressed)
    pub ratio: f64,
}

/// Serialize and compress `value`.
pub fn encode<T: Serialize>(value: &T) -> Result<(Vec<u8>, CompressionStats)> {
    let raw = bincode::serialize(value)?;
    let compressed = compress_prepend_size(&raw);

    let stats = CompressionStats {
        original_size: raw.len(),
        compressed_size: compressed.len(),
        ratio: if compressed.is_empty() {
            1.0
        } else {
            raw.len() as f64 / compressed.len() as f64
        },
    };

    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
    out.extend_from_slice(MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&compressed);
    Ok((out, stats))
}

/// Check the header, decompress and deserialize.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(Error::Cache("not an amlgraph artifact".into()));
    }
    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(Error::Cache(format!(
            "artifact format version {} (expected {})",
            version, FORMAT_VERSION
        )));
    }

    let raw = decompress_size_prepended(&bytes[HEADER_LEN..])
        .map_err(|e| Error::DeserializationError(e.to_string()))?;
    bincode::deserialize(&raw).map_err(|e| Error::DeserializationError(e.to_string()))
}

/// Encode `value` into the file at `path`.
///
/// The bytes go to a sibling temporary file that is renamed into place, so
/// `path` either does not exist or holds a complete artifact.
pub fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<CompressionStats> {
    let (bytes, stats) = encode(value)?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    debug!(
        "wrote {} ({} -> {} bytes, ratio {:.2})",
        path.display(),
        stats.original_size,
        stats.compressed_size,
        stats.ratio
    );
    Ok(stats)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Decode the file at `path`.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path)?;
    decode(&bytes).map_err(|e| match e {
        Error::Cache(msg) => Error::Cache(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}
