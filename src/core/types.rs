//! Common types used across amlgraph modules.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Length of one day bucket in seconds.
pub const SECONDS_PER_DAY: u64 = 24 * 3600;

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}

/// One of the three temporal splits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitName {
    Train,
    Val,
    Test,
}

impl SplitName {
    /// All splits in time order.
    pub const ALL: [SplitName; 3] = [SplitName::Train, SplitName::Val, SplitName::Test];

    /// Short name used in artifact file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitName::Train => "train",
            SplitName::Val => "val",
            SplitName::Test => "test",
        }
    }

    /// Name of the split's index attribute in AMLworld objects.
    pub fn index_attr(&self) -> &'static str {
        match self {
            SplitName::Train => "tr_inds",
            SplitName::Val => "val_inds",
            SplitName::Test => "te_inds",
        }
    }
}

impl std::fmt::Display for SplitName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SplitName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train" => Ok(SplitName::Train),
            "val" => Ok(SplitName::Val),
            "test" => Ok(SplitName::Test),
            other => Err(Error::Config(format!("unknown split '{}'", other))),
        }
    }
}

/// A 256-bit cache key (SHA3-256 of dataset identity and config).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(pub [u8; 32]);

impl CacheKey {
    /// Create a key from raw digest bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the bytes of the key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 12 hex characters, used in artifact file names.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Dense row-major `f32` matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Create a matrix from row-major data.
    pub fn new(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::Shape(format!(
                "matrix {}x{} needs {} values, got {}",
                rows,
                cols,
                rows * cols,
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Matrix with every entry set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn row(&self, r: usize) -> &[f32] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn get(&self, r: usize, c: usize) -> f32 {
        self.data[r * self.cols + c]
    }

    pub fn set(&mut self, r: usize, c: usize, value: f32) {
        self.data[r * self.cols + c] = value;
    }

    /// Copy of column `c`.
    pub fn column(&self, c: usize) -> Vec<f32> {
        (0..self.rows).map(|r| self.get(r, c)).collect()
    }

    /// New matrix holding the given rows, in the given order.
    pub fn select_rows(&self, inds: &[usize]) -> Self {
        let mut data = Vec::with_capacity(inds.len() * self.cols);
        for &r in inds {
            data.extend_from_slice(self.row(r));
        }
        Self {
            rows: inds.len(),
            cols: self.cols,
            data,
        }
    }

    /// Append one column per slice to the right of the matrix.
    pub fn append_columns(&mut self, columns: &[&[f32]]) -> Result<()> {
        if let Some(bad) = columns.iter().find(|c| c.len() != self.rows) {
            return Err(Error::Shape(format!(
                "column of length {} appended to matrix with {} rows",
                bad.len(),
                self.rows
            )));
        }

        let new_cols = self.cols + columns.len();
        let mut data = Vec::with_capacity(self.rows * new_cols);
        for r in 0..self.rows {
            data.extend_from_slice(self.row(r));
            data.extend(columns.iter().map(|c| c[r]));
        }
        self.cols = new_cols;
        self.data = data;
        Ok(())
    }

    /// Swap two columns in place.
    pub fn swap_columns(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for r in 0..self.rows {
            self.data.swap(r * self.cols + a, r * self.cols + b);
        }
    }
}

/// Directed edge list as two parallel endpoint vectors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeIndex {
    /// Source node of each edge
    pub src: Vec<u64>,
    /// Destination node of each edge
    pub dst: Vec<u64>,
}

impl EdgeIndex {
    /// Create an edge index, checking both sides have equal length.
    pub fn new(src: Vec<u64>, dst: Vec<u64>) -> Result<Self> {
        if src.len() != dst.len() {
            return Err(Error::Shape(format!(
                "edge index sides differ: {} sources, {} destinations",
                src.len(),
                dst.len()
            )));
        }
        Ok(Self { src, dst })
    }

    pub fn len(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// Iterate `(src, dst)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.src.iter().copied().zip(self.dst.iter().copied())
    }

    /// Edges at the given positions, in the given order.
    pub fn select(&self, inds: &[usize]) -> Self {
        Self {
            src: inds.iter().map(|&i| self.src[i]).collect(),
            dst: inds.iter().map(|&i| self.dst[i]).collect(),
        }
    }

    /// Same edges with source and destination exchanged.
    pub fn flipped(&self) -> Self {
        Self {
            src: self.dst.clone(),
            dst: self.src.clone(),
        }
    }
}
