//! Temporal Day Binner
//!
//! Partitions transactions into fixed 86,400-second windows.

pub mod binning;

pub use binning::{DayBins, DayBucket};
