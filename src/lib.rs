//! # amlgraph - temporal graph preparation for anti-money-laundering models
//!
//! Turns a transaction ledger into train/validation/test graphs:
//! - **ledger**: typed CSV loading, schema checks and normalization
//! - **temporal** / **split**: day binning and the ratio-matching split search
//! - **graph** / **pipeline**: per-split graphs with ports and z-normalization
//! - **cache**: content-keyed persistence of the six split artifacts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use amlgraph::{config::PipelineConfig, pipeline};
//!
//! fn main() -> amlgraph::Result<()> {
//!     let config = PipelineConfig::ledger("data/HI-Small_formatted_transactions.csv");
//!     let data = pipeline::get_data(&config)?;
//!     println!("train edges: {}", data.train.num_edges());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod core;
pub mod dataset;
pub mod graph;
pub mod ledger;
pub mod monitoring;
pub mod pipeline;
pub mod split;
pub mod synthetic;
pub mod temporal;

pub use core::error::{Error, Result};
pub use pipeline::{get_data, SplitData};
