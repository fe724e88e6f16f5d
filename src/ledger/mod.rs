//! Raw Edge Loader
//!
//! Reads the transaction ledger into a single normalized graph:
//! - Schema validation of the CSV header
//! - Typed record parsing
//! - Timestamp normalization and placeholder node features

pub mod reader;
pub mod schema;
pub mod table;

pub use reader::LedgerReader;
pub use schema::{TransactionRecord, EDGE_FEATURES, NODE_FEATURES, REQUIRED_COLUMNS};
pub use table::{Ledger, LedgerStats, MAX_NODES_PER_EDGE};
