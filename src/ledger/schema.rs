//! Expected ledger columns and the feature sets drawn from them.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Columns every ledger must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "from_id",
    "to_id",
    "Timestamp",
    "Amount Received",
    "Received Currency",
    "Payment Format",
    "Is Laundering",
];

/// Edge attribute columns, in matrix order.
pub const EDGE_FEATURES: [&str; 4] = [
    "Timestamp",
    "Amount Received",
    "Received Currency",
    "Payment Format",
];

/// Node feature columns. "Feature" is a placeholder of all ones.
pub const NODE_FEATURES: [&str; 1] = ["Feature"];

/// One ledger row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub from_id: u64,
    pub to_id: u64,
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
    #[serde(rename = "Amount Received")]
    pub amount_received: f64,
    #[serde(rename = "Received Currency")]
    pub received_currency: f64,
    #[serde(rename = "Payment Format")]
    pub payment_format: f64,
    #[serde(rename = "Is Laundering")]
    pub is_laundering: u8,
}

impl TransactionRecord {
    /// Edge attributes in `EDGE_FEATURES` order, with the given timestamp.
    pub fn edge_features(&self, timestamp: u64) -> [f32; 4] {
        [
            timestamp as f32,
            self.amount_received as f32,
            self.received_currency as f32,
            self.payment_format as f32,
        ]
    }
}

/// Check a header against `REQUIRED_COLUMNS`.
///
/// Returns the extra (unused) columns; fails listing the missing ones.
pub fn validate_columns(columns: &[String]) -> Result<Vec<String>> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|req| !columns.iter().any(|c| c == *req))
        .map(|s| s.to_string())
        .collect();

    let extra: Vec<String> = columns
        .iter()
        .filter(|c| !REQUIRED_COLUMNS.contains(&c.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(extra)
    } else {
        Err(Error::Schema { missing, extra })
    }
}
