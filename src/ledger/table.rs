//! The normalized, in-memory ledger.

use crate::core::{EdgeIndex, Error, Matrix, Result};
use crate::graph::GraphData;
use crate::ledger::reader::LedgerReader;
use crate::ledger::schema::{TransactionRecord, EDGE_FEATURES, NODE_FEATURES};
use std::path::Path;
use tracing::{info, warn};

/// Node table rows allowed per transaction. Account ids index the node table
/// directly, so ids far beyond the ledger size are rejected.
pub const MAX_NODES_PER_EDGE: usize = 64;

/// Ledger statistics reported at load time.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerStats {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub illicit: usize,
}

impl LedgerStats {
    /// Fraction of illicit transactions.
    pub fn illicit_ratio(&self) -> f64 {
        if self.num_edges == 0 {
            0.0
        } else {
            self.illicit as f64 / self.num_edges as f64
        }
    }

    /// `Illicit ratio = {illicit} / {edges} = {pct}%`.
    pub fn illicit_summary(&self) -> String {
        format!(
            "Illicit ratio = {} / {} = {:.2}%",
            self.illicit,
            self.num_edges,
            self.illicit_ratio() * 100.0
        )
    }
}

/// The full transaction graph with timestamps shifted to start at 0.
#[derive(Clone, Debug)]
pub struct Ledger {
    /// Every transaction as one graph
    pub graph: GraphData,
    /// Original timestamp of the earliest transaction
    pub origin: i64,
}

impl Ledger {
    /// Read, validate and normalize a ledger file.
    pub fn load(path: &Path) -> Result<Self> {
        let reader = LedgerReader::open(path)?;
        info!("Available Edge Features: {:?}", reader.columns());
        if !reader.extra_columns().is_empty() {
            warn!("Ignoring unused columns: {:?}", reader.extra_columns());
        }

        let records = reader.read_all()?;
        Self::from_records(&records)
    }

    /// Build the ledger from parsed records.
    pub fn from_records(records: &[TransactionRecord]) -> Result<Self> {
        let origin = records
            .iter()
            .map(|r| r.timestamp)
            .min()
            .ok_or(Error::EmptyLedger)?;

        let max_id = records
            .iter()
            .map(|r| r.from_id.max(r.to_id))
            .max()
            .unwrap_or(0);
        let node_limit = records.len().saturating_mul(MAX_NODES_PER_EDGE);
        let num_nodes = usize::try_from(max_id)
            .ok()
            .and_then(|id| id.checked_add(1))
            .filter(|&n| n <= node_limit)
            .ok_or_else(|| {
                Error::Shape(format!(
                    "account id {} too large for {} transactions (at most {} accounts)",
                    max_id,
                    records.len(),
                    node_limit
                ))
            })?;

        let mut src = Vec::with_capacity(records.len());
        let mut dst = Vec::with_capacity(records.len());
        let mut attrs = Vec::with_capacity(records.len() * EDGE_FEATURES.len());
        let mut timestamps = Vec::with_capacity(records.len());
        let mut y = Vec::with_capacity(records.len());

        for (n, record) in records.iter().enumerate() {
            let ts = record.timestamp.checked_sub(origin).ok_or_else(|| {
                Error::Shape(format!(
                    "timestamp {} of record {} is too far from the earliest timestamp {}",
                    record.timestamp, n, origin
                ))
            })? as u64;
            src.push(record.from_id);
            dst.push(record.to_id);
            attrs.extend_from_slice(&record.edge_features(ts));
            timestamps.push(ts);
            y.push(record.is_laundering);
        }

        let graph = GraphData::new(
            Matrix::filled(num_nodes, NODE_FEATURES.len(), 1.0),
            y,
            EdgeIndex::new(src, dst)?,
            Matrix::new(records.len(), EDGE_FEATURES.len(), attrs)?,
            timestamps,
        )?;

        Ok(Self { graph, origin })
    }

    pub fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    pub fn num_edges(&self) -> usize {
        self.graph.num_edges()
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            num_nodes: self.num_nodes(),
            num_edges: self.num_edges(),
            illicit: self.graph.illicit_count(),
        }
    }

    /// Log dataset statistics and the feature sets in use.
    pub fn log_stats(&self) {
        let stats = self.stats();
        info!("{}", stats.illicit_summary());
        info!(
            "Number of nodes (holdings doing transactions) = {}",
            stats.num_nodes
        );
        info!("Number of transactions = {}", stats.num_edges);
        info!("Edge features being used: {:?}", EDGE_FEATURES);
        info!(
            "Node features being used: {:?} (\"Feature\" is a placeholder feature of all 1s)",
            NODE_FEATURES
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::schema::REQUIRED_COLUMNS;

    fn record(from: u64, to: u64, ts: i64, label: u8) -> TransactionRecord {
        TransactionRecord {
            from_id: from,
            to_id: to,
            timestamp: ts,
            amount_received: 100.0,
            received_currency: 1.0,
            payment_format: 2.0,
            is_laundering: label,
        }
    }

    #[test]
    fn test_timestamps_normalized() {
        let records = vec![
            record(0, 1, 1_662_000_500, 0),
            record(1, 4, 1_662_000_000, 1),
            record(2, 0, 1_662_090_000, 0),
        ];
        let ledger = Ledger::from_records(&records).unwrap();

        assert_eq!(ledger.origin, 1_662_000_000);
        assert_eq!(ledger.graph.timestamps, vec![500, 0, 90_000]);
        // timestamp column carries the normalized value
        assert_eq!(ledger.graph.edge_attr.row(0), &[500.0, 100.0, 1.0, 2.0]);
    }

    #[test]
    fn test_node_table() {
        let records = vec![record(0, 1, 0, 0), record(1, 4, 10, 1)];
        let ledger = Ledger::from_records(&records).unwrap();

        // ids 2 and 3 are never referenced but still get a row
        assert_eq!(ledger.num_nodes(), 5);
        assert_eq!(ledger.graph.x.shape(), (5, 1));
        assert!(ledger.graph.x.as_slice().iter().all(|&v| v == 1.0));
        assert_eq!(ledger.num_edges(), 2);
    }

    #[test]
    fn test_oversized_account_id_rejected() {
        let records = vec![record(u64::MAX, 0, 10, 0), record(0, 1, 20, 0)];
        assert!(matches!(Ledger::from_records(&records), Err(Error::Shape(_))));

        let sparse = vec![record(10_000_000_000_000, 0, 10, 0)];
        assert!(matches!(Ledger::from_records(&sparse), Err(Error::Shape(_))));

        let within = vec![record(127, 0, 10, 0), record(0, 1, 20, 0)];
        assert_eq!(Ledger::from_records(&within).unwrap().num_nodes(), 128);
    }

    #[test]
    fn test_timestamp_span_overflow_rejected() {
        let records = vec![record(0, 1, i64::MIN, 0), record(1, 0, i64::MAX, 0)];
        assert!(matches!(Ledger::from_records(&records), Err(Error::Shape(_))));
    }

    #[test]
    fn test_overflowing_csv_rows_rejected() {
        let header = REQUIRED_COLUMNS.join(",");
        let load = |text: String| {
            let records = LedgerReader::from_reader(text.as_bytes())
                .unwrap()
                .read_all()
                .unwrap();
            Ledger::from_records(&records)
        };

        let huge_id = format!("{}\n{},0,10,1.0,0,0,0\n", header, u64::MAX);
        assert!(matches!(load(huge_id), Err(Error::Shape(_))));

        let span = format!(
            "{}\n0,1,{},1.0,0,0,0\n1,0,{},1.0,0,0,0\n",
            header,
            i64::MIN,
            i64::MAX
        );
        assert!(matches!(load(span), Err(Error::Shape(_))));
    }

    #[test]
    fn test_empty_ledger() {
        assert!(matches!(Ledger::from_records(&[]), Err(Error::EmptyLedger)));
    }

    #[test]
    fn test_illicit_summary() {
        let mut records: Vec<_> = (0..200).map(|i| record(i, i + 1, i as i64, 0)).collect();
        for r in records.iter_mut().take(25) {
            r.is_laundering = 1;
        }
        let ledger = Ledger::from_records(&records).unwrap();
        let stats = ledger.stats();

        assert_eq!(stats.illicit, 25);
        assert_eq!(stats.illicit_summary(), "Illicit ratio = 25 / 200 = 12.50%");
    }
}
