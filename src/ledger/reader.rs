//! Typed CSV reading of transaction ledgers.

use crate::core::{Error, Result};
use crate::ledger::schema::{validate_columns, TransactionRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// CSV reader whose header has been validated against the ledger schema.
pub struct LedgerReader<R: Read> {
    reader: csv::Reader<R>,
    columns: Vec<String>,
    extra: Vec<String>,
}

impl LedgerReader<File> {
    /// Open a ledger file and validate its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            Error::Config(format!("cannot open ledger {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }
}

impl<R: Read> LedgerReader<R> {
    /// Wrap any reader producing comma-separated text with a header row.
    pub fn from_reader(input: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(input);

        let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let extra = validate_columns(&columns)?;

        Ok(Self {
            reader,
            columns,
            extra,
        })
    }

    /// All columns in the header.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Columns present in the file but not used.
    pub fn extra_columns(&self) -> &[String] {
        &self.extra
    }

    /// Read and check every record.
    ///
    /// Errors carry the line the offending record starts on.
    pub fn read_all(mut self) -> Result<Vec<TransactionRecord>> {
        let headers = self.reader.headers()?.clone();
        let mut records = Vec::new();
        for row in self.reader.into_records() {
            let row = row.map_err(|e| Error::InvalidRecord {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);

            let record: TransactionRecord = row
                .deserialize(Some(&headers))
                .map_err(|e| Error::InvalidRecord {
                    line,
                    reason: e.to_string(),
                })?;
            if record.is_laundering > 1 {
                return Err(Error::InvalidRecord {
                    line,
                    reason: format!("'Is Laundering' must be 0 or 1, got {}", record.is_laundering),
                });
            }
            records.push(record);
        }
        Ok(records)
    }
}
