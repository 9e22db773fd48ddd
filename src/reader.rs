//! Token Transfer CSV Reader
//!
//! Reads Etherscan "token transfer" exports. Required columns:
//! Txhash, UnixTimestamp, DateTime, TokenSymbol, From, To, Value.
//! Other columns (ContractAddress, TokenName, ...) are ignored.
//! Values may be quoted and comma-grouped ("1,234.5").

use crate::types::TransferRow;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Streaming reader over transfer rows
pub struct TransferCsvReader<R: Read> {
    inner: csv::Reader<R>,
    /// Shown in error messages (file path or "<memory>")
    source: String,
}

impl TransferCsvReader<File> {
    /// Open an export file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open transfer export: {:?}", path))?;
        Ok(Self::from_reader(file, &path.display().to_string()))
    }
}

impl<R: Read> TransferCsvReader<R> {
    pub fn from_reader(reader: R, source: &str) -> Self {
        let inner = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        Self {
            inner,
            source: source.to_string(),
        }
    }

    /// Lazily deserialize rows in file order. Line numbers in errors count
    /// the header as line 1.
    pub fn rows(&mut self) -> impl Iterator<Item = Result<TransferRow>> + '_ {
        let source = &self.source;
        self.inner
            .deserialize::<TransferRow>()
            .enumerate()
            .map(move |(i, row)| {
                row.with_context(|| format!("Malformed row at line {} of {}", i + 2, source))
            })
    }
}
