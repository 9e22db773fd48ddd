//! Action Document Writer
//!
//! Serializes annotated transactions as one JSON array:
//! [{ tx_hash, unixtimestamp, datetime, tokens, index, action, timestep }, ...]
//!
//! Pretty output uses 4-space indentation. Amounts are JSON numbers.

use crate::types::TransactionRecord;
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Serialize records into any writer
pub fn write_records<W: Write>(writer: W, records: &[TransactionRecord], pretty: bool) -> Result<()> {
    if pretty {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = Serializer::with_formatter(writer, formatter);
        records
            .serialize(&mut ser)
            .context("Failed to serialize transaction records")?;
    } else {
        serde_json::to_writer(writer, records).context("Failed to serialize transaction records")?;
    }
    Ok(())
}

/// Write the document to `path`, creating parent directories as needed.
/// Returns the number of records written.
pub fn write_document<P: AsRef<Path>>(path: P, records: &[TransactionRecord], pretty: bool) -> Result<usize> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    write_records(&mut writer, records, pretty)?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush output file: {:?}", path))?;

    Ok(records.len())
}

/// Read a previously written document back
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Vec<TransactionRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open action document: {:?}", path))?;
    let records = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse action document: {:?}", path))?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PoolAction, TokenTransfer};
    use indexmap::IndexMap;
    use rust_decimal_macros::dec;
    use std::env;

    fn swap_record() -> TransactionRecord {
        let mut tokens = IndexMap::new();
        tokens.insert("DAI".to_string(), vec![TokenTransfer::new("user1", "pool", dec!(50))]);
        tokens.insert("USDT".to_string(), vec![TokenTransfer::new("pool", "user1", dec!(49))]);

        TransactionRecord {
            tx_hash: "0xS".to_string(),
            unix_timestamp: 1000,
            datetime: "1970-01-01 00:16:40".to_string(),
            transfers_by_token: tokens,
            sequence_index: 0,
            action: PoolAction::Swap {
                token_in: "DAI".to_string(),
                token_amount_in: dec!(50),
                token_out: "USDT".to_string(),
                token_amount_out: dec!(49),
            },
            timestep: 0,
        }
    }

    #[test]
    fn test_document_shape() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[swap_record()], false).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        let tx = &doc[0];
        assert_eq!(tx["tx_hash"], "0xS");
        assert_eq!(tx["unixtimestamp"], 1000);
        assert_eq!(tx["index"], 0);
        assert_eq!(tx["timestep"], 0);
        assert_eq!(tx["tokens"]["DAI"][0]["to"], "pool");
        assert_eq!(tx["tokens"]["USDT"][0]["value"].as_f64(), Some(49.0));
        assert_eq!(tx["action"]["type"], "swap");
        assert_eq!(tx["action"]["token_out"], "USDT");
    }

    #[test]
    fn test_pretty_output_uses_four_spaces() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[swap_record()], true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("[\n    {\n        \"tx_hash\""));
    }

    #[test]
    fn test_write_and_read_back() {
        let temp_dir = env::temp_dir().join("pool_actions_writer_test");
        let _ = fs::remove_dir_all(&temp_dir);

        let path = temp_dir.join("nested").join("actions.json");
        let written = write_document(&path, &[swap_record()], true).unwrap();
        assert_eq!(written, 1);

        let records = read_document(&path).unwrap();
        assert_eq!(records, vec![swap_record()]);

        let _ = fs::remove_dir_all(&temp_dir);
    }
}
