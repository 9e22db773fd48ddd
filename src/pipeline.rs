//! Conversion pipeline
//!
//! CSV rows -> group by tx -> classify -> timesteps -> JSON document.
//! One-shot batch transform: the first error aborts the run, no retries.

use crate::classifier::ActionClassifier;
use crate::config::ConverterConfig;
use crate::grouper::TransactionGrouper;
use crate::reader::TransferCsvReader;
use crate::summary::ActionSummary;
use crate::timestep::annotate_timesteps;
use crate::types::{GroupedTransaction, PoolAction, TransactionRecord, TransferRow};
use crate::writer::write_document;
use anyhow::{Context, Result};
use tracing::info;

/// Run the in-memory stages over a row stream
pub fn process_rows<I>(rows: I, pool_address: &str) -> Result<Vec<TransactionRecord>>
where
    I: IntoIterator<Item = Result<TransferRow>>,
{
    let mut grouper = TransactionGrouper::new();
    for row in rows {
        grouper.push_row(row?)?;
    }
    info!(
        "Grouped {} transfers into {} transactions",
        grouper.rows_seen(),
        grouper.len()
    );

    process_grouped(grouper.finish(), pool_address)
}

/// Classify and annotate already-grouped transactions
pub fn process_grouped(
    transactions: Vec<GroupedTransaction>,
    pool_address: &str,
) -> Result<Vec<TransactionRecord>> {
    let classifier = ActionClassifier::new(pool_address);
    let classified = classifier
        .classify_all(transactions)
        .context("Failed to classify transactions")?;
    let records = annotate_timesteps(classified).context("Failed to compute timesteps")?;
    Ok(records)
}

/// Re-derive actions from records' own transfers, e.g. after reading a
/// document back. Indices are reassigned in the given order.
pub fn reclassify(records: &[TransactionRecord], pool_address: &str) -> Result<Vec<PoolAction>> {
    let classifier = ActionClassifier::new(pool_address);
    records
        .iter()
        .map(|record| {
            classifier
                .classify(&record.to_grouped())
                .with_context(|| format!("Failed to reclassify {}", record.tx_hash))
        })
        .collect()
}

/// Convert an export file into an action document
pub fn convert_file(config: &ConverterConfig) -> Result<ActionSummary> {
    info!("Reading transfers from {:?}", config.input);
    info!("Pool address: {}", config.pool_address);

    let mut reader = TransferCsvReader::open(&config.input)?;
    let records = process_rows(reader.rows(), &config.pool_address)?;

    let written = write_document(&config.output, &records, config.pretty)?;
    info!("Wrote {} transactions to {:?}", written, config.output);

    Ok(ActionSummary::from_records(&records))
}
