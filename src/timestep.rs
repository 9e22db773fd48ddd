//! Timestep Annotator
//!
//! Seconds elapsed between consecutive transactions, in sequence order.
//! Each step depends on the previous record, so this pass is sequential.

use crate::error::ClassifyError;
use crate::types::{ClassifiedTransaction, TransactionRecord};
use chrono::{DateTime, Utc};
use tracing::warn;

/// Carries the previous record's instant across calls
#[derive(Debug, Default)]
pub struct TimestepAnnotator {
    previous: Option<DateTime<Utc>>,
}

impl TimestepAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotate the next record in sequence order. The first record gets 0.
    pub fn annotate(&mut self, classified: ClassifiedTransaction) -> Result<TransactionRecord, ClassifyError> {
        let ts = classified.transaction.unix_timestamp;
        let at = DateTime::<Utc>::from_timestamp(ts, 0).ok_or_else(|| {
            ClassifyError::TimestampOutOfRange {
                tx_hash: classified.transaction.tx_hash.clone(),
                unix_timestamp: ts,
            }
        })?;

        let timestep = match self.previous {
            Some(prev) => (at - prev).num_seconds(),
            None => 0,
        };
        if timestep < 0 {
            warn!(
                "Timestamp went backwards at {} (index {}): {}s",
                classified.transaction.tx_hash, classified.sequence_index, timestep
            );
        }

        self.previous = Some(at);
        Ok(TransactionRecord::from_classified(classified, timestep))
    }
}

/// Annotate a full run. Records are put in `sequence_index` order first.
pub fn annotate_timesteps(
    mut classified: Vec<ClassifiedTransaction>,
) -> Result<Vec<TransactionRecord>, ClassifyError> {
    classified.sort_by_key(|c| c.sequence_index);

    let mut annotator = TimestepAnnotator::new();
    classified
        .into_iter()
        .map(|c| annotator.annotate(c))
        .collect()
}
