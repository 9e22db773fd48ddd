//! Per-run action summary printed after a conversion

use crate::types::{ActionKind, TransactionRecord};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionSummary {
    pub total_transactions: usize,
    pub total_transfers: usize,
    pub swaps: usize,
    pub joins: usize,
    pub join_swaps: usize,
    pub exits: usize,
    pub exit_swaps: usize,
    /// BPT minted across all join-family actions
    pub shares_minted: Decimal,
    /// BPT burned across all exit-family actions
    pub shares_burned: Decimal,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub negative_timesteps: usize,
}

impl ActionSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[TransactionRecord]) -> Self {
        let mut summary = Self::new();
        for record in records {
            summary.add_record(record);
        }
        summary
    }

    pub fn add_record(&mut self, record: &TransactionRecord) {
        self.total_transactions += 1;
        self.total_transfers += record.transfers_by_token.values().map(Vec::len).sum::<usize>();

        match record.action.kind() {
            ActionKind::Swap => self.swaps += 1,
            ActionKind::Join => self.joins += 1,
            ActionKind::JoinSwap => self.join_swaps += 1,
            ActionKind::Exit => self.exits += 1,
            ActionKind::ExitSwap => self.exit_swaps += 1,
        }

        if let Some(minted) = record.action.shares_minted() {
            self.shares_minted += minted;
        }
        if let Some(burned) = record.action.shares_burned() {
            self.shares_burned += burned;
        }

        if self.first_timestamp.is_none() {
            self.first_timestamp = Some(record.unix_timestamp);
        }
        self.last_timestamp = Some(record.unix_timestamp);

        if record.timestep < 0 {
            self.negative_timesteps += 1;
        }
    }

    pub fn count(&self, kind: ActionKind) -> usize {
        match kind {
            ActionKind::Swap => self.swaps,
            ActionKind::Join => self.joins,
            ActionKind::JoinSwap => self.join_swaps,
            ActionKind::Exit => self.exits,
            ActionKind::ExitSwap => self.exit_swaps,
        }
    }

    /// Seconds between the first and last record
    pub fn span_seconds(&self) -> i64 {
        match (self.first_timestamp, self.last_timestamp) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }

    pub fn report(&self) -> String {
        format!(
            r#"
═══════════════════════════════════════════════════════
           POOL ACTION SUMMARY
═══════════════════════════════════════════════════════

Transactions:        {}
Transfers:           {}
Time span:           {}s

ACTIONS:
  swap:              {}
  join:              {}
  join_swap:         {}
  exit:              {}
  exit_swap:         {}

POOL SHARES (BPT):
  Minted:            {}
  Burned:            {}
  Net:               {}

Negative timesteps:  {}
═══════════════════════════════════════════════════════
"#,
            self.total_transactions,
            self.total_transfers,
            self.span_seconds(),
            self.swaps,
            self.joins,
            self.join_swaps,
            self.exits,
            self.exit_swaps,
            self.shares_minted,
            self.shares_burned,
            self.shares_minted - self.shares_burned,
            self.negative_timesteps,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PoolAction, TokenTransfer};
    use indexmap::IndexMap;
    use rust_decimal_macros::dec;

    fn record(index: usize, ts: i64, timestep: i64, action: PoolAction) -> TransactionRecord {
        let mut tokens = IndexMap::new();
        tokens.insert("DAI".to_string(), vec![TokenTransfer::new("a", "b", dec!(1))]);
        TransactionRecord {
            tx_hash: format!("0x{index}"),
            unix_timestamp: ts,
            datetime: String::new(),
            transfers_by_token: tokens,
            sequence_index: index,
            action,
            timestep,
        }
    }

    #[test]
    fn test_summary_counts_and_shares() {
        let join = PoolAction::JoinSwap {
            pool_amount_out: dec!(5),
            tokens_in: IndexMap::new(),
        };
        let exit = PoolAction::Exit {
            pool_amount_in: dec!(2),
            tokens_out: IndexMap::new(),
        };

        let summary = ActionSummary::from_records(&[
            record(0, 1000, 0, join.clone()),
            record(1, 1090, 90, join),
            record(2, 1050, -40, exit),
        ]);

        assert_eq!(summary.total_transactions, 3);
        assert_eq!(summary.total_transfers, 3);
        assert_eq!(summary.count(ActionKind::JoinSwap), 2);
        assert_eq!(summary.count(ActionKind::Exit), 1);
        assert_eq!(summary.shares_minted, dec!(10));
        assert_eq!(summary.shares_burned, dec!(2));
        assert_eq!(summary.negative_timesteps, 1);
        assert_eq!(summary.span_seconds(), 50);
        assert!(summary.report().contains("join_swap:         2"));
    }
}
