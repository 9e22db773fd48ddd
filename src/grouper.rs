//! Event Grouper
//!
//! Folds per-row token transfers into one `GroupedTransaction` per tx hash.
//! Rows must be fed strictly in input order: the first transfer of each
//! token within a transaction is the one the classifier inspects.

use crate::error::ClassifyError;
use crate::types::{GroupedTransaction, TokenTransfer, TransferRow};
use indexmap::map::Entry;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

/// Accumulates rows into transactions, keyed by tx hash in first-seen order
#[derive(Debug, Default)]
pub struct TransactionGrouper {
    transactions: IndexMap<String, GroupedTransaction>,
    rows_seen: usize,
}

impl TransactionGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one row. Returns `true` if the row opened a new transaction.
    pub fn push_row(&mut self, row: TransferRow) -> Result<bool, ClassifyError> {
        let value = parse_amount(&row.tx_hash, &row.value)?;
        let transfer = TokenTransfer::new(row.from, row.to, value);

        let (tx, created) = self.insert_if_absent(&row.tx_hash, &row.unix_timestamp, &row.datetime)?;
        tx.push_transfer(&row.token_symbol, transfer);
        self.rows_seen += 1;

        if created {
            debug!("New transaction {} at {}", row.tx_hash, row.unix_timestamp);
        }
        Ok(created)
    }

    /// Look up the transaction for `tx_hash`, creating it from the row's
    /// timestamp fields when absent. The flag reports whether it was created.
    fn insert_if_absent(
        &mut self,
        tx_hash: &str,
        unix_timestamp: &str,
        datetime: &str,
    ) -> Result<(&mut GroupedTransaction, bool), ClassifyError> {
        match self.transactions.entry(tx_hash.to_string()) {
            Entry::Occupied(entry) => Ok((entry.into_mut(), false)),
            Entry::Vacant(entry) => {
                let ts = parse_timestamp(tx_hash, unix_timestamp)?;
                let tx = GroupedTransaction::new(tx_hash, ts, datetime.trim());
                Ok((entry.insert(tx), true))
            }
        }
    }

    /// Number of distinct transactions seen so far
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }

    /// Transactions in the order their hashes were first observed
    pub fn finish(self) -> Vec<GroupedTransaction> {
        self.transactions.into_values().collect()
    }
}

/// Group an in-memory row sequence
pub fn group_transfers<I>(rows: I) -> Result<Vec<GroupedTransaction>, ClassifyError>
where
    I: IntoIterator<Item = TransferRow>,
{
    let mut grouper = TransactionGrouper::new();
    for row in rows {
        grouper.push_row(row)?;
    }
    Ok(grouper.finish())
}

/// Parse an exported amount such as `"1,234.5"`. Rejects anything that is
/// not a plain non-negative decimal once thousands separators are removed.
pub fn parse_amount(tx_hash: &str, raw: &str) -> Result<Decimal, ClassifyError> {
    let cleaned = raw.trim().replace(',', "");
    let value = Decimal::from_str(&cleaned).map_err(|source| ClassifyError::InvalidAmount {
        tx_hash: tx_hash.to_string(),
        value: raw.to_string(),
        source,
    })?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(ClassifyError::NegativeAmount {
            tx_hash: tx_hash.to_string(),
            value: raw.to_string(),
        });
    }
    Ok(value)
}

fn parse_timestamp(tx_hash: &str, raw: &str) -> Result<i64, ClassifyError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ClassifyError::InvalidTimestamp {
            tx_hash: tx_hash.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ZERO_ADDRESS;
    use rust_decimal_macros::dec;

    fn row(tx: &str, ts: &str, symbol: &str, from: &str, to: &str, value: &str) -> TransferRow {
        TransferRow {
            tx_hash: tx.to_string(),
            unix_timestamp: ts.to_string(),
            datetime: "2021-03-01 12:00:00".to_string(),
            token_symbol: symbol.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_parse_amount_strips_thousands_separators() {
        assert_eq!(parse_amount("0x1", "1,234,567.89").unwrap(), dec!(1234567.89));
        assert_eq!(parse_amount("0x1", " 42 ").unwrap(), dec!(42));
        assert_eq!(parse_amount("0x1", "0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(
            parse_amount("0x1", "12abc"),
            Err(ClassifyError::InvalidAmount { .. })
        ));
        assert!(matches!(
            parse_amount("0x1", ""),
            Err(ClassifyError::InvalidAmount { .. })
        ));
        assert!(matches!(
            parse_amount("0x1", "-5"),
            Err(ClassifyError::NegativeAmount { .. })
        ));
    }

    #[test]
    fn test_groups_by_hash_in_first_seen_order() {
        let rows = vec![
            row("0xB", "1000", "DAI", "user1", "pool", "50"),
            row("0xA", "1010", "USDC", "user2", "pool", "100"),
            row("0xB", "1000", "USDT", "pool", "user1", "49"),
            row("0xA", "1010", "BPT", "pool", "user2", "5"),
        ];

        let grouped = group_transfers(rows).unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].tx_hash, "0xB");
        assert_eq!(grouped[1].tx_hash, "0xA");

        let symbols: Vec<_> = grouped[0].transfers_by_token.keys().cloned().collect();
        assert_eq!(symbols, vec!["DAI", "USDT"]);
        assert_eq!(grouped[1].unix_timestamp, 1010);
    }

    #[test]
    fn test_same_token_transfers_kept_in_arrival_order() {
        let rows = vec![
            row("0xA", "1000", "BPT", "user1", "pool", "5"),
            row("0xA", "1000", "BPT", "pool", ZERO_ADDRESS, "5"),
        ];

        let grouped = group_transfers(rows).unwrap();
        let bpt = grouped[0].share_transfers();
        assert_eq!(bpt.len(), 2);
        assert_eq!(bpt[0].from, "user1");
        assert_eq!(bpt[1].from, "pool");
    }

    #[test]
    fn test_push_row_reports_new_transactions() {
        let mut grouper = TransactionGrouper::new();
        assert!(grouper.push_row(row("0xA", "1", "DAI", "a", "b", "1")).unwrap());
        assert!(!grouper.push_row(row("0xA", "1", "DAI", "a", "b", "2")).unwrap());
        assert!(grouper.push_row(row("0xB", "2", "DAI", "a", "b", "3")).unwrap());
        assert_eq!(grouper.len(), 2);
        assert_eq!(grouper.rows_seen(), 3);
    }

    #[test]
    fn test_malformed_row_fails_the_whole_run() {
        let rows = vec![
            row("0xA", "1000", "DAI", "user1", "pool", "50"),
            row("0xA", "1000", "USDT", "pool", "user1", "n/a"),
        ];
        let err = group_transfers(rows).unwrap_err();
        assert!(err.to_string().contains("n/a"));

        let rows = vec![row("0xA", "yesterday", "DAI", "user1", "pool", "50")];
        assert!(matches!(
            group_transfers(rows),
            Err(ClassifyError::InvalidTimestamp { .. })
        ));
    }
}
