//! Core types for pool action classification
//!
//! Three stages, each owning its output:
//! - `GroupedTransaction`: transfers folded per tx hash (grouper)
//! - `ClassifiedTransaction`: + sequence index and action (classifier)
//! - `TransactionRecord`: + timestep, serialized to the output document
//!
//! Created: 2026-10-18

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbol of the pool-share (liability) token minted on join, burned on exit
pub const SHARE_TOKEN: &str = "BPT";

/// Recipient of burned share tokens
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Token symbol -> transfers of that token, in arrival order
pub type TransfersByToken = IndexMap<String, Vec<TokenTransfer>>;

/// Case-insensitive address comparison (hex addresses from exports vary in case)
pub fn same_address(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

// ── Raw input ───────────────────────────────────────────────────────────

/// One row of the exported token-transfer CSV
///
/// Amounts and timestamps stay as text here; the grouper parses them
/// so a malformed value can be reported against its transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferRow {
    #[serde(rename = "Txhash")]
    pub tx_hash: String,
    #[serde(rename = "UnixTimestamp")]
    pub unix_timestamp: String,
    #[serde(rename = "DateTime", alias = "DateTime (UTC)")]
    pub datetime: String,
    #[serde(rename = "TokenSymbol")]
    pub token_symbol: String,
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To")]
    pub to: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// A single movement of a fungible token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub from: String,
    pub to: String,
    pub value: Decimal,
}

impl TokenTransfer {
    pub fn new(from: impl Into<String>, to: impl Into<String>, value: Decimal) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            value,
        }
    }

    pub fn is_from(&self, address: &str) -> bool {
        same_address(&self.from, address)
    }

    pub fn is_to(&self, address: &str) -> bool {
        same_address(&self.to, address)
    }
}

// ── Stage 1: grouped ────────────────────────────────────────────────────

/// All transfers observed for one transaction hash
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedTransaction {
    pub tx_hash: String,
    pub unix_timestamp: i64,
    /// Display string from the export, informational only
    pub datetime: String,
    pub transfers_by_token: TransfersByToken,
}

impl GroupedTransaction {
    pub fn new(tx_hash: impl Into<String>, unix_timestamp: i64, datetime: impl Into<String>) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            unix_timestamp,
            datetime: datetime.into(),
            transfers_by_token: IndexMap::new(),
        }
    }

    /// Append a transfer under `symbol`, creating the list on first sight
    pub fn push_transfer(&mut self, symbol: &str, transfer: TokenTransfer) {
        self.transfers_by_token
            .entry(symbol.to_string())
            .or_default()
            .push(transfer);
    }

    /// Builder-style variant of `push_transfer`
    pub fn with_transfer(mut self, symbol: &str, transfer: TokenTransfer) -> Self {
        self.push_transfer(symbol, transfer);
        self
    }

    pub fn has_share_token(&self) -> bool {
        self.transfers_by_token.contains_key(SHARE_TOKEN)
    }

    /// Share-token transfers in arrival order (empty if none)
    pub fn share_transfers(&self) -> &[TokenTransfer] {
        self.transfers_by_token
            .get(SHARE_TOKEN)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First transfer of every non-share token, in first-seen symbol order.
    /// Later transfers of the same token are never consulted.
    pub fn underlying_first_transfers(&self) -> impl Iterator<Item = (&str, &TokenTransfer)> {
        self.transfers_by_token
            .iter()
            .filter(|(symbol, _)| symbol.as_str() != SHARE_TOKEN)
            .filter_map(|(symbol, transfers)| transfers.first().map(|t| (symbol.as_str(), t)))
    }

    /// Number of distinct token symbols other than the share token
    pub fn underlying_token_count(&self) -> usize {
        self.transfers_by_token
            .keys()
            .filter(|symbol| symbol.as_str() != SHARE_TOKEN)
            .count()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers_by_token.values().map(Vec::len).sum()
    }
}

// ── Pool actions ────────────────────────────────────────────────────────

/// Economic action a transaction performed against the pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PoolAction {
    /// One underlying token in, another out, no share movement
    Swap {
        token_in: String,
        token_amount_in: Decimal,
        token_out: String,
        token_amount_out: Decimal,
    },
    /// Shares minted against two or more underlying tokens
    Join {
        pool_amount_out: Decimal,
        tokens_in: IndexMap<String, Decimal>,
    },
    /// Shares minted against a single underlying token
    JoinSwap {
        pool_amount_out: Decimal,
        tokens_in: IndexMap<String, Decimal>,
    },
    /// Shares burned for two or more underlying tokens
    Exit {
        pool_amount_in: Decimal,
        tokens_out: IndexMap<String, Decimal>,
    },
    /// Shares burned for a single underlying token
    ExitSwap {
        pool_amount_in: Decimal,
        tokens_out: IndexMap<String, Decimal>,
    },
}

/// Fieldless discriminant of `PoolAction`, for counting and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Swap,
    Join,
    JoinSwap,
    Exit,
    ExitSwap,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Swap => write!(f, "swap"),
            ActionKind::Join => write!(f, "join"),
            ActionKind::JoinSwap => write!(f, "join_swap"),
            ActionKind::Exit => write!(f, "exit"),
            ActionKind::ExitSwap => write!(f, "exit_swap"),
        }
    }
}

impl PoolAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            PoolAction::Swap { .. } => ActionKind::Swap,
            PoolAction::Join { .. } => ActionKind::Join,
            PoolAction::JoinSwap { .. } => ActionKind::JoinSwap,
            PoolAction::Exit { .. } => ActionKind::Exit,
            PoolAction::ExitSwap { .. } => ActionKind::ExitSwap,
        }
    }

    /// Share tokens minted (join family)
    pub fn shares_minted(&self) -> Option<Decimal> {
        match self {
            PoolAction::Join { pool_amount_out, .. } | PoolAction::JoinSwap { pool_amount_out, .. } => {
                Some(*pool_amount_out)
            }
            _ => None,
        }
    }

    /// Share tokens burned (exit family)
    pub fn shares_burned(&self) -> Option<Decimal> {
        match self {
            PoolAction::Exit { pool_amount_in, .. } | PoolAction::ExitSwap { pool_amount_in, .. } => {
                Some(*pool_amount_in)
            }
            _ => None,
        }
    }

    /// Underlying token amounts moved into (join) or out of (exit) the pool
    pub fn underlying_amounts(&self) -> Option<&IndexMap<String, Decimal>> {
        match self {
            PoolAction::Join { tokens_in, .. } | PoolAction::JoinSwap { tokens_in, .. } => Some(tokens_in),
            PoolAction::Exit { tokens_out, .. } | PoolAction::ExitSwap { tokens_out, .. } => Some(tokens_out),
            PoolAction::Swap { .. } => None,
        }
    }
}

// ── Stage 2: classified ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTransaction {
    pub transaction: GroupedTransaction,
    /// 0-based position in first-seen order of tx hashes
    pub sequence_index: usize,
    pub action: PoolAction,
}

// ── Stage 3: fully annotated ────────────────────────────────────────────

/// Terminal record, one per transaction in the output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub tx_hash: String,
    #[serde(rename = "unixtimestamp")]
    pub unix_timestamp: i64,
    pub datetime: String,
    #[serde(rename = "tokens")]
    pub transfers_by_token: TransfersByToken,
    #[serde(rename = "index")]
    pub sequence_index: usize,
    pub action: PoolAction,
    /// Seconds since the previous record; 0 for the first, negative if time went backwards
    pub timestep: i64,
}

impl TransactionRecord {
    pub fn from_classified(classified: ClassifiedTransaction, timestep: i64) -> Self {
        let ClassifiedTransaction {
            transaction,
            sequence_index,
            action,
        } = classified;

        Self {
            tx_hash: transaction.tx_hash,
            unix_timestamp: transaction.unix_timestamp,
            datetime: transaction.datetime,
            transfers_by_token: transaction.transfers_by_token,
            sequence_index,
            action,
            timestep,
        }
    }

    /// Strip annotations back to the grouped form (for reclassification)
    pub fn to_grouped(&self) -> GroupedTransaction {
        GroupedTransaction {
            tx_hash: self.tx_hash.clone(),
            unix_timestamp: self.unix_timestamp,
            datetime: self.datetime.clone(),
            transfers_by_token: self.transfers_by_token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_underlying_tokens_exclude_share_token() {
        let tx = GroupedTransaction::new("0xa", 1000, "2021-01-01 00:00:00")
            .with_transfer("USDC", TokenTransfer::new("user1", "pool", dec!(100)))
            .with_transfer(SHARE_TOKEN, TokenTransfer::new("pool", "user1", dec!(5)))
            .with_transfer("USDC", TokenTransfer::new("user1", "pool", dec!(7)));

        assert_eq!(tx.underlying_token_count(), 1);
        assert_eq!(tx.transfer_count(), 3);
        assert!(tx.has_share_token());

        let firsts: Vec<_> = tx.underlying_first_transfers().collect();
        assert_eq!(firsts.len(), 1);
        assert_eq!(firsts[0].0, "USDC");
        assert_eq!(firsts[0].1.value, dec!(100));
    }

    #[test]
    fn test_address_match_ignores_case() {
        let t = TokenTransfer::new("0xABCdef", "0x00", dec!(1));
        assert!(t.is_from("0xabcdef"));
        assert!(!t.is_to("0xabcdef"));
    }

    #[test]
    fn test_action_serializes_with_type_tag() {
        let mut tokens_in = IndexMap::new();
        tokens_in.insert("USDC".to_string(), dec!(100));
        let action = PoolAction::JoinSwap {
            pool_amount_out: dec!(5),
            tokens_in,
        };

        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "join_swap");
        assert_eq!(json["pool_amount_out"].as_f64(), Some(5.0));
        assert_eq!(json["tokens_in"]["USDC"].as_f64(), Some(100.0));
        assert_eq!(action.kind().to_string(), "join_swap");
        assert_eq!(action.shares_minted(), Some(dec!(5)));
        assert_eq!(action.shares_burned(), None);
    }
}
