//! Action Classifier
//!
//! Decides what each grouped transaction did to the pool:
//! - no BPT movement                   -> swap
//! - BPT sent by the pool to a holder  -> join / join_swap
//! - BPT sent by the pool to 0x0       -> exit / exit_swap
//!
//! `_swap` variants are single-asset (exactly one non-BPT token). Only the
//! first transfer of each token is inspected.
//!
//! Created: 2026-10-18

use crate::error::ClassifyError;
use crate::types::{
    ClassifiedTransaction, GroupedTransaction, PoolAction, TokenTransfer, ZERO_ADDRESS,
};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Direction of share-token movement in a join/exit transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShareMovement {
    /// Pool sent freshly minted shares to a holder
    Minted(Decimal),
    /// Shares ended up at the zero address
    Burned(Decimal),
}

/// Classifies transactions against a single pool contract
#[derive(Debug, Clone)]
pub struct ActionClassifier {
    /// Lower-cased pool contract address
    pool_address: String,
}

impl ActionClassifier {
    pub fn new(pool_address: &str) -> Self {
        Self {
            pool_address: pool_address.trim().to_lowercase(),
        }
    }

    pub fn pool_address(&self) -> &str {
        &self.pool_address
    }

    /// Classify every transaction, assigning sequence indices in input order
    pub fn classify_all(
        &self,
        transactions: Vec<GroupedTransaction>,
    ) -> Result<Vec<ClassifiedTransaction>, ClassifyError> {
        transactions
            .into_iter()
            .enumerate()
            .map(|(sequence_index, transaction)| {
                let action = self.classify(&transaction)?;
                Ok(ClassifiedTransaction {
                    transaction,
                    sequence_index,
                    action,
                })
            })
            .collect()
    }

    /// Determine the single action a transaction performed
    pub fn classify(&self, tx: &GroupedTransaction) -> Result<PoolAction, ClassifyError> {
        let underlying = tx.underlying_token_count();
        if underlying == 0 {
            return Err(ClassifyError::NoUnderlyingTokens {
                tx_hash: tx.tx_hash.clone(),
            });
        }

        if !tx.has_share_token() {
            return self.classify_swap(tx);
        }

        let single_asset = underlying == 1;
        let action = match self.share_movement(tx)? {
            ShareMovement::Minted(pool_amount_out) => {
                let tokens_in = self.collect_underlying(tx, |t| t.is_to(&self.pool_address));
                if single_asset {
                    PoolAction::JoinSwap { pool_amount_out, tokens_in }
                } else {
                    PoolAction::Join { pool_amount_out, tokens_in }
                }
            }
            ShareMovement::Burned(pool_amount_in) => {
                let tokens_out = self.collect_underlying(tx, |t| t.is_from(&self.pool_address));
                if single_asset {
                    PoolAction::ExitSwap { pool_amount_in, tokens_out }
                } else {
                    PoolAction::Exit { pool_amount_in, tokens_out }
                }
            }
        };

        debug!("{} classified as {}", tx.tx_hash, action.kind());
        Ok(action)
    }

    /// First share transfer sent by the pool decides the family; later ones
    /// are ignored. Without one, a transfer into the zero address counts as
    /// a holder-side burn.
    fn share_movement(&self, tx: &GroupedTransaction) -> Result<ShareMovement, ClassifyError> {
        let shares = tx.share_transfers();

        if let Some(t) = shares.iter().find(|t| t.is_from(&self.pool_address)) {
            return Ok(if t.is_to(ZERO_ADDRESS) {
                ShareMovement::Burned(t.value)
            } else {
                ShareMovement::Minted(t.value)
            });
        }

        if let Some(t) = shares.iter().find(|t| t.is_to(ZERO_ADDRESS)) {
            return Ok(ShareMovement::Burned(t.value));
        }

        Err(ClassifyError::UnresolvedShareMovement {
            tx_hash: tx.tx_hash.clone(),
        })
    }

    /// Non-share tokens whose first transfer passes the direction check.
    /// Tokens that fail it are left out, not reported.
    fn collect_underlying<F>(&self, tx: &GroupedTransaction, moves_with_pool: F) -> IndexMap<String, Decimal>
    where
        F: Fn(&TokenTransfer) -> bool,
    {
        let mut amounts = IndexMap::new();
        for (symbol, first) in tx.underlying_first_transfers() {
            if moves_with_pool(first) {
                amounts.insert(symbol.to_string(), first.value);
            } else {
                debug!("{}: {} skipped, first transfer does not touch the pool", tx.tx_hash, symbol);
            }
        }
        amounts
    }

    /// Swap legs: the token paid to the pool is the input, the token paid
    /// out by the pool is the output. Anything other than exactly one of
    /// each is rejected.
    fn classify_swap(&self, tx: &GroupedTransaction) -> Result<PoolAction, ClassifyError> {
        let mut legs_in: Vec<(&str, Decimal)> = Vec::new();
        let mut legs_out: Vec<(&str, Decimal)> = Vec::new();

        for (symbol, first) in tx.underlying_first_transfers() {
            if first.is_to(&self.pool_address) {
                legs_in.push((symbol, first.value));
            } else if first.is_from(&self.pool_address) {
                legs_out.push((symbol, first.value));
            }
        }

        let (token_in, token_amount_in) = single_leg(tx, "input", &legs_in)?;
        let (token_out, token_amount_out) = single_leg(tx, "output", &legs_out)?;

        Ok(PoolAction::Swap {
            token_in: token_in.to_string(),
            token_amount_in,
            token_out: token_out.to_string(),
            token_amount_out,
        })
    }
}

fn single_leg<'a>(
    tx: &GroupedTransaction,
    side: &str,
    legs: &[(&'a str, Decimal)],
) -> Result<(&'a str, Decimal), ClassifyError> {
    match legs {
        [leg] => Ok(*leg),
        [] => {
            warn!("Swap {} has no {} leg touching the pool", tx.tx_hash, side);
            Err(ClassifyError::AmbiguousSwap {
                tx_hash: tx.tx_hash.clone(),
                reason: format!("no {} leg touches the pool", side),
            })
        }
        many => {
            let symbols: Vec<&str> = many.iter().map(|(s, _)| *s).collect();
            warn!("Swap {} has {} {} legs: {:?}", tx.tx_hash, many.len(), side, symbols);
            Err(ClassifyError::AmbiguousSwap {
                tx_hash: tx.tx_hash.clone(),
                reason: format!("multiple {} legs ({})", side, symbols.join(", ")),
            })
        }
    }
}
