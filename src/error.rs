//! Typed errors for grouping, classification and configuration
//!
//! Binaries and I/O layers wrap these in `anyhow` with file context.

use thiserror::Error;

/// Failures while turning transfer rows into annotated pool actions
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Invalid amount '{value}' in transaction {tx_hash}: {source}")]
    InvalidAmount {
        tx_hash: String,
        value: String,
        #[source]
        source: rust_decimal::Error,
    },
    #[error("Negative amount '{value}' in transaction {tx_hash}")]
    NegativeAmount { tx_hash: String, value: String },
    #[error("Invalid unix timestamp '{value}' in transaction {tx_hash}")]
    InvalidTimestamp { tx_hash: String, value: String },
    #[error("Timestamp {unix_timestamp} of transaction {tx_hash} is out of range")]
    TimestampOutOfRange { tx_hash: String, unix_timestamp: i64 },
    #[error("Transaction {tx_hash} moves no tokens other than BPT")]
    NoUnderlyingTokens { tx_hash: String },
    #[error("Swap {tx_hash} is ambiguous: {reason}")]
    AmbiguousSwap { tx_hash: String, reason: String },
    #[error("Transaction {tx_hash} moves BPT but the pool neither mints nor burns it")]
    UnresolvedShareMovement { tx_hash: String },
}

/// Fatal configuration problems, raised before any input is read
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("pool address not provided (use --pool-address, POOL_ADDRESS or [converter].pool_address)")]
    MissingPoolAddress,
    #[error("input file not provided")]
    MissingInput,
    #[error("output file not provided")]
    MissingOutput,
}
