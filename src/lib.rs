//! Pool Action Classifier Library
//!
//! Turns an exported ledger of token transfers for one liquidity pool into
//! pool actions (swap, join, join_swap, exit, exit_swap) with per-action
//! amounts, sequence indices and inter-transaction timesteps.
//!
//! Created: 2026-10-18

pub mod classifier;
pub mod config;
pub mod error;
pub mod grouper;
pub mod pipeline;
pub mod reader;
pub mod summary;
pub mod timestep;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use classifier::ActionClassifier;
pub use config::{ConfigOverrides, ConverterConfig, FileConfig};
pub use error::{ClassifyError, ConfigError};
pub use grouper::{group_transfers, TransactionGrouper};
pub use pipeline::{convert_file, process_grouped, process_rows, reclassify};
pub use summary::ActionSummary;
pub use timestep::{annotate_timesteps, TimestepAnnotator};
pub use types::{
    ActionKind, ClassifiedTransaction, GroupedTransaction, PoolAction, TokenTransfer,
    TransactionRecord, TransferRow, SHARE_TOKEN, ZERO_ADDRESS,
};
