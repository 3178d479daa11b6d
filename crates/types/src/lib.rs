//! Shared types for the chaindriller system
//!
//! This crate contains the domain types shared by the drill engine, the chain
//! client and the command line binary.

pub mod error;
pub mod report;
pub mod secret;
pub mod transfer;
pub mod utils;

// Re-export commonly used types
pub use error::{ChainClientError, ConfigError, DrillError, Result};
pub use report::{DispatchResult, FinalReport, ReportSummary};
pub use secret::SecretString;
pub use transfer::{SignedTransfer, TransferParams, TxSignature};
