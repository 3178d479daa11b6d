//! Error types for the chaindriller system

use alloy::primitives::{Address, TxHash, U256};
use thiserror::Error;

/// Main error type for the drill engine
#[derive(Error, Debug)]
pub enum DrillError {
    /// The sender cannot pay for anything, preparation never starts
    #[error("Not enough balance in account address: {address} (balance: {balance} wei)")]
    InsufficientFunds { address: Address, balance: U256 },

    /// A balance, nonce, gas price or gas estimate query failed
    #[error("Chain query failed during {operation}: {source}")]
    QueryFailure {
        operation: &'static str,
        #[source]
        source: ChainClientError,
    },

    /// Signing one transaction of the batch failed
    #[error("Signing failed at tx {index} of total {total}: {message}")]
    SigningFailure {
        index: usize,
        total: usize,
        message: String,
    },

    /// Submission of a single transaction failed
    #[error("Sending tx {tx_hash} (nonce {nonce}) failed: {source}")]
    SendFailure {
        tx_hash: TxHash,
        nonce: u64,
        #[source]
        source: ChainClientError,
    },

    /// The dispatch pipeline itself could not complete
    #[error("Dispatch pipeline error: {0}")]
    Dispatch(String),
}

impl DrillError {
    /// Wrap a collaborator error raised by one of the preparation queries
    pub fn query(operation: &'static str, source: ChainClientError) -> Self {
        DrillError::QueryFailure { operation, source }
    }

    /// Whether this error belongs to a single send attempt rather than the run
    pub fn is_send_failure(&self) -> bool {
        matches!(self, DrillError::SendFailure { .. })
    }
}

/// Result type alias for drill operations
pub type Result<T> = std::result::Result<T, DrillError>;

/// Errors raised by the chain client collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainClientError {
    /// The JSON-RPC call failed at the transport or node level
    #[error("RPC call {method} failed: {message}")]
    Rpc { method: String, message: String },

    /// The node answered with something that could not be interpreted
    #[error("Invalid response to {method}: {message}")]
    InvalidResponse { method: String, message: String },

    /// The node did not answer in time
    #[error("RPC call {method} timed out after {timeout_seconds}s")]
    Timeout { method: String, timeout_seconds: u64 },

    /// The configured endpoint is not a usable URL
    #[error("Invalid node endpoint: {endpoint}")]
    InvalidEndpoint { endpoint: String },
}

impl ChainClientError {
    /// Build an RPC error from any displayable transport error
    pub fn rpc(method: &str, err: impl std::fmt::Display) -> Self {
        ChainClientError::Rpc {
            method: method.to_string(),
            message: err.to_string(),
        }
    }
}

/// Configuration specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Validation error
    #[error("Configuration validation error: {field}: {message}")]
    ValidationError { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// Invalid value
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}
