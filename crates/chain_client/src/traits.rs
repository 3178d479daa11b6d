//! Chain client capability used by the drill engine

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use types::{ChainClientError, SignedTransfer};

/// Result type for chain client calls
pub type ClientResult<T> = std::result::Result<T, ChainClientError>;

/// Message used to estimate the gas of a representative transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasEstimateRequest {
    /// Sender address
    pub from: Address,
    /// Recipient address
    pub to: Address,
    /// Transferred value in wei
    pub value: U256,
    /// Opaque payload
    pub input: Bytes,
    /// Gas price the estimate is made against
    pub gas_price: Option<u128>,
}

/// Node operations the drill engine depends on.
///
/// Implementations must be safe to call from many dispatch workers at once.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Balance of `address` at the pending block
    async fn pending_balance(&self, address: Address) -> ClientResult<U256>;

    /// Nonce of `address` at the pending block
    async fn pending_nonce(&self, address: Address) -> ClientResult<u64>;

    /// Gas price currently suggested by the node
    async fn suggested_gas_price(&self) -> ClientResult<u128>;

    /// Gas units the node expects the request to consume
    async fn estimate_gas(&self, request: &GasEstimateRequest) -> ClientResult<u64>;

    /// Submit a signed transaction. Only submission-layer errors are reported,
    /// inclusion is never awaited.
    async fn submit_transaction(&self, tx: &SignedTransfer) -> ClientResult<()>;
}
