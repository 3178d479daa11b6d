//! Transaction preparation
//!
//! Builds one batch of signed transfers from a single sender to a single
//! recipient. The node is queried once for balance, nonce, gas price and gas
//! estimate; every transaction of the batch reuses those values.

use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, ChainId, U256};
use chain_client::{ChainClient, GasEstimateRequest};
use rand::RngCore;
use tracing::{debug, info};
use types::utils::format_wei;
use types::{ChainClientError, DrillError, Result, SignedTransfer, TransferParams, TxSignature};

/// Factor applied to the single gas estimate to obtain the batch gas limit
pub const DEFAULT_GAS_LIMIT_MULTIPLIER: u64 = 10;

/// Value carried by each transfer, kept tiny so the balance lasts
pub const DEFAULT_TRANSFER_VALUE_WEI: u64 = 1;

/// Length of the random payload used for the representative gas estimate
const ESTIMATE_PAYLOAD_LEN: usize = 16;

/// Shape of the transfers produced by one preparation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareSettings {
    /// Value of every transfer in wei
    pub transfer_value: U256,
    /// Multiplier applied to the gas estimate
    pub gas_limit_multiplier: u64,
}

impl Default for PrepareSettings {
    fn default() -> Self {
        Self {
            transfer_value: U256::from(DEFAULT_TRANSFER_VALUE_WEI),
            gas_limit_multiplier: DEFAULT_GAS_LIMIT_MULTIPLIER,
        }
    }
}

/// Prepare `count` signed transfers from the signer's account to `recipient`.
///
/// The pending nonce is read once and the batch uses `nonce..nonce + count`.
/// The caller must be the only writer of the sender account while the batch
/// is prepared and sent: any transaction sent from the same account by
/// another process shifts the node's nonce and invalidates the batch.
///
/// Any failing query or signature aborts the call and nothing is returned.
pub async fn prepare_transfers<C, S>(
    client: &C,
    signer: &S,
    recipient: Address,
    chain_id: ChainId,
    settings: &PrepareSettings,
    count: usize,
) -> Result<Vec<SignedTransfer>>
where
    C: ChainClient + ?Sized,
    S: TxSignerSync<TxSignature> + ?Sized,
{
    let from = signer.address();

    let balance = client
        .pending_balance(from)
        .await
        .map_err(|e| DrillError::query("pending balance", e))?;

    if balance == U256::ZERO {
        return Err(DrillError::InsufficientFunds {
            address: from,
            balance,
        });
    }

    info!(address = %from, balance = %format_wei(balance), "Balance of account");

    let start_nonce = client
        .pending_nonce(from)
        .await
        .map_err(|e| DrillError::query("pending nonce", e))?;

    if u64::try_from(count)
        .ok()
        .and_then(|n| start_nonce.checked_add(n))
        .is_none()
    {
        return Err(DrillError::query(
            "pending nonce",
            ChainClientError::InvalidResponse {
                method: "eth_getTransactionCount".to_string(),
                message: format!("nonce {} leaves no room for {} transactions", start_nonce, count),
            },
        ));
    }

    let gas_price = client
        .suggested_gas_price()
        .await
        .map_err(|e| DrillError::query("gas price", e))?;

    let gas_limit = estimate_gas_limit(client, from, recipient, gas_price, settings).await?;

    info!(
        count,
        start_nonce,
        gas_price,
        gas_limit,
        chain_id,
        "Preparing transactions"
    );

    let mut transactions = Vec::with_capacity(count);
    for index in 0..count {
        let params = TransferParams {
            chain_id,
            nonce: start_nonce + index as u64, // range checked above
            to: recipient,
            value: settings.transfer_value,
            gas_limit,
            gas_price,
            input: Bytes::new(),
        };

        let mut tx = params.to_legacy_tx();
        let signature = signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| DrillError::SigningFailure {
                index,
                total: count,
                message: e.to_string(),
            })?;

        if index % 10 == 0 {
            debug!(index, nonce = params.nonce, "Signed new tx");
        }

        transactions.push(SignedTransfer::from_parts(tx, signature));
    }

    Ok(transactions)
}

/// Estimate once with a representative transfer and scale by the multiplier
async fn estimate_gas_limit<C>(
    client: &C,
    from: Address,
    to: Address,
    gas_price: u128,
    settings: &PrepareSettings,
) -> Result<u64>
where
    C: ChainClient + ?Sized,
{
    let mut payload = [0u8; ESTIMATE_PAYLOAD_LEN];
    rand::thread_rng().fill_bytes(&mut payload);

    let estimate = client
        .estimate_gas(&GasEstimateRequest {
            from,
            to,
            value: settings.transfer_value,
            input: Bytes::copy_from_slice(&payload),
            gas_price: Some(gas_price),
        })
        .await
        .map_err(|e| DrillError::query("gas estimate", e))?;

    Ok(estimate.saturating_mul(settings.gas_limit_multiplier))
}
