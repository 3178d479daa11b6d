//! Value transfer transactions produced by the preparer

use alloy::consensus::{Signed, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, ChainId, TxHash, TxKind, U256};

/// Signature produced by alloy 0.4 transaction signers.
///
/// `PrivateKeySigner` only implements `TxSignerSync` for this type, and
/// `TxEnvelope::Legacy` only holds it, so it cannot be swapped for
/// `PrimitiveSignature` until the signer stack moves on.
#[allow(deprecated)]
pub type TxSignature = alloy::primitives::Signature;

/// Unsigned shape shared by every transfer of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferParams {
    /// Chain the signature is bound to (EIP-155)
    pub chain_id: ChainId,
    /// Account nonce
    pub nonce: u64,
    /// Recipient of the value
    pub to: Address,
    /// Value in wei
    pub value: U256,
    /// Gas limit
    pub gas_limit: u64,
    /// Gas price in wei
    pub gas_price: u128,
    /// Opaque payload, empty for plain transfers
    pub input: Bytes,
}

impl TransferParams {
    /// Build the legacy transaction that gets signed
    pub fn to_legacy_tx(&self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: TxKind::Call(self.to),
            value: self.value,
            input: self.input.clone(),
        }
    }
}

/// An immutable signed transfer.
///
/// The hash is fixed at signing time, so it is known whether or not the
/// transaction ever reaches the node.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransfer {
    signed: Signed<TxLegacy>,
}

impl SignedTransfer {
    /// Wrap an already signed legacy transaction
    pub fn new(signed: Signed<TxLegacy>) -> Self {
        Self { signed }
    }

    /// Assemble a signed transfer from its unsigned body and signature
    pub fn from_parts(tx: TxLegacy, signature: TxSignature) -> Self {
        use alloy::consensus::SignableTransaction;
        Self::new(tx.into_signed(signature))
    }

    pub fn nonce(&self) -> u64 {
        self.signed.tx().nonce
    }

    /// Recipient address, `None` only for contract creation which the
    /// preparer never produces
    pub fn to(&self) -> Option<Address> {
        match self.signed.tx().to {
            TxKind::Call(to) => Some(to),
            TxKind::Create => None,
        }
    }

    pub fn value(&self) -> U256 {
        self.signed.tx().value
    }

    pub fn gas_limit(&self) -> u64 {
        self.signed.tx().gas_limit
    }

    pub fn gas_price(&self) -> u128 {
        self.signed.tx().gas_price
    }

    pub fn input(&self) -> &Bytes {
        &self.signed.tx().input
    }

    pub fn chain_id(&self) -> Option<ChainId> {
        self.signed.tx().chain_id
    }

    /// Transaction hash
    pub fn hash(&self) -> TxHash {
        *self.signed.hash()
    }

    /// EIP-2718 encoding as accepted by `eth_sendRawTransaction`
    pub fn encoded_2718(&self) -> Vec<u8> {
        let envelope: TxEnvelope = self.signed.clone().into();
        envelope.encoded_2718()
    }

    /// Raw transaction as 0x-prefixed hex
    pub fn raw_hex(&self) -> String {
        format!("0x{}", alloy::primitives::hex::encode(self.encoded_2718()))
    }
}
