//! The drill engine: one sender, one recipient, one prepared batch

use crate::dispatcher::dispatch;
use crate::preparer::{prepare_transfers, PrepareSettings};
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, ChainId};
use chain_client::ChainClient;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use types::{FinalReport, Result, SignedTransfer, TxSignature};

/// Load generator bound to a node, a signing key and a recipient.
///
/// [`Driller::prepare`] fills the batch, [`Driller::send`] pushes it. The
/// batch is kept between calls so it can be sent more than once, although a
/// second send of the same batch will be rejected by the node for reused
/// nonces.
pub struct Driller<C: ?Sized, S> {
    client: Arc<C>,
    signer: S,
    recipient: Address,
    chain_id: ChainId,
    settings: PrepareSettings,
    transactions: Vec<SignedTransfer>,
}

impl<C, S> Driller<C, S>
where
    C: ChainClient + ?Sized + 'static,
    S: TxSignerSync<TxSignature>,
{
    pub fn new(client: Arc<C>, signer: S, recipient: Address, chain_id: ChainId) -> Self {
        Self {
            client,
            signer,
            recipient,
            chain_id,
            settings: PrepareSettings::default(),
            transactions: Vec::new(),
        }
    }

    pub fn with_settings(mut self, settings: PrepareSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Address the batch is sent from
    pub fn sender(&self) -> Address {
        self.signer.address()
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    /// The currently prepared batch
    pub fn transactions(&self) -> &[SignedTransfer] {
        &self.transactions
    }

    /// Build and sign `count` transfers, replacing any previous batch.
    ///
    /// Nonces are taken from the node's pending nonce at call time, so the
    /// sender account must not be used by anyone else until the batch has
    /// been sent. On error the previous batch is left untouched.
    pub async fn prepare(&mut self, count: usize) -> Result<&[SignedTransfer]> {
        let transactions = prepare_transfers(
            self.client.as_ref(),
            &self.signer,
            self.recipient,
            self.chain_id,
            &self.settings,
            count,
        )
        .await?;

        info!(
            count = transactions.len(),
            sender = %self.sender(),
            recipient = %self.recipient,
            "Prepared transactions"
        );

        self.transactions = transactions;
        Ok(&self.transactions)
    }

    /// Send the prepared batch with at most `concurrency_limit` sends in
    /// flight. A limit of 0, or one above the batch size, sends everything
    /// at once.
    pub async fn send(
        &self,
        concurrency_limit: usize,
        cancel: CancellationToken,
    ) -> Result<FinalReport> {
        dispatch(
            self.client.clone(),
            self.transactions.clone(),
            concurrency_limit,
            cancel,
        )
        .await
    }
}

impl<C: ?Sized, S> std::fmt::Debug for Driller<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driller")
            .field("recipient", &self.recipient)
            .field("chain_id", &self.chain_id)
            .field("settings", &self.settings)
            .field("transactions", &self.transactions.len())
            .finish_non_exhaustive()
    }
}
