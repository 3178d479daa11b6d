//! In-memory chain client for engine tests

use alloy::consensus::SignableTransaction;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, TxHash, U256};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use chain_client::{ChainClient, ClientResult, GasEstimateRequest};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use types::{ChainClientError, SignedTransfer, TxSignature};

pub(crate) const DEV_PRIVATE_KEY: &str =
    "fad9c8855b740a0b7ed4c221dbad0f33a83a49cad6b3fe8d5817ac83d38b6a19";

pub(crate) fn dev_signer() -> PrivateKeySigner {
    PrivateKeySigner::from_str(DEV_PRIVATE_KEY).unwrap()
}

pub(crate) fn recipient() -> Address {
    Address::from_str("0xe86Ffce704C00556dF42e31F14CEd095390A08eF").unwrap()
}

/// Query that should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailingQuery {
    Balance,
    Nonce,
    GasPrice,
    Estimate,
}

/// Programmable node double with call counters
#[derive(Debug)]
pub(crate) struct MockChainClient {
    pub balance: U256,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_estimate: u64,
    pub failing_query: Option<FailingQuery>,
    /// Decides by submission order (0-based) whether a send fails
    pub fail_submission: Option<fn(usize) -> bool>,
    pub submit_delay: Option<Duration>,
    pub panic_on_submit: bool,

    pub balance_calls: AtomicUsize,
    pub nonce_calls: AtomicUsize,
    pub gas_price_calls: AtomicUsize,
    pub estimate_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub submitted: Mutex<Vec<TxHash>>,
    pub estimate_requests: Mutex<Vec<GasEstimateRequest>>,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self {
            balance: U256::from(10u64),
            nonce: 0,
            gas_price: 1_000_000_000,
            gas_estimate: 21_000,
            failing_query: None,
            fail_submission: None,
            submit_delay: None,
            panic_on_submit: false,
            balance_calls: AtomicUsize::new(0),
            nonce_calls: AtomicUsize::new(0),
            gas_price_calls: AtomicUsize::new(0),
            estimate_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
            estimate_requests: Mutex::new(Vec::new()),
        }
    }
}

impl MockChainClient {
    pub fn query_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
            + self.nonce_calls.load(Ordering::SeqCst)
            + self.gas_price_calls.load(Ordering::SeqCst)
            + self.estimate_calls.load(Ordering::SeqCst)
    }

    fn fail_if(&self, query: FailingQuery, method: &str) -> ClientResult<()> {
        if self.failing_query == Some(query) {
            return Err(ChainClientError::rpc(method, "connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn pending_balance(&self, _address: Address) -> ClientResult<U256> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.fail_if(FailingQuery::Balance, "eth_getBalance")?;
        Ok(self.balance)
    }

    async fn pending_nonce(&self, _address: Address) -> ClientResult<u64> {
        self.nonce_calls.fetch_add(1, Ordering::SeqCst);
        self.fail_if(FailingQuery::Nonce, "eth_getTransactionCount")?;
        Ok(self.nonce)
    }

    async fn suggested_gas_price(&self) -> ClientResult<u128> {
        self.gas_price_calls.fetch_add(1, Ordering::SeqCst);
        self.fail_if(FailingQuery::GasPrice, "eth_gasPrice")?;
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, request: &GasEstimateRequest) -> ClientResult<u64> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        self.estimate_requests.lock().unwrap().push(request.clone());
        self.fail_if(FailingQuery::Estimate, "eth_estimateGas")?;
        Ok(self.gas_estimate)
    }

    async fn submit_transaction(&self, tx: &SignedTransfer) -> ClientResult<()> {
        let order = self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_submit {
            panic!("node double exploded");
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.submitted.lock().unwrap().push(tx.hash());

        match self.fail_submission {
            Some(should_fail) if should_fail(order) => Err(ChainClientError::rpc(
                "eth_sendRawTransaction",
                "replacement transaction underpriced",
            )),
            _ => Ok(()),
        }
    }
}

/// Signer that refuses to sign the `fail_at`-th transaction
pub(crate) struct FailingSigner {
    pub inner: PrivateKeySigner,
    pub fail_at: usize,
    pub calls: AtomicUsize,
}

impl FailingSigner {
    pub fn new(fail_at: usize) -> Self {
        Self {
            inner: dev_signer(),
            fail_at,
            calls: AtomicUsize::new(0),
        }
    }
}

impl TxSignerSync<TxSignature> for FailingSigner {
    fn address(&self) -> Address {
        TxSignerSync::address(&self.inner)
    }

    fn sign_transaction_sync(
        &self,
        tx: &mut dyn SignableTransaction<TxSignature>,
    ) -> alloy::signers::Result<TxSignature> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_at {
            return Err(alloy::signers::Error::other("hardware wallet unplugged"));
        }
        self.inner.sign_transaction_sync(tx)
    }
}
