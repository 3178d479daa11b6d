//! JSON-RPC chain client implementation

use crate::traits::{ChainClient, ClientResult, GasEstimateRequest};
use alloy::eips::BlockId;
use alloy::primitives::{Address, U256};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;
use std::fmt;
use std::future::IntoFuture;
use std::time::Duration;
use tokio::time::timeout;
use types::{ChainClientError, SignedTransfer};

/// Chain client talking to a node over HTTP JSON-RPC
#[derive(Clone)]
pub struct RpcChainClient {
    endpoint: String,
    provider: RootProvider<Http<Client>>,
    request_timeout: Duration,
}

impl RpcChainClient {
    /// Create a client for `endpoint`. No request is made until first use.
    pub fn new(endpoint: &str, request_timeout: Duration) -> ClientResult<Self> {
        let url = endpoint
            .parse()
            .map_err(|_| ChainClientError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
            })?;
        let provider = ProviderBuilder::new().on_http(url);

        Ok(Self {
            endpoint: endpoint.to_string(),
            provider,
            request_timeout,
        })
    }

    /// Endpoint this client was built for
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Latest block number known to the node
    pub async fn block_number(&self) -> ClientResult<u64> {
        self.call("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    /// Chain id reported by the node
    pub async fn chain_id(&self) -> ClientResult<u64> {
        self.call("eth_chainId", self.provider.get_chain_id()).await
    }

    /// Run one RPC call under the request timeout, naming the method on failure
    async fn call<T, E, F>(&self, method: &'static str, request: F) -> ClientResult<T>
    where
        F: IntoFuture<Output = std::result::Result<T, E>>,
        E: fmt::Display,
    {
        match timeout(self.request_timeout, request.into_future()).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ChainClientError::rpc(method, e)),
            Err(_) => Err(ChainClientError::Timeout {
                method: method.to_string(),
                timeout_seconds: self.request_timeout.as_secs(),
            }),
        }
    }
}

impl fmt::Debug for RpcChainClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcChainClient")
            .field("endpoint", &self.endpoint)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn pending_balance(&self, address: Address) -> ClientResult<U256> {
        self.call(
            "eth_getBalance",
            self.provider
                .get_balance(address)
                .block_id(BlockId::pending()),
        )
        .await
    }

    async fn pending_nonce(&self, address: Address) -> ClientResult<u64> {
        let nonce = self
            .call(
                "eth_getTransactionCount",
                self.provider
                    .get_transaction_count(address)
                    .block_id(BlockId::pending()),
            )
            .await?;

        u64::try_from(nonce).map_err(|_| ChainClientError::InvalidResponse {
            method: "eth_getTransactionCount".to_string(),
            message: "nonce does not fit in u64".to_string(),
        })
    }

    async fn suggested_gas_price(&self) -> ClientResult<u128> {
        self.call("eth_gasPrice", self.provider.get_gas_price()).await
    }

    async fn estimate_gas(&self, request: &GasEstimateRequest) -> ClientResult<u64> {
        let mut req = TransactionRequest::default()
            .from(request.from)
            .to(request.to)
            .value(request.value)
            .input(TransactionInput::new(request.input.clone()));
        req.gas_price = request.gas_price;

        let gas = self
            .call("eth_estimateGas", self.provider.estimate_gas(&req))
            .await?;

        u64::try_from(gas).map_err(|_| ChainClientError::InvalidResponse {
            method: "eth_estimateGas".to_string(),
            message: "gas estimate does not fit in u64".to_string(),
        })
    }

    async fn submit_transaction(&self, tx: &SignedTransfer) -> ClientResult<()> {
        let encoded = tx.encoded_2718();
        self.call(
            "eth_sendRawTransaction",
            self.provider.send_raw_transaction(&encoded),
        )
        .await?;

        tracing::trace!(tx_hash = %tx.hash(), nonce = tx.nonce(), "Transaction accepted by node");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloy::network::TxSignerSync;
    use alloy::primitives::Bytes;
    use alloy::signers::local::PrivateKeySigner;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};
    use types::TransferParams;
    use wiremock::{matchers::method, Mock, MockServer, Request, Respond, ResponseTemplate};

    /// JSON-RPC node double answering with canned results and echoing ids
    #[derive(Clone, Default)]
    pub(crate) struct NodeResponder {
        pub(crate) failing_method: Option<&'static str>,
        pub(crate) seen: Arc<Mutex<Vec<Value>>>,
    }

    impl Respond for NodeResponder {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            let id = body["id"].clone();
            let rpc_method = body["method"].as_str().unwrap_or_default().to_string();
            self.seen.lock().unwrap().push(body.clone());

            if self.failing_method == Some(rpc_method.as_str()) {
                return ResponseTemplate::new(200).set_body_json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": { "code": -32000, "message": "nonce too low" }
                }));
            }

            let result = match rpc_method.as_str() {
                "eth_getBalance" => json!("0x3e8"),
                "eth_getTransactionCount" => json!("0x7"),
                "eth_gasPrice" => json!("0x3b9aca00"),
                "eth_estimateGas" => json!("0x5208"),
                "eth_blockNumber" => json!("0x10"),
                "eth_chainId" => json!("0x35e30"),
                "eth_sendRawTransaction" => json!(
                    "0xe670ec64341771606e55d6b4ca35a1a6b75ee3d5145a99d05921026d15273311"
                ),
                _ => Value::Null,
            };

            ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": result
            }))
        }
    }

    pub(crate) async fn mock_node(responder: NodeResponder) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(responder)
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn client_for(server: &MockServer) -> RpcChainClient {
        RpcChainClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = RpcChainClient::new("./geth.ipc", Duration::from_secs(5));
        assert!(matches!(
            result,
            Err(ChainClientError::InvalidEndpoint { .. })
        ));
    }

    #[tokio::test]
    async fn test_queries_use_pending_block() {
        let responder = NodeResponder::default();
        let seen = responder.seen.clone();
        let server = mock_node(responder).await;
        let client = client_for(&server);
        let address = Address::repeat_byte(0x11);

        assert_eq!(client.pending_balance(address).await.unwrap(), U256::from(1000u64));
        assert_eq!(client.pending_nonce(address).await.unwrap(), 7);
        assert_eq!(client.suggested_gas_price().await.unwrap(), 1_000_000_000);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0]["method"], "eth_getBalance");
        assert_eq!(seen[0]["params"][1], "pending");
        assert_eq!(seen[1]["method"], "eth_getTransactionCount");
        assert_eq!(seen[1]["params"][1], "pending");
    }

    #[tokio::test]
    async fn test_estimate_gas() {
        let server = mock_node(NodeResponder::default()).await;
        let client = client_for(&server);

        let gas = client
            .estimate_gas(&GasEstimateRequest {
                from: Address::repeat_byte(0x11),
                to: Address::repeat_byte(0x22),
                value: U256::from(1u64),
                input: Bytes::from(vec![0u8; 16]),
                gas_price: Some(1_000_000_000),
            })
            .await
            .unwrap();

        assert_eq!(gas, 21000);
    }

    #[tokio::test]
    async fn test_submit_sends_raw_encoding() {
        let responder = NodeResponder::default();
        let seen = responder.seen.clone();
        let server = mock_node(responder).await;
        let client = client_for(&server);

        let signer = PrivateKeySigner::random();
        let mut tx = TransferParams {
            chain_id: 220720,
            nonce: 0,
            to: Address::repeat_byte(0x22),
            value: U256::from(1u64),
            gas_limit: 210_000,
            gas_price: 1_000_000_000,
            input: Bytes::new(),
        }
        .to_legacy_tx();
        let signature = signer.sign_transaction_sync(&mut tx).unwrap();
        let transfer = SignedTransfer::from_parts(tx, signature);

        client.submit_transaction(&transfer).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0]["method"], "eth_sendRawTransaction");
        assert_eq!(seen[0]["params"][0], transfer.raw_hex());
    }

    #[tokio::test]
    async fn test_node_error_names_method() {
        let server = mock_node(NodeResponder {
            failing_method: Some("eth_gasPrice"),
            ..Default::default()
        })
        .await;
        let client = client_for(&server);

        let err = client.suggested_gas_price().await.unwrap_err();
        match err {
            ChainClientError::Rpc { method, message } => {
                assert_eq!(method, "eth_gasPrice");
                assert!(message.contains("nonce too low"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
