//! Node preflight check

use crate::client::RpcChainClient;
use crate::traits::ClientResult;
use std::time::{Duration, Instant};

/// Snapshot of the node taken before a drill run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStatus {
    /// Latest block number
    pub block_number: u64,
    /// Chain id reported by the node
    pub chain_id: u64,
    /// Round trip of the block number query
    pub latency: Duration,
}

impl NodeStatus {
    /// Whether transactions signed for `expected` will be accepted
    pub fn matches_chain(&self, expected: u64) -> bool {
        self.chain_id == expected
    }
}

/// Query the node for its height and chain id
pub async fn check_node(client: &RpcChainClient) -> ClientResult<NodeStatus> {
    let start = Instant::now();
    let block_number = client.block_number().await?;
    let latency = start.elapsed();

    let chain_id = client.chain_id().await?;

    tracing::debug!(
        endpoint = %client.endpoint(),
        block_number,
        chain_id,
        latency_ms = latency.as_millis() as u64,
        "Node preflight completed"
    );

    Ok(NodeStatus {
        block_number,
        chain_id,
        latency,
    })
}
