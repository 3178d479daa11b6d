//! Drill run: bootstrap, prepare, send, report

use alloy::signers::local::PrivateKeySigner;
use anyhow::{bail, Context, Result};
use chain_client::{check_node, RpcChainClient};
use chrono::Utc;
use config::{Config, ConfigValidator};
use drill::{Driller, PrepareSettings};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use types::utils::generate_run_id;
use types::ReportSummary;

/// One configured drill against one node
pub struct Application {
    config: Config,
    driller: Driller<RpcChainClient, PrivateKeySigner>,
}

impl Application {
    /// Validate the configuration, check the node and build the engine
    pub async fn new(config: Config) -> Result<Self> {
        let validation = ConfigValidator::validate(&config);
        for warning in &validation.warnings {
            warn!(field = %warning.field, "{}", warning.message);
        }
        for issue in &validation.errors {
            error!(field = %issue.field, "{}", issue.message);
        }
        if validation.has_errors() {
            bail!("Invalid configuration ({})", validation.summary());
        }

        let client = RpcChainClient::new(
            &config.network.rpc_url,
            Duration::from_secs(config.network.request_timeout_seconds),
        )
        .context("Failed to create chain client")?;

        let status = check_node(&client)
            .await
            .with_context(|| format!("Node at {} is not reachable", config.network.rpc_url))?;
        info!(
            block_number = status.block_number,
            chain_id = status.chain_id,
            latency_ms = status.latency.as_millis() as u64,
            "Node is up"
        );
        if !status.matches_chain(config.network.chain_id) {
            warn!(
                configured = config.network.chain_id,
                node = status.chain_id,
                "Chain ID mismatch, the node will reject the signed transactions"
            );
        }

        let signer = PrivateKeySigner::from_str(config.private_key().expose_secret())
            .context("Invalid sender private key")?;
        let settings = PrepareSettings {
            transfer_value: config.transfer_value()?,
            gas_limit_multiplier: config.drill.gas_limit_multiplier,
        };

        let driller = Driller::new(
            Arc::new(client),
            signer,
            config.recipient()?,
            config.network.chain_id,
        )
        .with_settings(settings);

        Ok(Self { config, driller })
    }

    /// Prepare and send one batch. Cancelling stops preparation outright and
    /// lets in-flight sends finish.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        let run_id = generate_run_id();
        let started_at = Utc::now();
        let count = self.config.drill.transactions;

        info!(
            %run_id,
            sender = %self.driller.sender(),
            recipient = %self.driller.recipient(),
            count,
            "Starting drill"
        );

        let prepared = tokio::select! {
            biased;
            _ = cancel.cancelled() => bail!("Interrupted while preparing transactions"),
            prepared = self.driller.prepare(count) => {
                prepared.context("Failed to prepare transactions")?.len()
            }
        };
        info!(prepared, "Transactions signed, sending");

        let report = self
            .driller
            .send(self.config.drill.concurrency, cancel.clone())
            .await
            .context("Failed to dispatch transactions")?;

        let summary = report.summary(run_id, started_at, Utc::now());
        log_summary(&summary);

        if let Some(ref path) = self.config.report.output_path {
            write_report(path, &summary)?;
            info!(path = %path.display(), "Report written");
        }

        if cancel.is_cancelled() {
            warn!(skipped = summary.skipped, "Run interrupted");
        }

        if self.config.drill.fail_on_send_errors && report.has_errors() {
            bail!(
                "{} of {} transactions failed to send",
                report.failed(),
                report.attempted()
            );
        }

        Ok(())
    }
}

fn log_summary(summary: &ReportSummary) {
    info!(
        run_id = %summary.run_id,
        duration_ms = summary.duration_ms,
        prepared = summary.prepared,
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        workers = summary.workers,
        success_rate = summary.success_rate,
        "Drill finished"
    );
}

/// Write the summary as pretty JSON
fn write_report(path: &Path, summary: &ReportSummary) -> Result<()> {
    let content = serde_json::to_string_pretty(summary).context("Failed to serialize report")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::{matchers::method, Mock, MockServer, Request, Respond, ResponseTemplate};

    /// Node answering every call, failing the first `reject_sends` submissions
    struct FakeNode {
        balance: &'static str,
        reject_sends: usize,
        sends: Arc<AtomicUsize>,
    }

    impl Respond for FakeNode {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            let id = body["id"].clone();

            let result = match body["method"].as_str().unwrap_or_default() {
                "eth_getBalance" => serde_json::json!(self.balance),
                "eth_getTransactionCount" => serde_json::json!("0x0"),
                "eth_gasPrice" => serde_json::json!("0x3b9aca00"),
                "eth_estimateGas" => serde_json::json!("0x5208"),
                "eth_blockNumber" => serde_json::json!("0x1"),
                "eth_chainId" => serde_json::json!("0x35e30"),
                "eth_sendRawTransaction" => {
                    if self.sends.fetch_add(1, Ordering::SeqCst) < self.reject_sends {
                        return ResponseTemplate::new(200).set_body_json(serde_json::json!({
                            "jsonrpc": "2.0",
                            "id": id,
                            "error": { "code": -32000, "message": "txpool is full" }
                        }));
                    }
                    serde_json::json!(format!("0x{}", "ab".repeat(32)))
                }
                _ => serde_json::Value::Null,
            };

            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": result
            }))
        }
    }

    async fn fake_node(balance: &'static str, reject_sends: usize) -> (MockServer, Arc<AtomicUsize>) {
        let sends = Arc::new(AtomicUsize::new(0));
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(FakeNode {
                balance,
                reject_sends,
                sends: sends.clone(),
            })
            .mount(&server)
            .await;
        (server, sends)
    }

    fn config_for(server: &MockServer, transactions: usize) -> Config {
        let mut config = Config::default();
        config.network.rpc_url = server.uri();
        config.drill.transactions = transactions;
        config.drill.concurrency = 4;
        config
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_run_writes_report() {
        let (server, sends) = fake_node("0x3e8", 0).await;
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.json");

        let mut config = config_for(&server, 12);
        config.report.output_path = Some(report_path.clone());

        let mut app = Application::new(config).await.unwrap();
        app.run(CancellationToken::new()).await.unwrap();

        assert_eq!(sends.load(Ordering::SeqCst), 12);

        let content = std::fs::read_to_string(&report_path).unwrap();
        let summary: ReportSummary = serde_json::from_str(&content).unwrap();
        assert_eq!(summary.prepared, 12);
        assert_eq!(summary.attempted, 12);
        assert_eq!(summary.succeeded, 12);
        assert_eq!(summary.workers, 4);
        assert_eq!(summary.transaction_hashes.len(), 12);
        assert!(summary.errors.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_send_errors_fail_run_when_configured() {
        let (server, _sends) = fake_node("0x3e8", 2).await;

        let mut config = config_for(&server, 6);
        config.drill.fail_on_send_errors = true;

        let mut app = Application::new(config).await.unwrap();
        let err = app.run(CancellationToken::new()).await.unwrap_err();
        assert!(err.to_string().contains("2 of 6 transactions failed"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_send_errors_tolerated_by_default() {
        let (server, sends) = fake_node("0x3e8", 2).await;

        let mut app = Application::new(config_for(&server, 6)).await.unwrap();
        app.run(CancellationToken::new()).await.unwrap();

        assert_eq!(sends.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_empty_account_fails_run() {
        let (server, sends) = fake_node("0x0", 0).await;

        let mut app = Application::new(config_for(&server, 5)).await.unwrap();
        let err = app.run(CancellationToken::new()).await.unwrap_err();

        assert!(format!("{:#}", err).contains("Not enough balance"));
        assert_eq!(sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_prepare() {
        let (server, sends) = fake_node("0x3e8", 0).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut app = Application::new(config_for(&server, 5)).await.unwrap();
        assert!(app.run(cancel).await.is_err());
        assert_eq!(sends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreachable_node() {
        let mut config = Config::default();
        config.network.rpc_url = "http://127.0.0.1:9".to_string();
        config.network.request_timeout_seconds = 2;

        assert!(Application::new(config).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.drill.gas_limit_multiplier = 0;

        let err = Application::new(config).await.err().unwrap();
        assert!(err.to_string().contains("Invalid configuration"));
    }
}
