//! Result aggregation for the dispatch pipeline

use tokio::sync::mpsc;
use tracing::warn;
use types::{DispatchResult, DrillError, FinalReport, SignedTransfer};

/// Sole writer of a run's report.
///
/// Workers never touch the report: they send [`DispatchResult`]s over a
/// channel and the aggregator folds them in one at a time.
#[derive(Debug)]
pub struct ReportAggregator {
    report: FinalReport,
}

impl ReportAggregator {
    /// Start a report echoing the prepared batch
    pub fn new(transactions: Vec<SignedTransfer>) -> Self {
        Self {
            report: FinalReport::new(transactions),
        }
    }

    /// Fold one result into the report
    pub fn record(&mut self, result: DispatchResult) {
        if let Some(source) = result.error {
            warn!(
                index = result.index,
                nonce = result.nonce,
                tx_hash = %result.tx_hash,
                error = %source,
                "Transaction send failed"
            );
            self.report.errors.push(DrillError::SendFailure {
                tx_hash: result.tx_hash,
                nonce: result.nonce,
                source,
            });
        }
        self.report.transaction_hashes.push(result.tx_hash);
    }

    /// Consume results until every sender has been dropped
    pub async fn drain(&mut self, results: &mut mpsc::Receiver<DispatchResult>) {
        while let Some(result) = results.recv().await {
            self.record(result);
        }
    }

    /// Close the report. Transactions without a result count as skipped.
    pub fn finish(mut self, workers: usize) -> FinalReport {
        self.report.workers = workers;
        self.report.skipped = self
            .report
            .transactions
            .len()
            .saturating_sub(self.report.transaction_hashes.len());
        self.report
    }
}
