//! Dispatch results and the final run report

use crate::error::{ChainClientError, DrillError};
use crate::transfer::SignedTransfer;
use crate::utils::calculate_percentage;
use alloy::primitives::TxHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one send attempt, produced by a dispatch worker
#[derive(Debug, Clone)]
pub struct DispatchResult {
    /// Position of the transaction in the prepared batch
    pub index: usize,
    /// Nonce of the transaction
    pub nonce: u64,
    /// Hash of the transaction, known regardless of the send outcome
    pub tx_hash: TxHash,
    /// Submission error, if any
    pub error: Option<ChainClientError>,
}

impl DispatchResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// The single output of a drill run
#[derive(Debug, Default)]
pub struct FinalReport {
    /// Every prepared transaction, in nonce order
    pub transactions: Vec<SignedTransfer>,
    /// One hash per completed send attempt, in completion order
    pub transaction_hashes: Vec<TxHash>,
    /// Failed send attempts, in completion order
    pub errors: Vec<DrillError>,
    /// Transactions never claimed because the run was cancelled
    pub skipped: usize,
    /// Number of dispatch workers the batch was spread over
    pub workers: usize,
}

impl FinalReport {
    /// Create an empty report echoing the prepared batch
    pub fn new(transactions: Vec<SignedTransfer>) -> Self {
        let capacity = transactions.len();
        Self {
            transactions,
            transaction_hashes: Vec::with_capacity(capacity),
            errors: Vec::new(),
            skipped: 0,
            workers: 0,
        }
    }

    /// Number of send attempts that completed
    pub fn attempted(&self) -> usize {
        self.transaction_hashes.len()
    }

    /// Number of send attempts accepted by the node
    pub fn succeeded(&self) -> usize {
        self.attempted().saturating_sub(self.errors.len())
    }

    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// Every prepared transaction was attempted
    pub fn is_complete(&self) -> bool {
        self.attempted() == self.transactions.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Build a serializable summary of this report
    pub fn summary(
        &self,
        run_id: Uuid,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> ReportSummary {
        ReportSummary {
            run_id,
            started_at,
            finished_at,
            duration_ms: crate::utils::time_diff_ms(started_at, finished_at),
            prepared: self.transactions.len(),
            attempted: self.attempted(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            skipped: self.skipped,
            workers: self.workers,
            success_rate: crate::utils::round_to_decimal_places(
                calculate_percentage(self.succeeded() as u64, self.transactions.len() as u64),
                2,
            ),
            transaction_hashes: self
                .transaction_hashes
                .iter()
                .map(|hash| format!("{:#x}", hash))
                .collect(),
            errors: self.errors.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Serializable view of a finished run, written as the JSON report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub prepared: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub workers: usize,
    /// Percentage of prepared transactions accepted by the node
    pub success_rate: f64,
    pub transaction_hashes: Vec<String>,
    pub errors: Vec<String>,
}
