//! Bounded-concurrency dispatch of a prepared batch
//!
//! A fixed pool of workers pulls transactions from a shared work queue, so
//! every transaction is claimed exactly once. Workers report each attempt to
//! the [`ReportAggregator`], the only writer of the report.

use crate::aggregator::ReportAggregator;
use chain_client::ChainClient;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use types::{DispatchResult, DrillError, FinalReport, Result, SignedTransfer};

const WORK_QUEUE_CAPACITY: usize = 32;
const RESULT_QUEUE_CAPACITY: usize = 32;

/// A transaction handed to exactly one worker
#[derive(Debug)]
struct WorkItem {
    index: usize,
    transaction: SignedTransfer,
}

type WorkQueue = Arc<Mutex<mpsc::Receiver<WorkItem>>>;

/// Number of workers for a batch of `batch_size` under `limit`.
///
/// A limit of 0 means one worker per transaction.
pub fn effective_concurrency(limit: usize, batch_size: usize) -> usize {
    if limit == 0 {
        batch_size
    } else {
        limit.min(batch_size)
    }
}

/// Send every transaction through `client` using at most `concurrency_limit`
/// concurrent workers.
///
/// Individual send failures end up in the report's error list and never stop
/// sibling sends. Once `cancel` fires no new transaction is claimed, sends
/// already in flight complete and are recorded, and the rest is reported as
/// skipped. The call only fails when a worker task dies.
pub async fn dispatch<C>(
    client: Arc<C>,
    transactions: Vec<SignedTransfer>,
    concurrency_limit: usize,
    cancel: CancellationToken,
) -> Result<FinalReport>
where
    C: ChainClient + ?Sized + 'static,
{
    let total = transactions.len();
    let workers = effective_concurrency(concurrency_limit, total);
    let mut aggregator = ReportAggregator::new(transactions.clone());

    if total == 0 {
        return Ok(aggregator.finish(0));
    }

    info!(transactions = total, workers, "Dispatching transactions");

    let (work_tx, work_rx) = mpsc::channel::<WorkItem>(WORK_QUEUE_CAPACITY);
    let queue: WorkQueue = Arc::new(Mutex::new(work_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<DispatchResult>(RESULT_QUEUE_CAPACITY);

    let mut pool = JoinSet::new();
    for worker_id in 0..workers {
        if worker_id % 100 == 0 {
            debug!(worker_id, "Starting worker");
        }
        pool.spawn(run_worker(
            worker_id,
            client.clone(),
            queue.clone(),
            result_tx.clone(),
            cancel.clone(),
        ));
    }
    // Workers hold the only senders now, the aggregator stops when they exit
    drop(result_tx);
    drop(queue);

    let feeder = tokio::spawn(feed(work_tx, transactions, cancel.clone()));

    aggregator.drain(&mut result_rx).await;

    while let Some(joined) = pool.join_next().await {
        joined.map_err(|e| DrillError::Dispatch(format!("worker task failed: {}", e)))?;
    }
    feeder
        .await
        .map_err(|e| DrillError::Dispatch(format!("feeder task failed: {}", e)))?;

    let report = aggregator.finish(workers);
    info!(
        attempted = report.attempted(),
        failed = report.failed(),
        skipped = report.skipped,
        "Dispatch finished"
    );

    Ok(report)
}

/// Push every transaction, by value, into the work queue
async fn feed(work_tx: mpsc::Sender<WorkItem>, transactions: Vec<SignedTransfer>, cancel: CancellationToken) {
    for (index, transaction) in transactions.into_iter().enumerate() {
        let item = WorkItem { index, transaction };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            sent = work_tx.send(item) => {
                // Every worker is gone, nobody will claim the rest
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}

async fn run_worker<C>(
    worker_id: usize,
    client: Arc<C>,
    queue: WorkQueue,
    results: mpsc::Sender<DispatchResult>,
    cancel: CancellationToken,
) where
    C: ChainClient + ?Sized,
{
    loop {
        let claimed = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            item = claim(&queue) => item,
        };
        let Some(WorkItem { index, transaction }) = claimed else {
            break;
        };

        let error = client.submit_transaction(&transaction).await.err();
        let result = DispatchResult {
            index,
            nonce: transaction.nonce(),
            tx_hash: transaction.hash(),
            error,
        };

        if result.is_success() {
            debug!(worker_id, index, tx_hash = %result.tx_hash, "Transaction sent");
        }

        if results.send(result).await.is_err() {
            break;
        }
    }
}

async fn claim(queue: &WorkQueue) -> Option<WorkItem> {
    queue.lock().await.recv().await
}
