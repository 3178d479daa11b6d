//! Drill engine
//!
//! Prepares a batch of signed, sequentially nonced value transfers for one
//! sender and pushes them through a node with bounded concurrency, folding
//! every outcome into a single report.

pub mod aggregator;
pub mod dispatcher;
pub mod driller;
pub mod preparer;

#[cfg(test)]
pub(crate) mod mock;

pub use aggregator::ReportAggregator;
pub use dispatcher::{dispatch, effective_concurrency};
pub use driller::Driller;
pub use preparer::{
    prepare_transfers, PrepareSettings, DEFAULT_GAS_LIMIT_MULTIPLIER, DEFAULT_TRANSFER_VALUE_WEI,
};
