//! Transaction recorder

use std::sync::Arc;

use alloy_primitives::{Address, TxHash};
use tracing::instrument;

use crate::database::TransactionLog;
use crate::services::PendingTransactions;
use crate::types::{BridgeTransactionRecord, ChainId};
use crate::Error;

/// Writes submitted transactions to the pending tracker and the local log
#[derive(Clone)]
pub struct TransactionRecorder {
    log: Arc<dyn TransactionLog>,
    pending: Arc<dyn PendingTransactions>,
}

impl TransactionRecorder {
    /// Create recorder
    pub fn new(log: Arc<dyn TransactionLog>, pending: Arc<dyn PendingTransactions>) -> Self {
        Self { log, pending }
    }

    /// Append `record` to the log of `address`
    #[instrument(skip(self, record), fields(hash = %record.hash))]
    pub async fn add_record(
        &self,
        address: Address,
        record: BridgeTransactionRecord,
    ) -> Result<(), Error> {
        self.log.add_record(address, record).await?;
        Ok(())
    }

    /// Records of `address` in insertion order
    pub async fn records(&self, address: Address) -> Result<Vec<BridgeTransactionRecord>, Error> {
        Ok(self.log.records(address).await?)
    }

    /// Track `hash` as pending on `chain_id`
    ///
    /// Best effort, the transaction is already on chain.
    pub async fn track(&self, chain_id: ChainId, hash: TxHash) {
        if let Err(err) = self.pending.add(chain_id, hash).await {
            tracing::warn!(
                "Failed to track pending transaction {} on chain {}: {}",
                hash,
                chain_id,
                err
            );
        }
    }
}
