//! Transaction log
//!
//! The per-address transaction log is the only persistence boundary of the workflow. Backends
//! append records in insertion order, never deduplicate, and never rewrite a record.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::types::BridgeTransactionRecord;

/// Database Error
#[derive(Debug, Error)]
pub enum Error {
    /// Backend Error
    #[error(transparent)]
    Database(Box<dyn std::error::Error + Send + Sync>),
    /// Serde Error
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Append-only, address partitioned log of bridge submissions
#[async_trait]
pub trait TransactionLog: Debug + Send + Sync {
    /// Append `record` to the log of `address`
    async fn add_record(
        &self,
        address: Address,
        record: BridgeTransactionRecord,
    ) -> Result<(), Error>;

    /// Records of `address` in insertion order
    async fn records(&self, address: Address) -> Result<Vec<BridgeTransactionRecord>, Error>;
}

/// In memory [`TransactionLog`]
#[derive(Debug, Clone, Default)]
pub struct MemoryTransactionLog {
    records: Arc<RwLock<HashMap<Address, Vec<BridgeTransactionRecord>>>>,
}

impl MemoryTransactionLog {
    /// Create empty log
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionLog for MemoryTransactionLog {
    async fn add_record(
        &self,
        address: Address,
        record: BridgeTransactionRecord,
    ) -> Result<(), Error> {
        self.records
            .write()
            .await
            .entry(address)
            .or_default()
            .push(record);
        Ok(())
    }

    async fn records(&self, address: Address) -> Result<Vec<BridgeTransactionRecord>, Error> {
        Ok(self
            .records
            .read()
            .await
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, TxHash, U256};

    use super::*;
    use crate::types::{Token, TokenStandard};

    const ALICE: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
    const BOB: Address = address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC");

    fn record(byte: u8) -> BridgeTransactionRecord {
        let token = Token::new(
            "PUNK",
            TokenStandard::Erc721,
            1,
            address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
        );
        BridgeTransactionRecord::new(
            TxHash::repeat_byte(byte),
            ALICE,
            U256::from(1u64),
            &token,
            1,
            10,
        )
    }

    #[tokio::test]
    async fn test_records_keep_insertion_order_and_duplicates() {
        let log = MemoryTransactionLog::new();

        log.add_record(ALICE, record(2)).await.unwrap();
        log.add_record(ALICE, record(1)).await.unwrap();
        log.add_record(ALICE, record(1)).await.unwrap();

        let hashes: Vec<_> = log
            .records(ALICE)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.hash)
            .collect();
        assert_eq!(
            hashes,
            vec![
                TxHash::repeat_byte(2),
                TxHash::repeat_byte(1),
                TxHash::repeat_byte(1)
            ]
        );
    }

    #[tokio::test]
    async fn test_records_are_partitioned_by_address() {
        let log = MemoryTransactionLog::new();
        log.add_record(ALICE, record(1)).await.unwrap();

        assert_eq!(log.records(ALICE).await.unwrap().len(), 1);
        assert!(log.records(BOB).await.unwrap().is_empty());
    }
}
