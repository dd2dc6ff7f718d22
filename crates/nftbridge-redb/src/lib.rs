//! Redb storage backend for the NFT bridge transaction log

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use nftbridge::database::{self, TransactionLog};
use nftbridge::BridgeTransactionRecord;
use redb::{Database, ReadableTable, TableDefinition};

pub mod error;

pub use error::Error;

// <(address, sequence), serialized BridgeTransactionRecord>
const RECORDS_TABLE: TableDefinition<(&str, u64), &str> = TableDefinition::new("records");
const CONFIG_TABLE: TableDefinition<&str, &str> = TableDefinition::new("config");

const DATABASE_VERSION: u32 = 0;

/// Redb backed [`TransactionLog`]
///
/// Records are keyed by owner address and a per-address sequence number, so a range scan over
/// one address yields its records in insertion order.
#[derive(Debug, Clone)]
pub struct RedbTransactionLog {
    db: Arc<Database>,
}

impl RedbTransactionLog {
    /// Open or create the log at `path`
    pub fn new(path: &Path) -> Result<Self, Error> {
        let db = Database::create(path)?;

        let db_version: Option<String> = {
            let read_txn = db.begin_read()?;
            match read_txn.open_table(CONFIG_TABLE) {
                Ok(table) => table.get("db_version")?.map(|v| v.value().to_string()),
                Err(_) => None,
            }
        };

        match db_version {
            Some(db_version) => {
                let current_file_version = u32::from_str(&db_version)?;
                if current_file_version != DATABASE_VERSION {
                    tracing::error!(
                        "Database version {} does not match {}",
                        current_file_version,
                        DATABASE_VERSION
                    );
                    return Err(Error::UnknownDatabaseVersion(current_file_version));
                }
            }
            None => {
                let write_txn = db.begin_write()?;
                {
                    let mut table = write_txn.open_table(CONFIG_TABLE)?;
                    // Open all tables to init a new db
                    let _ = write_txn.open_table(RECORDS_TABLE)?;

                    table.insert("db_version", DATABASE_VERSION.to_string().as_str())?;
                }
                write_txn.commit()?;
            }
        }

        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl TransactionLog for RedbTransactionLog {
    #[tracing::instrument(skip(self, record))]
    async fn add_record(
        &self,
        address: Address,
        record: BridgeTransactionRecord,
    ) -> Result<(), database::Error> {
        let owner = address.to_string();
        let value = serde_json::to_string(&record).map_err(Error::from)?;

        let write_txn = self.db.begin_write().map_err(Error::from)?;
        {
            let mut table = write_txn.open_table(RECORDS_TABLE).map_err(Error::from)?;

            let next_sequence = match table
                .range((owner.as_str(), 0u64)..=(owner.as_str(), u64::MAX))
                .map_err(Error::from)?
                .next_back()
            {
                Some(entry) => {
                    let (key, _) = entry.map_err(Error::from)?;
                    let (_, sequence) = key.value();
                    sequence + 1
                }
                None => 0,
            };

            table
                .insert((owner.as_str(), next_sequence), value.as_str())
                .map_err(Error::from)?;
        }
        write_txn.commit().map_err(Error::from)?;

        tracing::debug!("Recorded {} for {}", record.hash, owner);

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn records(
        &self,
        address: Address,
    ) -> Result<Vec<BridgeTransactionRecord>, database::Error> {
        let owner = address.to_string();

        let read_txn = self.db.begin_read().map_err(Error::from)?;
        let table = read_txn.open_table(RECORDS_TABLE).map_err(Error::from)?;

        let mut records = Vec::new();
        for entry in table
            .range((owner.as_str(), 0u64)..=(owner.as_str(), u64::MAX))
            .map_err(Error::from)?
        {
            let (_, value) = entry.map_err(Error::from)?;
            match serde_json::from_str::<BridgeTransactionRecord>(value.value()) {
                Ok(record) => records.push(record),
                Err(err) => tracing::warn!("Skipping unreadable record of {}: {}", owner, err),
            }
        }

        Ok(records)
    }
}
