//! Fake collaborators
//!
//! Used for testing, where the workflow is driven without a wallet, an indexer or a chain.
//! Every fake records what it was asked to do and can be told to fail. Calls can be held at a
//! [`Gate`] to observe the workflow while a collaborator is still in flight.

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use alloy_primitives::{keccak256, Address, TxHash, U256};
use async_trait::async_trait;
use nftbridge::database::{self, TransactionLog};
use nftbridge::services::{
    AddressRegistry, BridgeService, NftMetadata, NftScanner, PendingTransactions, WalletProvider,
};
use nftbridge::workflow::components::{ActionPanel, FormPanel, Notification, Notifier};
use nftbridge::{
    ApprovalArgs, BridgeArgs, BridgeTransactionRecord, ChainId, Error, Nft, SignerHandle, Token,
};
use tokio::sync::{Mutex, Notify};

/// Holds calls until released
///
/// An open gate lets every call through. A closed gate parks the next call until
/// [`Gate::open`]; only one call is expected to be parked at a time.
#[derive(Debug, Default)]
pub struct Gate {
    closed: AtomicBool,
    entered: Notify,
    release: Notify,
}

impl Gate {
    /// Park subsequent calls
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Let parked and subsequent calls through
    pub fn open(&self) {
        self.closed.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }

    /// Wait until a call is parked
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    async fn pass(&self) {
        if self.closed.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

/// Wallet signing with a fixed address on every chain
#[derive(Debug)]
pub struct FakeWallet {
    address: Address,
    reject: AtomicBool,
}

impl FakeWallet {
    /// Create a wallet for `address`
    pub fn new(address: Address) -> Self {
        Self {
            address,
            reject: AtomicBool::new(false),
        }
    }

    /// Refuse every signer request
    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn signer(&self, chain_id: ChainId) -> Result<SignerHandle, Error> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(Error::WalletRejected("user denied signer access".to_string()));
        }

        Ok(SignerHandle {
            chain_id,
            address: self.address,
        })
    }
}

/// Address registry backed by a table keyed on symbol and chain pair
#[derive(Debug, Default)]
pub struct FakeRegistry {
    addresses: StdMutex<HashMap<(String, ChainId, ChainId), Address>>,
    calls: AtomicUsize,
}

impl FakeRegistry {
    /// Register `address` for `symbol` on `src_chain_id` when bridging to `dest_chain_id`
    pub fn insert(
        &self,
        symbol: impl Into<String>,
        src_chain_id: ChainId,
        dest_chain_id: ChainId,
        address: Address,
    ) {
        self.addresses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((symbol.into(), src_chain_id, dest_chain_id), address);
    }

    /// Number of lookups made
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressRegistry for FakeRegistry {
    async fn resolve_cross_chain_address(
        &self,
        token: &Token,
        src_chain_id: ChainId,
        dest_chain_id: ChainId,
    ) -> Result<Option<Address>, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .addresses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(token.symbol.clone(), src_chain_id, dest_chain_id))
            .copied())
    }
}

/// Wallet scanner returning a preset inventory
#[derive(Debug, Default)]
pub struct FakeScanner {
    inventory: Mutex<HashMap<(Address, ChainId), Vec<Nft>>>,
    failure: Mutex<Option<String>>,
    /// Gate held before results are returned
    pub gate: Gate,
}

impl FakeScanner {
    /// Give `owner` `nfts` on `chain_id`
    pub async fn set_inventory(&self, owner: Address, chain_id: ChainId, nfts: Vec<Nft>) {
        self.inventory.lock().await.insert((owner, chain_id), nfts);
    }

    /// Fail every scan with `reason`, `None` to recover
    pub async fn set_failure(&self, reason: Option<String>) {
        *self.failure.lock().await = reason;
    }
}

#[async_trait]
impl NftScanner for FakeScanner {
    async fn scan(&self, owner: Address, chain_id: ChainId) -> Result<Vec<Nft>, Error> {
        self.gate.pass().await;

        if let Some(reason) = self.failure.lock().await.clone() {
            return Err(Error::Scan(reason));
        }

        Ok(self
            .inventory
            .lock()
            .await
            .get(&(owner, chain_id))
            .cloned()
            .unwrap_or_default())
    }
}

/// Metadata service over a preset set of NFTs
#[derive(Debug, Default)]
pub struct FakeMetadata {
    nfts: Mutex<HashMap<(Address, ChainId, U256), Nft>>,
}

impl FakeMetadata {
    /// Make `nft` resolvable on `chain_id`
    ///
    /// The nft token must be deployed on `chain_id`.
    pub async fn insert(&self, chain_id: ChainId, nft: Nft) {
        if let Some(contract) = nft.token.address_on(chain_id) {
            self.nfts
                .lock()
                .await
                .insert((contract, chain_id, nft.token_id), nft);
        }
    }
}

#[async_trait]
impl NftMetadata for FakeMetadata {
    async fn lookup(
        &self,
        contract: Address,
        chain_id: ChainId,
        _owner: Address,
        token_id: U256,
    ) -> Result<Option<Nft>, Error> {
        Ok(self
            .nfts
            .lock()
            .await
            .get(&(contract, chain_id, token_id))
            .cloned())
    }
}

/// Bridge service recording every call
///
/// Hashes are derived from a call counter so each submission is distinct.
#[derive(Debug, Default)]
pub struct FakeBridgeService {
    approvals: Mutex<Vec<ApprovalArgs>>,
    bridges: Mutex<Vec<BridgeArgs>>,
    failure: Mutex<Option<String>>,
    empty_hash: AtomicBool,
    nonce: AtomicU64,
    /// Gate held before the hash is returned
    pub gate: Gate,
}

impl FakeBridgeService {
    /// Create service
    pub fn new() -> Self {
        Self::default()
    }

    /// Revert every call with `reason`, `None` to recover
    pub async fn set_failure(&self, reason: Option<String>) {
        *self.failure.lock().await = reason;
    }

    /// Return the zero hash instead of a transaction hash
    pub fn set_empty_hash(&self, empty: bool) {
        self.empty_hash.store(empty, Ordering::SeqCst);
    }

    /// Approvals submitted so far
    pub async fn approvals(&self) -> Vec<ApprovalArgs> {
        self.approvals.lock().await.clone()
    }

    /// Bridges submitted so far
    pub async fn bridges(&self) -> Vec<BridgeArgs> {
        self.bridges.lock().await.clone()
    }

    async fn next_hash(&self, kind: &str) -> Result<TxHash, Error> {
        self.gate.pass().await;

        if let Some(reason) = self.failure.lock().await.clone() {
            return Err(Error::Submission(reason));
        }

        if self.empty_hash.load(Ordering::SeqCst) {
            return Ok(TxHash::ZERO);
        }

        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        Ok(keccak256(format!("{kind}:{nonce}")))
    }
}

#[async_trait]
impl BridgeService for FakeBridgeService {
    async fn approve(&self, args: ApprovalArgs) -> Result<TxHash, Error> {
        tracing::debug!("Fake approve {:?}", args);
        let hash = self.next_hash("approve").await?;
        self.approvals.lock().await.push(args);
        Ok(hash)
    }

    async fn bridge(&self, args: BridgeArgs) -> Result<TxHash, Error> {
        tracing::debug!("Fake bridge {:?}", args);
        let hash = self.next_hash("bridge").await?;
        self.bridges.lock().await.push(args);
        Ok(hash)
    }
}

/// Pending transaction tracker keeping hashes in memory
#[derive(Debug, Default)]
pub struct FakePendingTransactions {
    hashes: Mutex<Vec<(ChainId, TxHash)>>,
    fail: AtomicBool,
}

impl FakePendingTransactions {
    /// Fail every add
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Tracked hashes in insertion order
    pub async fn hashes(&self) -> Vec<(ChainId, TxHash)> {
        self.hashes.lock().await.clone()
    }
}

#[async_trait]
impl PendingTransactions for FakePendingTransactions {
    async fn add(&self, chain_id: ChainId, hash: TxHash) -> Result<(), Error> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Custom("pending tracker unavailable".to_string()));
        }

        self.hashes.lock().await.push((chain_id, hash));
        Ok(())
    }
}

/// Transaction log whose writes always fail
#[derive(Debug, Default)]
pub struct FailingTransactionLog;

#[async_trait]
impl TransactionLog for FailingTransactionLog {
    async fn add_record(
        &self,
        _address: Address,
        _record: BridgeTransactionRecord,
    ) -> Result<(), database::Error> {
        Err(database::Error::Database("storage quota exceeded".into()))
    }

    async fn records(
        &self,
        _address: Address,
    ) -> Result<Vec<BridgeTransactionRecord>, database::Error> {
        Ok(vec![])
    }
}

/// Notifier keeping every notification
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: StdMutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Notifications in order shown
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}

/// Actions panel counting calls
#[derive(Debug, Default)]
pub struct FakeActionPanel {
    approval_checks: AtomicUsize,
    form_updates: AtomicUsize,
}

impl FakeActionPanel {
    /// Number of approval re-checks
    pub fn approval_checks(&self) -> usize {
        self.approval_checks.load(Ordering::SeqCst)
    }

    /// Number of form updates
    pub fn form_updates(&self) -> usize {
        self.form_updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActionPanel for FakeActionPanel {
    async fn check_approval(&self) -> Result<(), Error> {
        self.approval_checks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn update_form(&self) {
        self.form_updates.fetch_add(1, Ordering::SeqCst);
    }
}

/// Form panel counting calls
#[derive(Debug, Default)]
pub struct FakeFormPanel {
    validations: AtomicUsize,
    clears: AtomicUsize,
}

impl FakeFormPanel {
    /// Number of validations
    pub fn validations(&self) -> usize {
        self.validations.load(Ordering::SeqCst)
    }

    /// Number of clears
    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl FormPanel for FakeFormPanel {
    fn validate(&self) {
        self.validations.fetch_add(1, Ordering::SeqCst);
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// Shared handles to a full set of fakes
#[derive(Debug, Clone)]
pub struct FakeCollaborators {
    /// Wallet
    pub wallet: Arc<FakeWallet>,
    /// Registry
    pub registry: Arc<FakeRegistry>,
    /// Scanner
    pub scanner: Arc<FakeScanner>,
    /// Metadata
    pub metadata: Arc<FakeMetadata>,
    /// Bridge service for every standard
    pub bridge: Arc<FakeBridgeService>,
    /// Pending tracker
    pub pending: Arc<FakePendingTransactions>,
}

impl FakeCollaborators {
    /// Fakes for a wallet holding `owner`
    pub fn new(owner: Address) -> Self {
        Self {
            wallet: Arc::new(FakeWallet::new(owner)),
            registry: Arc::new(FakeRegistry::default()),
            scanner: Arc::new(FakeScanner::default()),
            metadata: Arc::new(FakeMetadata::default()),
            bridge: Arc::new(FakeBridgeService::new()),
            pending: Arc::new(FakePendingTransactions::default()),
        }
    }

    /// Services wired to these fakes, writing to `log`
    pub fn services(&self, log: Arc<dyn TransactionLog>) -> nftbridge::services::Services {
        let bridge: Arc<dyn BridgeService> = self.bridge.clone();

        nftbridge::services::Services {
            wallet: self.wallet.clone(),
            registry: self.registry.clone(),
            scanner: self.scanner.clone(),
            metadata: self.metadata.clone(),
            bridges: nftbridge::services::BridgeServices {
                fungible: Some(bridge.clone()),
                erc721: Some(bridge.clone()),
                erc1155: Some(bridge),
            },
            pending: self.pending.clone(),
            log,
        }
    }
}
