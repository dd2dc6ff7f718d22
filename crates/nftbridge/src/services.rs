//! External collaborators
//!
//! Everything the workflow does not own is reached through these traits: signing, address
//! lookup, NFT discovery, contract calls and pending transaction tracking.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::database::TransactionLog;
use crate::types::{ApprovalArgs, BridgeArgs, ChainId, Nft, SignerHandle, Token, TokenStandard};
use crate::Error;

/// Connected wallet
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Signer for `chain_id`
    async fn signer(&self, chain_id: ChainId) -> Result<SignerHandle, Error>;
}

/// Cross-chain token address registry
#[async_trait]
pub trait AddressRegistry: Send + Sync {
    /// Address of `token` on `src_chain_id` for a transfer to `dest_chain_id`
    async fn resolve_cross_chain_address(
        &self,
        token: &Token,
        src_chain_id: ChainId,
        dest_chain_id: ChainId,
    ) -> Result<Option<Address>, Error>;
}

/// Wallet NFT scanner
#[async_trait]
pub trait NftScanner: Send + Sync {
    /// NFTs held by `owner` on `chain_id`
    async fn scan(&self, owner: Address, chain_id: ChainId) -> Result<Vec<Nft>, Error>;
}

/// Single NFT metadata lookup
#[async_trait]
pub trait NftMetadata: Send + Sync {
    /// Look up `token_id` of `contract` owned by `owner`
    async fn lookup(
        &self,
        contract: Address,
        chain_id: ChainId,
        owner: Address,
        token_id: U256,
    ) -> Result<Option<Nft>, Error>;
}

/// Bridge contract calls for one token standard
#[async_trait]
pub trait BridgeService: Send + Sync {
    /// Approve the vault to move tokens
    async fn approve(&self, args: ApprovalArgs) -> Result<TxHash, Error>;

    /// Submit the bridge transaction
    async fn bridge(&self, args: BridgeArgs) -> Result<TxHash, Error>;
}

/// In-flight transaction tracker used for status polling
#[async_trait]
pub trait PendingTransactions: Send + Sync {
    /// Track `hash` on `chain_id`
    async fn add(&self, chain_id: ChainId, hash: TxHash) -> Result<(), Error>;
}

/// Bridge services by token standard
#[derive(Clone, Default)]
pub struct BridgeServices {
    /// Native and ERC20
    pub fungible: Option<Arc<dyn BridgeService>>,
    /// ERC721
    pub erc721: Option<Arc<dyn BridgeService>>,
    /// ERC1155
    pub erc1155: Option<Arc<dyn BridgeService>>,
}

impl BridgeServices {
    /// Service handling `standard`
    pub fn for_standard(&self, standard: TokenStandard) -> Option<Arc<dyn BridgeService>> {
        match standard {
            TokenStandard::Native | TokenStandard::Erc20 => self.fungible.clone(),
            TokenStandard::Erc721 => self.erc721.clone(),
            TokenStandard::Erc1155 => self.erc1155.clone(),
        }
    }
}

impl fmt::Debug for BridgeServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeServices")
            .field("fungible", &self.fungible.is_some())
            .field("erc721", &self.erc721.is_some())
            .field("erc1155", &self.erc1155.is_some())
            .finish()
    }
}

/// Collaborators of a [`Workflow`](crate::Workflow)
#[derive(Clone)]
pub struct Services {
    /// Wallet
    pub wallet: Arc<dyn WalletProvider>,
    /// Cross-chain address registry
    pub registry: Arc<dyn AddressRegistry>,
    /// NFT scanner
    pub scanner: Arc<dyn NftScanner>,
    /// NFT metadata
    pub metadata: Arc<dyn NftMetadata>,
    /// Bridge services
    pub bridges: BridgeServices,
    /// Pending transaction tracker
    pub pending: Arc<dyn PendingTransactions>,
    /// Transaction log
    pub log: Arc<dyn TransactionLog>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("bridges", &self.bridges)
            .field("log", &self.log)
            .finish_non_exhaustive()
    }
}
