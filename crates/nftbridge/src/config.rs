//! Bridge configuration
//!
//! Administratively configured routes, vault contracts per chain pair, block explorers and the
//! static cross-chain token table.

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::services::AddressRegistry;
use crate::types::{ChainId, Token, TokenStandard};
use crate::Error;

/// Permitted (source, destination) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    /// Source chain
    pub src_chain_id: ChainId,
    /// Destination chain
    pub dest_chain_id: ChainId,
}

/// Vault contracts of a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Source chain
    pub src_chain_id: ChainId,
    /// Destination chain
    pub dest_chain_id: ChainId,
    /// ERC721 vault
    pub erc721: Address,
    /// ERC1155 vault
    pub erc1155: Address,
    /// ERC20 vault
    #[serde(default)]
    pub erc20: Option<Address>,
}

/// Block explorer of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Chain
    pub chain_id: ChainId,
    /// Base url, `/tx/<hash>` is appended
    pub url: String,
}

/// Token deployment on one chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAddress {
    /// Chain
    pub chain_id: ChainId,
    /// Contract address
    pub address: Address,
}

/// Known deployments of one token across chains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMapping {
    /// Symbol, informational only
    pub symbol: String,
    /// Deployments
    pub addresses: Vec<ChainAddress>,
}

/// Bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Routes
    #[serde(default)]
    pub routes: Vec<Route>,
    /// Vaults
    #[serde(default)]
    pub vaults: Vec<VaultConfig>,
    /// Explorers
    #[serde(default)]
    pub explorers: Vec<ExplorerConfig>,
    /// Cross-chain token table
    #[serde(default)]
    pub tokens: Vec<TokenMapping>,
}

impl BridgeConfig {
    /// Whether bridging from `src_chain_id` to `dest_chain_id` is permitted
    pub fn has_route(&self, src_chain_id: ChainId, dest_chain_id: ChainId) -> bool {
        self.routes
            .iter()
            .any(|r| r.src_chain_id == src_chain_id && r.dest_chain_id == dest_chain_id)
    }

    /// Destinations reachable from `src_chain_id`
    pub fn destinations(&self, src_chain_id: ChainId) -> Vec<ChainId> {
        self.routes
            .iter()
            .filter(|r| r.src_chain_id == src_chain_id)
            .map(|r| r.dest_chain_id)
            .collect()
    }

    /// Vaults of a chain pair
    pub fn vaults(&self, src_chain_id: ChainId, dest_chain_id: ChainId) -> Option<&VaultConfig> {
        self.vaults
            .iter()
            .find(|v| v.src_chain_id == src_chain_id && v.dest_chain_id == dest_chain_id)
    }

    /// Vault that must be approved to move a token of `standard`
    ///
    /// ERC1155 uses the ERC1155 vault and every other NFT standard the ERC721 vault.
    pub fn spender(
        &self,
        standard: TokenStandard,
        src_chain_id: ChainId,
        dest_chain_id: ChainId,
    ) -> Result<Address, Error> {
        let vaults = self
            .vaults(src_chain_id, dest_chain_id)
            .ok_or(Error::VaultNotConfigured(src_chain_id, dest_chain_id))?;

        match standard {
            TokenStandard::Erc1155 => Ok(vaults.erc1155),
            TokenStandard::Erc721 => Ok(vaults.erc721),
            TokenStandard::Erc20 => vaults
                .erc20
                .ok_or(Error::VaultNotConfigured(src_chain_id, dest_chain_id)),
            TokenStandard::Native => Err(Error::ApprovalNotRequired),
        }
    }

    /// Explorer link for a transaction
    pub fn explorer_tx_url(&self, chain_id: ChainId, hash: &TxHash) -> Option<String> {
        self.explorers
            .iter()
            .find(|e| e.chain_id == chain_id)
            .map(|e| format!("{}/tx/{}", e.url.trim_end_matches('/'), hash))
    }
}

#[async_trait]
impl AddressRegistry for BridgeConfig {
    /// Matches tokens by deployment address only, never by symbol
    async fn resolve_cross_chain_address(
        &self,
        token: &Token,
        src_chain_id: ChainId,
        dest_chain_id: ChainId,
    ) -> Result<Option<Address>, Error> {
        if !self.has_route(src_chain_id, dest_chain_id) {
            return Ok(None);
        }

        let mapping = self.tokens.iter().find(|mapping| {
            mapping
                .addresses
                .iter()
                .any(|ca| token.address_on(ca.chain_id) == Some(ca.address))
        });

        Ok(mapping.and_then(|mapping| {
            mapping
                .addresses
                .iter()
                .find(|ca| ca.chain_id == src_chain_id)
                .map(|ca| ca.address)
        }))
    }
}
