//! Errors

use thiserror::Error;

use crate::database;
use crate::types::ChainId;

/// How an [`Error`] is surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required selection, network or account is absent. Silent, "not ready yet".
    PreconditionNotMet,
    /// No address found for the token or vault on the chain pair. User visible.
    AddressResolution,
    /// Wallet rejection, RPC failure or reverted transaction. User visible.
    Submission,
    /// Manual import lookup or selection validation failed. Logged only.
    Lookup,
    /// Local transaction log failure. User visible.
    Database,
}

/// Bridge Error
#[derive(Debug, Error)]
pub enum Error {
    /// A required input is not set
    #[error("Precondition not met: `{0}` is not set")]
    PreconditionNotMet(&'static str),
    /// Token standard needs no approval
    #[error("Approval not required for native token")]
    ApprovalNotRequired,
    /// No bridge service registered for token standard
    #[error("No bridge service for `{0}`")]
    NoBridgeService(crate::types::TokenStandard),
    /// Token address could not be resolved
    #[error("Token address not found for `{symbol}` on chain pair {src_chain_id} -> {dest_chain_id}")]
    TokenAddressNotFound {
        /// Token symbol
        symbol: String,
        /// Source chain
        src_chain_id: ChainId,
        /// Destination chain
        dest_chain_id: ChainId,
    },
    /// No vault configured for chain pair
    #[error("No vault configured for chain pair {0} -> {1}")]
    VaultNotConfigured(ChainId, ChainId),
    /// Wallet refused to sign
    #[error("Wallet rejected request: {0}")]
    WalletRejected(String),
    /// Transaction could not be submitted or reverted
    #[error("Transaction submission failed: {0}")]
    Submission(String),
    /// Bridge service returned a zero hash
    #[error("Bridge service returned an empty transaction hash")]
    EmptyTransactionHash,
    /// Scan service failed
    #[error("NFT scan failed: {0}")]
    Scan(String),
    /// Metadata lookup failed
    #[error("NFT lookup failed: {0}")]
    Lookup(String),
    /// Metadata service found nothing for the contract and id
    #[error("NFT not found")]
    NftNotFound,
    /// Contract address input could not be parsed
    #[error("Invalid contract address `{0}`")]
    InvalidContractAddress(String),
    /// NFT import while the workflow bridges fungible tokens
    #[error("NFT import is not available for fungible bridging")]
    NotNftBridge,
    /// Selected NFTs belong to different contracts
    #[error("Selected NFTs belong to different contracts")]
    MixedContracts,
    /// Database Error
    #[error(transparent)]
    Database(#[from] database::Error),
    /// Custom Error
    #[error("`{0}`")]
    Custom(String),
}

impl Error {
    /// Classification used by the shared error handler
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PreconditionNotMet(_) | Self::ApprovalNotRequired | Self::NoBridgeService(_) => {
                ErrorKind::PreconditionNotMet
            }
            Self::TokenAddressNotFound { .. } | Self::VaultNotConfigured(..) => {
                ErrorKind::AddressResolution
            }
            Self::WalletRejected(_)
            | Self::Submission(_)
            | Self::EmptyTransactionHash
            | Self::Custom(_) => ErrorKind::Submission,
            Self::Scan(_)
            | Self::Lookup(_)
            | Self::NftNotFound
            | Self::InvalidContractAddress(_)
            | Self::NotNftBridge
            | Self::MixedContracts => ErrorKind::Lookup,
            Self::Database(_) => ErrorKind::Database,
        }
    }

    /// Whether the error should reach the user
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AddressResolution | ErrorKind::Submission | ErrorKind::Database
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenStandard;

    #[test]
    fn test_precondition_errors_are_silent() {
        assert!(!Error::PreconditionNotMet("destination").is_user_visible());
        assert!(!Error::ApprovalNotRequired.is_user_visible());
        assert!(!Error::NoBridgeService(TokenStandard::Erc721).is_user_visible());
    }

    #[test]
    fn test_lookup_errors_are_not_surfaced() {
        assert_eq!(Error::NftNotFound.kind(), ErrorKind::Lookup);
        assert!(!Error::InvalidContractAddress("0xzz".into()).is_user_visible());
    }

    #[test]
    fn test_resolution_and_submission_are_visible() {
        let err = Error::TokenAddressNotFound {
            symbol: "PUNK".into(),
            src_chain_id: 1,
            dest_chain_id: 10,
        };
        assert_eq!(err.kind(), ErrorKind::AddressResolution);
        assert!(err.is_user_visible());
        assert!(Error::WalletRejected("user denied".into()).is_user_visible());
        assert_eq!(Error::VaultNotConfigured(1, 10).kind(), ErrorKind::AddressResolution);
    }
}
