//! Bridge types

use std::collections::HashMap;
use std::fmt;

use alloy_primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

use crate::util::unix_time_ms;
use crate::Error;

/// Chain identifier
pub type ChainId = u64;

/// Token standard discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenStandard {
    /// Chain native currency
    Native,
    /// Fungible ERC20
    Erc20,
    /// Non-fungible ERC721
    Erc721,
    /// Multi-token ERC1155
    Erc1155,
}

impl TokenStandard {
    /// Non-fungible standard
    pub fn is_nft(&self) -> bool {
        matches!(self, Self::Erc721 | Self::Erc1155)
    }

    /// Fungible standard
    pub fn is_fungible(&self) -> bool {
        !self.is_nft()
    }
}

impl fmt::Display for TokenStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "NATIVE"),
            Self::Erc20 => write!(f, "ERC20"),
            Self::Erc721 => write!(f, "ERC721"),
            Self::Erc1155 => write!(f, "ERC1155"),
        }
    }
}

/// Which kind of asset the workflow is bridging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeType {
    /// Native or ERC20
    Fungible,
    /// ERC721 or ERC1155
    #[default]
    Nft,
}

/// Token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Symbol
    pub symbol: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Decimals, fungible tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    /// Contract address per chain
    #[serde(default)]
    pub addresses: HashMap<ChainId, Address>,
    /// Standard
    pub standard: TokenStandard,
}

impl Token {
    /// Create a token deployed at `address` on `chain_id`
    pub fn new(
        symbol: impl Into<String>,
        standard: TokenStandard,
        chain_id: ChainId,
        address: Address,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            decimals: None,
            addresses: HashMap::from([(chain_id, address)]),
            standard,
        }
    }

    /// Contract address on chain
    pub fn address_on(&self, chain_id: ChainId) -> Option<Address> {
        self.addresses.get(&chain_id).copied()
    }

    /// Same standard and deployments, ignoring display metadata
    pub fn same_contract(&self, other: &Token) -> bool {
        self.standard == other.standard && self.addresses == other.addresses
    }
}

/// Non-fungible token with a concrete id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nft {
    /// Collection token
    pub token: Token,
    /// Token id
    pub token_id: U256,
    /// Quantity held, ERC1155 only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<U256>,
    /// Item name from metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Image uri from metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Nft {
    /// Create an nft of `token` with `token_id`
    pub fn new(token: Token, token_id: U256) -> Self {
        Self {
            token,
            token_id,
            quantity: None,
            name: None,
            image: None,
        }
    }

    /// Standard of the collection
    pub fn standard(&self) -> TokenStandard {
        self.token.standard
    }
}

/// Status of a recorded bridge transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    /// Submitted on the source chain
    #[default]
    New,
    /// Message observed, awaiting delivery
    Pending,
    /// Delivered on the destination chain
    Completed,
    /// Failed
    Failed,
}

/// Handle to the connected wallet's signer for one chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignerHandle {
    /// Chain the signer is bound to
    pub chain_id: ChainId,
    /// Signing address
    pub address: Address,
}

/// Arguments of a vault approval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalArgs {
    /// Token ids to approve, empty for fungible tokens
    pub token_ids: Vec<U256>,
    /// Token contract on the source chain
    pub token_address: Address,
    /// Vault allowed to move the tokens
    pub spender: Address,
    /// Signer
    pub signer: SignerHandle,
}

/// Arguments of a bridge submission
///
/// Only obtainable through [`BridgeArgsBuilder::build`], which refuses to produce a value with
/// any field missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeArgs {
    /// Recipient on the destination chain
    pub to: Address,
    /// Signer on the source chain
    pub signer: SignerHandle,
    /// Source chain
    pub src_chain_id: ChainId,
    /// Destination chain
    pub dest_chain_id: ChainId,
    /// Bridge fee
    pub fee: U256,
    /// Token contract on the source chain
    pub token_address: Address,
    /// Token ids, empty for fungible tokens
    pub token_ids: Vec<U256>,
    /// Amount per token id for ERC1155, single amount for fungible, empty for ERC721
    pub amounts: Vec<U256>,
}

/// Builder for [`BridgeArgs`]
#[derive(Debug, Clone, Default)]
pub struct BridgeArgsBuilder {
    to: Option<Address>,
    signer: Option<SignerHandle>,
    src_chain_id: Option<ChainId>,
    dest_chain_id: Option<ChainId>,
    fee: Option<U256>,
    token_address: Option<Address>,
    token_ids: Vec<U256>,
    amounts: Vec<U256>,
}

impl BridgeArgsBuilder {
    /// Recipient
    pub fn to(mut self, to: Address) -> Self {
        self.to = Some(to);
        self
    }

    /// Signer
    pub fn signer(mut self, signer: SignerHandle) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Chain pair
    pub fn chains(mut self, src_chain_id: ChainId, dest_chain_id: ChainId) -> Self {
        self.src_chain_id = Some(src_chain_id);
        self.dest_chain_id = Some(dest_chain_id);
        self
    }

    /// Fee
    pub fn fee(mut self, fee: U256) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Token contract
    pub fn token_address(mut self, token_address: Address) -> Self {
        self.token_address = Some(token_address);
        self
    }

    /// Token ids
    pub fn token_ids(mut self, token_ids: Vec<U256>) -> Self {
        self.token_ids = token_ids;
        self
    }

    /// Amounts
    pub fn amounts(mut self, amounts: Vec<U256>) -> Self {
        self.amounts = amounts;
        self
    }

    /// Build the arguments, failing on the first missing field
    pub fn build(self) -> Result<BridgeArgs, Error> {
        Ok(BridgeArgs {
            to: self.to.ok_or(Error::PreconditionNotMet("recipient"))?,
            signer: self.signer.ok_or(Error::PreconditionNotMet("signer"))?,
            src_chain_id: self
                .src_chain_id
                .ok_or(Error::PreconditionNotMet("source chain"))?,
            dest_chain_id: self
                .dest_chain_id
                .ok_or(Error::PreconditionNotMet("destination chain"))?,
            fee: self.fee.ok_or(Error::PreconditionNotMet("fee"))?,
            token_address: self
                .token_address
                .ok_or(Error::PreconditionNotMet("token address"))?,
            token_ids: self.token_ids,
            amounts: self.amounts,
        })
    }
}

/// Local record of a bridge submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeTransactionRecord {
    /// Source chain transaction hash
    pub hash: TxHash,
    /// Sender
    pub from_address: Address,
    /// Amount bridged (token count for NFTs)
    pub amount: U256,
    /// Token symbol
    pub symbol: String,
    /// Token decimals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
    /// Source chain
    pub src_chain_id: ChainId,
    /// Destination chain
    pub dest_chain_id: ChainId,
    /// Token standard
    pub token_type: TokenStandard,
    /// Status
    pub status: TransactionStatus,
    /// Creation time in unix millis
    pub timestamp: u64,
}

impl BridgeTransactionRecord {
    /// New record with status [`TransactionStatus::New`] stamped now
    pub fn new(
        hash: TxHash,
        from_address: Address,
        amount: U256,
        token: &Token,
        src_chain_id: ChainId,
        dest_chain_id: ChainId,
    ) -> Self {
        Self {
            hash,
            from_address,
            amount,
            symbol: token.symbol.clone(),
            decimals: token.decimals,
            src_chain_id,
            dest_chain_id,
            token_type: token.standard,
            status: TransactionStatus::New,
            timestamp: unix_time_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    const COLLECTION: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
    const HOLDER: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

    fn signer() -> SignerHandle {
        SignerHandle {
            chain_id: 1,
            address: HOLDER,
        }
    }

    #[test]
    fn test_bridge_args_require_every_field() {
        let missing_fee = BridgeArgsBuilder::default()
            .to(HOLDER)
            .signer(signer())
            .chains(1, 10)
            .token_address(COLLECTION)
            .build();
        assert!(matches!(
            missing_fee,
            Err(Error::PreconditionNotMet("fee"))
        ));

        let missing_recipient = BridgeArgsBuilder::default()
            .signer(signer())
            .chains(1, 10)
            .fee(U256::ZERO)
            .token_address(COLLECTION)
            .build();
        assert!(matches!(
            missing_recipient,
            Err(Error::PreconditionNotMet("recipient"))
        ));
    }

    #[test]
    fn test_bridge_args_build() {
        let args = BridgeArgsBuilder::default()
            .to(HOLDER)
            .signer(signer())
            .chains(1, 10)
            .fee(U256::from(21_000u64))
            .token_address(COLLECTION)
            .token_ids(vec![U256::from(7u64)])
            .build()
            .unwrap();

        assert_eq!(args.src_chain_id, 1);
        assert_eq!(args.dest_chain_id, 10);
        assert_eq!(args.token_ids, vec![U256::from(7u64)]);
        assert!(args.amounts.is_empty());
    }

    #[test]
    fn test_token_ids_keep_full_width() {
        let id = U256::MAX - U256::from(1u64);
        let nft = Nft::new(Token::new("BIG", TokenStandard::Erc721, 1, COLLECTION), id);
        assert_eq!(nft.token_id, id);
    }

    #[test]
    fn test_record_serializes_status_new() {
        let token = Token::new("PUNK", TokenStandard::Erc1155, 1, COLLECTION);
        let record = BridgeTransactionRecord::new(
            TxHash::repeat_byte(0xab),
            HOLDER,
            U256::from(2u64),
            &token,
            1,
            10,
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "NEW");
        assert_eq!(json["token_type"], "ERC1155");
        assert_eq!(json["src_chain_id"], 1);

        let decoded: BridgeTransactionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, record);
    }
}
