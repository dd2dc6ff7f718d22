//! NFT Bridge Kit
//!
//! Workflow state machine and transaction orchestration for moving NFTs (and fungible tokens)
//! from a source chain to a destination chain through a vault-based bridge.
//!
//! The crate owns the workflow state (step, selected token, selected NFTs) and drives a set of
//! external collaborators defined in [`services`] and [`database`]: wallet signing, cross-chain
//! address lookup, NFT scanning, NFT metadata lookup, bridge submission, pending transaction
//! tracking and the per-address transaction log.
//!
//! Start with [`Workflow::new`].

#![warn(missing_docs)]
#![warn(rustdoc::bare_urls)]

pub mod config;
pub mod database;
pub mod error;
pub mod resolver;
pub mod services;
pub mod types;
pub mod util;
pub mod workflow;

pub use alloy_primitives::{Address, TxHash, U256};

#[doc(hidden)]
pub use self::config::BridgeConfig;
#[doc(hidden)]
pub use self::error::{Error, ErrorKind};
#[doc(hidden)]
pub use self::types::{
    ApprovalArgs, BridgeArgs, BridgeArgsBuilder, BridgeTransactionRecord, BridgeType, ChainId,
    Nft, SignerHandle, Token, TokenStandard, TransactionStatus,
};
#[doc(hidden)]
pub use self::workflow::{ImportMethod, Outcome, Workflow, WorkflowContext, WorkflowStep};

/// Return early with an error if the condition does not hold
#[macro_export]
macro_rules! ensure_bridge {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}
