//! State types for the Bridge saga.
//!
//! Each state is a distinct type that holds the data relevant to that stage
//! of the bridge submission. Only the operations valid at a stage exist on its type.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use uuid::Uuid;

use crate::services::BridgeService;
use crate::types::{BridgeArgs, BridgeTransactionRecord, ChainId, Token};

/// Initial state - operation ID assigned but nothing read yet.
///
/// Only `prepare()` is available.
pub struct Initial {
    /// Operation identifier for log correlation
    pub operation_id: Uuid,
}

/// Form inputs read under the lock in `prepare()`
pub(crate) struct Selection {
    pub token: Token,
    pub src_chain_id: ChainId,
    pub dest_chain_id: ChainId,
    pub sender: Address,
    pub recipient: Address,
    pub fee: U256,
    pub ids: Vec<U256>,
    pub amounts: Vec<U256>,
    /// Amount for the record
    pub amount: U256,
    pub epoch: u64,
}

/// Prepared state - bridge arguments fully built.
///
/// Methods available: `submit()`
pub struct Prepared {
    /// Operation identifier
    pub operation_id: Uuid,
    /// Form epoch the bridge was prepared against
    pub epoch: u64,
    /// Token being bridged
    pub token: Token,
    /// Connected account, owner of the log entry
    pub sender: Address,
    /// Amount for the record (token count for NFTs)
    pub amount: U256,
    /// Service for the token standard
    pub service: Arc<dyn BridgeService>,
    /// Bridge arguments
    pub args: BridgeArgs,
}

/// Submitted state - transaction accepted by the source chain.
///
/// Methods available: `finalize()`
pub struct Submitted {
    /// Operation identifier
    pub operation_id: Uuid,
    /// Form epoch the bridge was prepared against
    pub epoch: u64,
    /// Connected account, owner of the log entry
    pub sender: Address,
    /// Record to append
    pub record: BridgeTransactionRecord,
}
