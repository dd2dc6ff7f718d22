//! State types for the Approve saga.
//!
//! Each state is a distinct type that holds the data relevant to that stage
//! of the approval. Only the operations valid at a stage exist on its type.

use std::sync::Arc;

use uuid::Uuid;

use crate::services::BridgeService;
use crate::types::{ApprovalArgs, ChainId, Token};

/// Initial state - operation ID assigned but nothing read yet.
///
/// Only `prepare()` is available.
pub struct Initial {
    /// Operation identifier for log correlation
    pub operation_id: Uuid,
}

/// Prepared state - addresses resolved and signer obtained.
///
/// Methods available: `submit()`
pub struct Prepared {
    /// Operation identifier
    pub operation_id: Uuid,
    /// Form epoch the approval was prepared against
    pub epoch: u64,
    /// Token being approved
    pub token: Token,
    /// Source chain
    pub src_chain_id: ChainId,
    /// Service for the token standard
    pub service: Arc<dyn BridgeService>,
    /// Approval arguments
    pub args: ApprovalArgs,
}
