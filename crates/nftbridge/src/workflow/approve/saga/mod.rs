//! Approve Saga - Type State Pattern Implementation
//!
//! # Type State Flow
//!
//! ```text
//! ApproveSaga<Initial>
//!   └─> prepare() -> ApproveSaga<Prepared>
//!         └─> submit() -> Option<TxHash>
//! ```
//!
//! Nothing observable happens before `submit()` reaches the bridge service, so a failure in
//! `prepare()` needs no rollback.

use alloy_primitives::TxHash;
use tracing::instrument;

use self::state::{Initial, Prepared};
use crate::types::{ApprovalArgs, TokenStandard};
use crate::workflow::components::Notification;
use crate::workflow::Workflow;
use crate::{ensure_bridge, Error};

pub mod state;

/// Saga for a vault approval
pub struct ApproveSaga<S> {
    /// Workflow reference
    workflow: Workflow,
    /// State-specific data
    state_data: S,
}

impl ApproveSaga<Initial> {
    /// Create a new approve saga in the Initial state.
    pub fn new(workflow: Workflow) -> Self {
        Self {
            workflow,
            state_data: Initial {
                operation_id: uuid::Uuid::new_v4(),
            },
        }
    }

    /// Read the selection and build the approval.
    ///
    /// 1. Checks token, network and destination are set
    /// 2. Collects token ids (manual ids first, else the selected NFTs)
    /// 3. Resolves the token address on the source chain
    /// 4. Picks the vault for the token standard
    /// 5. Obtains the signer
    #[instrument(skip_all)]
    pub async fn prepare(self) -> Result<ApproveSaga<Prepared>, Error> {
        let (token, src_chain_id, dest_chain_id, token_ids, epoch) = {
            let ctx = self.workflow.context.lock().await;
            let token = ctx
                .selected_token
                .clone()
                .ok_or(Error::PreconditionNotMet("selected token"))?;
            let src_chain_id = ctx.network.ok_or(Error::PreconditionNotMet("network"))?;
            let dest_chain_id = ctx
                .destination
                .ok_or(Error::PreconditionNotMet("destination chain"))?;

            (token, src_chain_id, dest_chain_id, ctx.token_ids(), ctx.epoch)
        };

        ensure_bridge!(
            token.standard != TokenStandard::Native,
            Error::ApprovalNotRequired
        );
        ensure_bridge!(
            token.standard.is_fungible() || !token_ids.is_empty(),
            Error::PreconditionNotMet("token ids")
        );

        let service = self
            .workflow
            .services
            .bridges
            .for_standard(token.standard)
            .ok_or(Error::NoBridgeService(token.standard))?;

        tracing::info!(
            "Preparing approval of {} {:?} on {} -> {} with operation {}",
            token.symbol,
            token_ids,
            src_chain_id,
            dest_chain_id,
            self.state_data.operation_id
        );

        let token_address = self
            .workflow
            .resolver
            .resolve_token_address(&token, src_chain_id, dest_chain_id)
            .await?;

        let spender = self
            .workflow
            .config
            .spender(token.standard, src_chain_id, dest_chain_id)?;

        let signer = self.workflow.services.wallet.signer(src_chain_id).await?;

        tracing::debug!("Approving {} for spender {}", token_address, spender);

        Ok(ApproveSaga {
            workflow: self.workflow,
            state_data: Prepared {
                operation_id: self.state_data.operation_id,
                epoch,
                token,
                src_chain_id,
                service,
                args: ApprovalArgs {
                    token_ids,
                    token_address,
                    spender,
                    signer,
                },
            },
        })
    }
}

impl ApproveSaga<Prepared> {
    /// Approval arguments
    pub fn args(&self) -> &ApprovalArgs {
        &self.state_data.args
    }

    /// Submit the approval and follow up on the hash.
    ///
    /// A zero hash means the service submitted nothing; no follow up happens. Otherwise the
    /// hash is tracked as pending, the actions panel re-checks the approval, and the user is
    /// notified. Follow ups touching components are skipped if the form was reset meanwhile.
    #[instrument(skip_all)]
    pub async fn submit(self) -> Result<Option<TxHash>, Error> {
        let Prepared {
            operation_id,
            epoch,
            token,
            src_chain_id,
            service,
            args,
        } = self.state_data;

        let hash = service.approve(args).await?;

        if hash == TxHash::ZERO {
            tracing::warn!("Approval {} returned no transaction hash", operation_id);
            return Ok(None);
        }

        tracing::info!("Approval {} submitted as {}", operation_id, hash);

        let components = self.workflow.components_for(epoch).await;
        let link = self.workflow.config.explorer_tx_url(src_chain_id, &hash);

        if let Some(components) = &components {
            components.notify(
                Notification::info(
                    "Approval submitted",
                    format!("Approving {} for bridging", token.symbol),
                )
                .with_link(link.clone()),
            );
        }

        self.workflow.recorder.track(src_chain_id, hash).await;

        if let Some(components) = &components {
            if let Some(actions) = &components.actions {
                if let Err(err) = actions.check_approval().await {
                    tracing::warn!("Approval re-check failed: {}", err);
                }
            }

            components.notify(
                Notification::success("Approval confirmed", format!("{} approved", token.symbol))
                    .with_link(link),
            );
        }

        Ok(Some(hash))
    }
}
