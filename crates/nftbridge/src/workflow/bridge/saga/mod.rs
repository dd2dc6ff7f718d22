//! Bridge Saga - Type State Pattern Implementation
//!
//! # Type State Flow
//!
//! ```text
//! BridgeSaga<Initial>
//!   └─> prepare() -> BridgeSaga<Prepared>
//!         └─> submit() -> BridgeSaga<Submitted>
//!               └─> finalize() -> TxHash
//! ```
//!
//! Once `submit()` succeeds the transaction is on chain and cannot be compensated. Failures
//! after that point (pending tracker, transaction log) are reported but never undo the step
//! advance, otherwise a retry would bridge the same tokens twice.

use alloy_primitives::{Address, TxHash, U256};
use tracing::instrument;

use self::state::{Initial, Prepared, Selection, Submitted};
use crate::types::{BridgeArgs, BridgeArgsBuilder, BridgeTransactionRecord, TokenStandard};
use crate::workflow::components::Notification;
use crate::workflow::Workflow;
use crate::{ensure_bridge, Error};

pub mod state;

/// Saga for a bridge submission
pub struct BridgeSaga<S> {
    /// Workflow reference
    workflow: Workflow,
    /// State-specific data
    state_data: S,
}

impl BridgeSaga<Initial> {
    /// Create a new bridge saga in the Initial state.
    pub fn new(workflow: Workflow) -> Self {
        Self {
            workflow,
            state_data: Initial {
                operation_id: uuid::Uuid::new_v4(),
            },
        }
    }

    /// Read the selection and build the bridge arguments.
    ///
    /// 1. Checks token, network, destination, account and fee are set
    /// 2. Defaults the recipient to the connected account
    /// 3. Collects token ids and per-standard amounts
    /// 4. Resolves the token address on the source chain
    /// 5. Obtains the signer and builds [`BridgeArgs`]
    #[instrument(skip_all)]
    pub async fn prepare(self) -> Result<BridgeSaga<Prepared>, Error> {
        let Selection {
            token,
            src_chain_id,
            dest_chain_id,
            sender,
            recipient,
            fee,
            ids,
            amounts,
            amount,
            epoch,
        } = self.selection().await?;

        let service = self
            .workflow
            .services
            .bridges
            .for_standard(token.standard)
            .ok_or(Error::NoBridgeService(token.standard))?;

        ensure_bridge!(
            token.standard.is_fungible() || !ids.is_empty(),
            Error::PreconditionNotMet("token ids")
        );

        tracing::info!(
            "Preparing bridge of {} {:?} from {} to {} with operation {}",
            token.symbol,
            ids,
            src_chain_id,
            dest_chain_id,
            self.state_data.operation_id
        );

        let token_address = match token.standard {
            TokenStandard::Native => Address::ZERO,
            _ => {
                self.workflow
                    .resolver
                    .resolve_token_address(&token, src_chain_id, dest_chain_id)
                    .await?
            }
        };

        let signer = self.workflow.services.wallet.signer(src_chain_id).await?;

        let args = BridgeArgsBuilder::default()
            .to(recipient)
            .signer(signer)
            .chains(src_chain_id, dest_chain_id)
            .fee(fee)
            .token_address(token_address)
            .token_ids(ids)
            .amounts(amounts)
            .build()?;

        Ok(BridgeSaga {
            workflow: self.workflow,
            state_data: Prepared {
                operation_id: self.state_data.operation_id,
                epoch,
                token,
                sender,
                amount,
                service,
                args,
            },
        })
    }
}

impl BridgeSaga<Initial> {
    /// Snapshot the form, failing on the first missing input before any collaborator is called
    async fn selection(&self) -> Result<Selection, Error> {
        let ctx = self.workflow.context.lock().await;
        let token = ctx
            .selected_token
            .clone()
            .ok_or(Error::PreconditionNotMet("selected token"))?;
        let src_chain_id = ctx.network.ok_or(Error::PreconditionNotMet("network"))?;
        let dest_chain_id = ctx
            .destination
            .ok_or(Error::PreconditionNotMet("destination chain"))?;
        let sender = ctx.account.ok_or(Error::PreconditionNotMet("account"))?;
        let fee = ctx.fee.ok_or(Error::PreconditionNotMet("fee"))?;
        let recipient = ctx.recipient.unwrap_or(sender);

        let (ids, amounts, amount) = match token.standard {
            TokenStandard::Erc721 => {
                let ids = ctx.token_ids();
                let count = U256::from(ids.len());
                (ids, vec![], count)
            }
            TokenStandard::Erc1155 => {
                let ids = ctx.token_ids();
                let amounts: Vec<U256> = ids.iter().map(|id| ctx.quantity_of(*id)).collect();
                let total = amounts
                    .iter()
                    .fold(U256::ZERO, |acc, quantity| acc.saturating_add(*quantity));
                (ids, amounts, total)
            }
            TokenStandard::Native | TokenStandard::Erc20 => {
                let amount = ctx.amount.ok_or(Error::PreconditionNotMet("amount"))?;
                (vec![], vec![amount], amount)
            }
        };

        Ok(Selection {
            token,
            src_chain_id,
            dest_chain_id,
            sender,
            recipient,
            fee,
            ids,
            amounts,
            amount,
            epoch: ctx.epoch,
        })
    }
}

impl BridgeSaga<Prepared> {
    /// Bridge arguments
    pub fn args(&self) -> &BridgeArgs {
        &self.state_data.args
    }

    /// Submit the bridge transaction.
    ///
    /// On success the hash is tracked as pending and the user notified.
    #[instrument(skip_all)]
    pub async fn submit(self) -> Result<BridgeSaga<Submitted>, Error> {
        let Prepared {
            operation_id,
            epoch,
            token,
            sender,
            amount,
            service,
            args,
        } = self.state_data;

        let src_chain_id = args.src_chain_id;
        let dest_chain_id = args.dest_chain_id;

        let hash = service.bridge(args).await?;
        ensure_bridge!(hash != TxHash::ZERO, Error::EmptyTransactionHash);

        tracing::info!("Bridge {} submitted as {}", operation_id, hash);

        let components = self.workflow.components_for(epoch).await;
        let link = self.workflow.config.explorer_tx_url(src_chain_id, &hash);

        if let Some(components) = &components {
            components.notify(
                Notification::info(
                    "Bridge submitted",
                    format!("Bridging {} to chain {}", token.symbol, dest_chain_id),
                )
                .with_link(link.clone()),
            );
        }

        self.workflow.recorder.track(src_chain_id, hash).await;

        if let Some(components) = &components {
            components.notify(
                Notification::success(
                    "Bridge transaction sent",
                    format!("{} is on its way to chain {}", token.symbol, dest_chain_id),
                )
                .with_link(link),
            );
        }

        let record =
            BridgeTransactionRecord::new(hash, sender, amount, &token, src_chain_id, dest_chain_id);

        Ok(BridgeSaga {
            workflow: self.workflow,
            state_data: Submitted {
                operation_id,
                epoch,
                sender,
                record,
            },
        })
    }
}

impl BridgeSaga<Submitted> {
    /// Hash of the submitted transaction
    pub fn hash(&self) -> TxHash {
        self.state_data.record.hash
    }

    /// Record the transaction and advance the workflow.
    ///
    /// The step only advances if the form was not reset while the transaction was in flight.
    #[instrument(skip_all)]
    pub async fn finalize(self) -> TxHash {
        let Submitted {
            operation_id,
            epoch,
            sender,
            record,
        } = self.state_data;
        let hash = record.hash;

        if let Err(err) = self.workflow.recorder.add_record(sender, record).await {
            tracing::error!(
                "Bridge {} submitted as {} but could not be recorded: {}",
                operation_id,
                hash,
                err
            );
            if let Some(components) = self.workflow.components_for(epoch).await {
                components.notify(Notification::error(
                    "Transaction history",
                    format!("Could not save {hash} to history: {err}"),
                ));
            }
        }

        let mut ctx = self.workflow.context.lock().await;
        if ctx.epoch == epoch {
            ctx.step = ctx.step.next();
        } else {
            tracing::debug!("Form reset during bridge {}, not advancing", operation_id);
        }

        hash
    }
}
