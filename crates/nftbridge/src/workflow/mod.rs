//! Bridge workflow
//!
//! A [`Workflow`] owns the state of one bridging session: the current step, the selected token
//! and NFTs, the form inputs and the chain pair. Network and account changes are translated
//! into state writes by [`reconcile`](Workflow::on_network_change), NFTs enter through
//! [`scan`](Workflow::scan) or [`manual_lookup`](Workflow::manual_lookup), and the on-chain part
//! runs as two sagas, [`approve`](Workflow::approve) and [`bridge`](Workflow::bridge).
//!
//! # Steps
//!
//! ```text
//! Import ─advance─> Review ─advance─> Confirm
//!        <─retreat─        <─retreat─
//! ```
//!
//! # Concurrency
//!
//! State lives behind a single async mutex that is never held across a collaborator call.
//! Every form reset bumps an epoch; results of a call that started before the reset are
//! dropped instead of being applied to the new form.

use std::fmt;
use std::sync::Arc;

use alloy_primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::config::BridgeConfig;
use crate::resolver::TokenResolver;
use crate::services::Services;
use crate::types::{BridgeType, ChainId, Nft, Token};
use crate::{Error, ErrorKind};

pub mod approve;
pub mod bridge;
pub mod components;
mod import;
mod reconcile;
pub mod recorder;

use self::components::{ComponentRegistry, Notification};
use self::recorder::TransactionRecorder;

/// Workflow step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkflowStep {
    /// Pick the NFTs to bridge
    #[default]
    Import,
    /// Review selection and approve the vault
    Review,
    /// Bridge submitted
    Confirm,
}

impl WorkflowStep {
    /// Next step, saturating at [`WorkflowStep::Confirm`]
    pub fn next(self) -> Self {
        match self {
            Self::Import => Self::Review,
            Self::Review | Self::Confirm => Self::Confirm,
        }
    }

    /// Previous step, saturating at [`WorkflowStep::Import`]
    pub fn previous(self) -> Self {
        match self {
            Self::Import | Self::Review => Self::Import,
            Self::Confirm => Self::Review,
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            Self::Import => "Import",
            Self::Review => "Review",
            Self::Confirm => "Confirm",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How NFTs are imported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportMethod {
    /// Scan the connected wallet
    #[default]
    Scan,
    /// Enter contract and token id
    Manual,
}

/// Wallet scan progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    /// Scan in flight
    pub scanning: bool,
    /// A scan has finished, successfully or not
    pub scanned: bool,
    /// NFTs found
    pub found: Vec<Nft>,
}

/// Result of an approve or bridge call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Transaction submitted
    Submitted(TxHash),
    /// Not ready, nothing happened
    Skipped,
    /// Failed and reported
    Failed(ErrorKind),
}

impl Outcome {
    /// Hash of the submitted transaction
    pub fn hash(&self) -> Option<TxHash> {
        match self {
            Self::Submitted(hash) => Some(*hash),
            _ => None,
        }
    }
}

/// Workflow state
#[derive(Clone, Default)]
pub struct WorkflowContext {
    /// Current step
    pub step: WorkflowStep,
    /// Fungible or NFT bridging, NFT import is rejected while fungible
    pub bridge_type: BridgeType,
    /// Import method
    pub import_method: ImportMethod,
    /// Connected source network
    pub network: Option<ChainId>,
    /// Connected account
    pub account: Option<Address>,
    /// Destination chain
    pub destination: Option<ChainId>,
    /// Selected token
    pub selected_token: Option<Token>,
    /// Selected NFTs
    pub selected_nfts: Vec<Nft>,
    /// Manually entered token ids
    pub token_ids: Vec<U256>,
    /// Manually entered contract address
    pub contract_address: String,
    /// Explicit recipient
    pub recipient: Option<Address>,
    /// Fungible amount
    pub amount: Option<U256>,
    /// Bridge fee
    pub fee: Option<U256>,
    /// Scan progress
    pub scan: ScanState,
    /// Import step complete
    pub can_proceed: bool,
    epoch: u64,
    components: ComponentRegistry,
}

impl WorkflowContext {
    /// Clear all form state
    ///
    /// Idempotent. The form panel is cleared only if mounted.
    fn reset_form(&mut self) {
        self.selected_token = None;
        self.selected_nfts.clear();
        self.token_ids.clear();
        self.contract_address.clear();
        self.recipient = None;
        self.amount = None;
        self.fee = None;
        self.scan = ScanState::default();
        self.can_proceed = false;
        self.invalidate();
        self.components.clear_form();
    }

    /// Drop the results of every call still in flight
    fn invalidate(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Manual ids if any were entered, else the ids of the selected NFTs
    fn token_ids(&self) -> Vec<U256> {
        if !self.token_ids.is_empty() {
            return self.token_ids.clone();
        }
        self.selected_nfts.iter().map(|nft| nft.token_id).collect()
    }

    /// Quantity of `token_id` among the selected NFTs, one if unknown
    fn quantity_of(&self, token_id: U256) -> U256 {
        self.selected_nfts
            .iter()
            .find(|nft| nft.token_id == token_id)
            .and_then(|nft| nft.quantity)
            .unwrap_or(U256::from(1u64))
    }
}

impl fmt::Debug for WorkflowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowContext")
            .field("step", &self.step)
            .field("bridge_type", &self.bridge_type)
            .field("import_method", &self.import_method)
            .field("network", &self.network)
            .field("account", &self.account)
            .field("destination", &self.destination)
            .field(
                "selected_token",
                &self.selected_token.as_ref().map(|t| &t.symbol),
            )
            .field(
                "selected_nfts",
                &self
                    .selected_nfts
                    .iter()
                    .map(|n| n.token_id)
                    .collect::<Vec<_>>(),
            )
            .field("token_ids", &self.token_ids)
            .field("can_proceed", &self.can_proceed)
            .field("components", &self.components)
            .finish()
    }
}

/// Bridging session
#[derive(Clone)]
pub struct Workflow {
    context: Arc<Mutex<WorkflowContext>>,
    config: Arc<BridgeConfig>,
    services: Services,
    resolver: TokenResolver,
    recorder: TransactionRecorder,
}

impl Workflow {
    /// Create a workflow in the import step
    pub fn new(config: BridgeConfig, services: Services) -> Self {
        let resolver = TokenResolver::new(services.registry.clone());
        let recorder = TransactionRecorder::new(services.log.clone(), services.pending.clone());

        Self {
            context: Arc::new(Mutex::new(WorkflowContext::default())),
            config: Arc::new(config),
            services,
            resolver,
            recorder,
        }
    }

    /// Bridge configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Transaction recorder
    pub fn recorder(&self) -> &TransactionRecorder {
        &self.recorder
    }

    /// Snapshot of the current state
    pub async fn context(&self) -> WorkflowContext {
        self.context.lock().await.clone()
    }

    /// Current step
    pub async fn step(&self) -> WorkflowStep {
        self.context.lock().await.step
    }

    /// Label of the current step
    pub async fn step_label(&self) -> &'static str {
        self.step().await.label()
    }

    /// Attach dependent components
    pub async fn mount(&self, components: ComponentRegistry) {
        tracing::debug!("Mounting components {:?}", components);
        self.context.lock().await.components = components;
    }

    /// Reset the form and detach all components
    ///
    /// Calls still in flight settle without notifying or writing state.
    #[instrument(skip(self))]
    pub async fn teardown(&self) {
        let mut ctx = self.context.lock().await;
        ctx.reset_form();
        ctx.components = ComponentRegistry::default();
    }

    /// Move one step forward
    pub async fn advance(&self) -> WorkflowStep {
        let mut ctx = self.context.lock().await;
        ctx.step = ctx.step.next();
        ctx.step
    }

    /// Move one step back
    pub async fn retreat(&self) -> WorkflowStep {
        let mut ctx = self.context.lock().await;
        ctx.step = ctx.step.previous();
        ctx.step
    }

    /// Clear all form state, keeping the step
    pub async fn reset_form(&self) {
        self.context.lock().await.reset_form();
    }

    /// Switch between fungible and NFT bridging
    ///
    /// Always resets the form and returns to the import step.
    #[instrument(skip(self))]
    pub async fn switch_bridge_type(&self, bridge_type: BridgeType) {
        let mut ctx = self.context.lock().await;
        ctx.bridge_type = bridge_type;
        ctx.reset_form();
        ctx.step = WorkflowStep::Import;
    }

    /// Pick the destination chain
    pub async fn set_destination(&self, destination: Option<ChainId>) {
        self.context.lock().await.destination = destination;
    }

    /// Select a token directly (fungible bridging)
    pub async fn select_token(&self, token: Option<Token>) {
        self.context.lock().await.selected_token = token;
    }

    /// Explicit recipient, defaults to the connected account when unset
    pub async fn set_recipient(&self, recipient: Option<Address>) {
        self.context.lock().await.recipient = recipient;
    }

    /// Manually entered token ids
    pub async fn set_token_ids(&self, token_ids: Vec<U256>) {
        self.context.lock().await.token_ids = token_ids;
    }

    /// Manually entered contract address
    pub async fn set_contract_address(&self, contract_address: impl Into<String>) {
        self.context.lock().await.contract_address = contract_address.into();
    }

    /// Fungible amount
    pub async fn set_amount(&self, amount: Option<U256>) {
        self.context.lock().await.amount = amount;
    }

    /// Bridge fee from the fee estimator
    pub async fn set_fee(&self, fee: Option<U256>) {
        self.context.lock().await.fee = fee;
    }

    /// Components to notify, unless the form was reset after `epoch`
    async fn components_for(&self, epoch: u64) -> Option<ComponentRegistry> {
        let ctx = self.context.lock().await;
        (ctx.epoch == epoch).then(|| ctx.components.clone())
    }

    /// Shared error handler of the approve and bridge sagas
    ///
    /// Precondition failures are silent. Everything else is logged and, when a notifier is
    /// mounted, shown to the user. Workflow state is never touched.
    async fn handle_error(&self, action: &str, err: Error) -> Outcome {
        let kind = err.kind();

        if kind == ErrorKind::PreconditionNotMet {
            tracing::debug!("{} skipped: {}", action, err);
            return Outcome::Skipped;
        }

        tracing::error!("{} failed: {}", action, err);

        if err.is_user_visible() {
            let components = self.context.lock().await.components.clone();
            components.notify(Notification::error(format!("{action} failed"), err.to_string()));
        }

        Outcome::Failed(kind)
    }
}

impl fmt::Debug for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("config", &self.config)
            .field("services", &self.services)
            .finish_non_exhaustive()
    }
}
