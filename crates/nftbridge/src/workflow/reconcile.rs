//! Network and account change reconciliation
//!
//! Only synchronous state writes happen here, no collaborator is called.

use alloy_primitives::Address;
use tracing::instrument;

use super::{ImportMethod, Workflow};
use crate::types::ChainId;

impl Workflow {
    /// React to the wallet switching network
    ///
    /// In scan mode the form is reset (scan results belong to the old network), otherwise the
    /// form is re-validated. The destination is then normalized:
    /// - new source equal to the destination swaps the pair, the destination becomes the old
    ///   source
    /// - a route from the new source to the destination keeps it
    /// - no route clears it
    #[instrument(skip(self))]
    pub async fn on_network_change(
        &self,
        new_network: Option<ChainId>,
        old_network: Option<ChainId>,
    ) {
        let mut ctx = self.context.lock().await;
        ctx.network = new_network;

        if ctx.import_method == ImportMethod::Scan {
            ctx.reset_form();
        } else {
            ctx.components.validate_form();
        }

        let Some(destination) = ctx.destination else {
            return;
        };
        let Some(source) = new_network else {
            return;
        };

        if source == destination {
            tracing::debug!(
                "Source switched to destination {}, swapping to {:?}",
                destination,
                old_network
            );
            ctx.destination = old_network;
        } else if self.config.has_route(source, destination) {
            ctx.destination = Some(destination);
        } else {
            tracing::debug!("No route {} -> {}, clearing destination", source, destination);
            ctx.destination = None;
        }
    }

    /// React to the connected account changing
    ///
    /// A disconnect clears the selection and the destination. Approvals and bridges still in
    /// flight settle without notifying or writing state.
    #[instrument(skip(self))]
    pub async fn on_account_change(&self, account: Option<Address>) {
        let mut ctx = self.context.lock().await;
        ctx.account = account;

        if account.is_none() {
            tracing::debug!("Account disconnected, clearing selection");
            ctx.selected_token = None;
            ctx.selected_nfts.clear();
            ctx.destination = None;
            ctx.invalidate();
        }

        ctx.components.update_actions();
    }
}
