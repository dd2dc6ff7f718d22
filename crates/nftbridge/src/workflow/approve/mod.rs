//! Vault approval

use tracing::instrument;

use super::{Outcome, Workflow};

pub mod saga;

use saga::ApproveSaga;

impl Workflow {
    /// Approve the vault of the chain pair to move the selected tokens
    ///
    /// Never fails: missing selection, network or destination is a silent [`Outcome::Skipped`];
    /// any other error goes through the shared handler and leaves the workflow where it was so
    /// the user can retry.
    #[instrument(skip(self))]
    pub async fn approve(&self) -> Outcome {
        let saga = ApproveSaga::new(self.clone());

        let result = match saga.prepare().await {
            Ok(prepared) => prepared.submit().await,
            Err(err) => Err(err),
        };

        match result {
            Ok(Some(hash)) => Outcome::Submitted(hash),
            Ok(None) => Outcome::Skipped,
            Err(err) => self.handle_error("Approval", err).await,
        }
    }
}
