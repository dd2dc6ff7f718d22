//! Bridge submission

use tracing::instrument;

use super::{Outcome, Workflow};

pub mod saga;

use saga::BridgeSaga;

impl Workflow {
    /// Submit the bridge transaction for the selected tokens
    ///
    /// On success the transaction is recorded in the sender's history and the workflow advances
    /// one step. Never fails: missing inputs are a silent [`Outcome::Skipped`], other errors go
    /// through the shared handler and leave the workflow on the same step for a retry.
    #[instrument(skip(self))]
    pub async fn bridge(&self) -> Outcome {
        let saga = BridgeSaga::new(self.clone());

        let submitted = match saga.prepare().await {
            Ok(prepared) => prepared.submit().await,
            Err(err) => Err(err),
        };

        match submitted {
            Ok(submitted) => Outcome::Submitted(submitted.finalize().await),
            Err(err) => self.handle_error("Bridge", err).await,
        }
    }
}
