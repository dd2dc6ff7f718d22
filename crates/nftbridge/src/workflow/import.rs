//! NFT import
//!
//! Scan and manual entry are mutually exclusive: switching between them always resets the form.

use std::str::FromStr;

use alloy_primitives::{Address, U256};
use tracing::instrument;

use super::{ImportMethod, Workflow};
use crate::types::{BridgeType, ChainId, Nft};
use crate::{ensure_bridge, Error};

impl Workflow {
    /// Switch import method, resetting the form
    #[instrument(skip(self))]
    pub async fn switch_import_method(&self, method: ImportMethod) {
        let mut ctx = self.context.lock().await;
        ctx.import_method = method;
        ctx.reset_form();
    }

    /// Scan `owner`'s wallet on `chain_id`
    ///
    /// `scanned` is set once the scan settles, whether it succeeded or not. Scan errors are
    /// returned to the caller. Results arriving after a form reset are discarded.
    #[instrument(skip(self))]
    pub async fn scan(&self, owner: Address, chain_id: ChainId) -> Result<Vec<Nft>, Error> {
        let epoch = {
            let mut ctx = self.context.lock().await;
            ctx.scan.scanning = true;
            ctx.epoch
        };

        let result = self.services.scanner.scan(owner, chain_id).await;

        let mut ctx = self.context.lock().await;
        if ctx.epoch != epoch {
            tracing::debug!("Form reset during scan, dropping results");
            return result;
        }

        ctx.scan.scanning = false;
        ctx.scan.scanned = true;

        match &result {
            Ok(nfts) => {
                tracing::info!("Scan found {} NFTs on chain {}", nfts.len(), chain_id);
                ctx.scan.found = nfts.clone();
            }
            Err(err) => tracing::warn!("Scan failed on chain {}: {}", chain_id, err),
        }

        result
    }

    /// Select NFTs from the scan results
    ///
    /// All NFTs must come from the same contract; collection metadata may differ. An empty
    /// selection clears the import. Rejected while bridging fungible tokens.
    pub async fn select_nfts(&self, nfts: Vec<Nft>) -> Result<(), Error> {
        ensure_bridge!(
            nfts.windows(2)
                .all(|pair| pair[0].token.same_contract(&pair[1].token)),
            Error::MixedContracts
        );

        let mut ctx = self.context.lock().await;
        ensure_bridge!(ctx.bridge_type == BridgeType::Nft, Error::NotNftBridge);
        ctx.selected_token = nfts.first().map(|nft| nft.token.clone());
        ctx.can_proceed = !nfts.is_empty();
        ctx.selected_nfts = nfts;

        Ok(())
    }

    /// Look up a single NFT by contract and id
    ///
    /// On success the NFT becomes the sole selection and the workflow advances. On failure
    /// nothing changes; the error is logged and the user stays on the import step to correct
    /// the input.
    #[instrument(skip(self))]
    pub async fn manual_lookup(
        &self,
        contract_address: &str,
        chain_id: Option<ChainId>,
        owner: Address,
        token_id: U256,
    ) -> Option<Nft> {
        match self
            .try_manual_lookup(contract_address, chain_id, owner, token_id)
            .await
        {
            Ok(nft) => Some(nft),
            Err(err) => {
                tracing::warn!("Manual NFT lookup failed: {}", err);
                None
            }
        }
    }

    /// Look up `token_id` in the contract entered with
    /// [`set_contract_address`](Workflow::set_contract_address) on the connected network
    pub async fn lookup_entered_contract(&self, owner: Address, token_id: U256) -> Option<Nft> {
        let (contract_address, network) = {
            let ctx = self.context.lock().await;
            (ctx.contract_address.clone(), ctx.network)
        };

        self.manual_lookup(&contract_address, network, owner, token_id)
            .await
    }

    async fn try_manual_lookup(
        &self,
        contract_address: &str,
        chain_id: Option<ChainId>,
        owner: Address,
        token_id: U256,
    ) -> Result<Nft, Error> {
        let contract_address = contract_address.trim();
        ensure_bridge!(
            !contract_address.is_empty(),
            Error::PreconditionNotMet("contract address")
        );
        let chain_id = chain_id.ok_or(Error::PreconditionNotMet("source chain"))?;
        let contract = Address::from_str(contract_address)
            .map_err(|_| Error::InvalidContractAddress(contract_address.to_string()))?;

        let epoch = {
            let ctx = self.context.lock().await;
            ensure_bridge!(ctx.bridge_type == BridgeType::Nft, Error::NotNftBridge);
            ctx.epoch
        };

        let nft = self
            .services
            .metadata
            .lookup(contract, chain_id, owner, token_id)
            .await?
            .ok_or(Error::NftNotFound)?;

        let mut ctx = self.context.lock().await;
        ensure_bridge!(
            ctx.epoch == epoch,
            Error::Lookup("form reset during lookup".to_string())
        );

        ctx.contract_address = contract.to_string();
        ctx.selected_token = Some(nft.token.clone());
        ctx.selected_nfts = vec![nft.clone()];
        ctx.can_proceed = true;
        ctx.step = ctx.step.next();

        tracing::info!(
            "Imported {} #{} from chain {}",
            nft.token.symbol,
            nft.token_id,
            chain_id
        );

        Ok(nft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Token, TokenStandard};
    use crate::workflow::tests::{test_nft, test_workflow, COLLECTION};
    use crate::workflow::WorkflowStep;

    #[tokio::test]
    async fn test_switch_import_method_clears_everything() {
        let workflow = test_workflow();
        {
            let mut ctx = workflow.context.lock().await;
            ctx.scan.found = vec![test_nft(1), test_nft(2)];
            ctx.scan.scanned = true;
        }
        workflow.select_nfts(vec![test_nft(1)]).await.unwrap();
        workflow.set_contract_address(COLLECTION.to_string()).await;

        workflow.switch_import_method(ImportMethod::Manual).await;

        let ctx = workflow.context().await;
        assert_eq!(ctx.import_method, ImportMethod::Manual);
        assert!(ctx.selected_nfts.is_empty());
        assert!(ctx.selected_token.is_none());
        assert!(ctx.contract_address.is_empty());
        assert!(ctx.scan.found.is_empty());
        assert!(!ctx.scan.scanned);
        assert!(!ctx.can_proceed);
        assert_eq!(ctx.step, WorkflowStep::Import);
    }

    #[tokio::test]
    async fn test_select_nfts_rejects_mixed_collections() {
        let workflow = test_workflow();
        let other = Nft::new(
            Token::new(
                "OTHER",
                TokenStandard::Erc721,
                1,
                alloy_primitives::address!("e7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
            ),
            U256::from(1u64),
        );

        let err = workflow
            .select_nfts(vec![test_nft(1), other])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MixedContracts));
        assert!(!workflow.context().await.can_proceed);
    }

    #[tokio::test]
    async fn test_select_nfts_ignores_collection_metadata() {
        let workflow = test_workflow();
        let mut named = test_nft(2);
        named.token.name = Some("Punks".to_string());

        workflow
            .select_nfts(vec![test_nft(1), named])
            .await
            .unwrap();

        assert_eq!(workflow.context().await.selected_nfts.len(), 2);
    }

    #[tokio::test]
    async fn test_select_nfts_rejected_for_fungible_bridge() {
        let workflow = test_workflow();
        workflow
            .switch_bridge_type(crate::types::BridgeType::Fungible)
            .await;

        let err = workflow.select_nfts(vec![test_nft(1)]).await.unwrap_err();

        assert!(matches!(err, Error::NotNftBridge));
        let ctx = workflow.context().await;
        assert!(ctx.selected_token.is_none());
        assert!(!ctx.can_proceed);
    }

    #[tokio::test]
    async fn test_select_nfts_enables_proceed() {
        let workflow = test_workflow();

        workflow
            .select_nfts(vec![test_nft(1), test_nft(2)])
            .await
            .unwrap();

        let ctx = workflow.context().await;
        assert!(ctx.can_proceed);
        assert_eq!(ctx.selected_token.unwrap().symbol, "PUNK");

        workflow.select_nfts(vec![]).await.unwrap();
        assert!(!workflow.context().await.can_proceed);
    }

    #[tokio::test]
    async fn test_manual_lookup_requires_contract_and_chain() {
        let workflow = test_workflow();

        let nft = workflow
            .manual_lookup("  ", Some(1), COLLECTION, U256::from(1u64))
            .await;
        assert!(nft.is_none());

        let nft = workflow
            .manual_lookup(&COLLECTION.to_string(), None, COLLECTION, U256::from(1u64))
            .await;
        assert!(nft.is_none());

        assert_eq!(workflow.step().await, WorkflowStep::Import);
    }

    #[tokio::test]
    async fn test_manual_lookup_not_found_leaves_state() {
        let workflow = test_workflow();

        let nft = workflow
            .manual_lookup(&COLLECTION.to_string(), Some(1), COLLECTION, U256::from(1u64))
            .await;

        assert!(nft.is_none());
        let ctx = workflow.context().await;
        assert!(ctx.selected_token.is_none());
        assert_eq!(ctx.step, WorkflowStep::Import);
    }

    #[tokio::test]
    async fn test_manual_lookup_rejects_garbage_address() {
        let workflow = test_workflow();

        let nft = workflow
            .manual_lookup("not-an-address", Some(1), COLLECTION, U256::from(1u64))
            .await;

        assert!(nft.is_none());
    }
}
