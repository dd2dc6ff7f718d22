//! Workflow Integration Tests
//!
//! Step navigation, network/account reconciliation and NFT import driven through the public
//! [`Workflow`](nftbridge::Workflow) api with fake collaborators.

use alloy_primitives::U256;
use anyhow::Result;
use nftbridge::{BridgeType, ImportMethod, WorkflowStep};
use nftbridge_integration_tests::init_pure_tests::*;

// =============================================================================
// Reconciliation
// =============================================================================

/// Switching the wallet to the destination chain swaps source and destination
#[tokio::test]
async fn test_network_switch_to_destination_swaps() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    connect(&harness).await;

    harness
        .workflow
        .on_network_change(Some(DEST_CHAIN), Some(SRC_CHAIN))
        .await;

    let ctx = harness.workflow.context().await;
    assert_eq!(ctx.network, Some(DEST_CHAIN));
    assert_eq!(ctx.destination, Some(SRC_CHAIN));

    Ok(())
}

/// A source without a route to the destination clears the destination
#[tokio::test]
async fn test_network_switch_without_route_clears_destination() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    connect(&harness).await;

    harness
        .workflow
        .on_network_change(Some(UNROUTED_CHAIN), Some(SRC_CHAIN))
        .await;

    assert_eq!(harness.workflow.context().await.destination, None);

    Ok(())
}

/// Scan mode resets the form on network change, manual mode only re-validates
#[tokio::test]
async fn test_network_switch_resets_or_validates_form() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;

    harness
        .workflow
        .on_network_change(Some(SRC_CHAIN), None)
        .await;
    assert_eq!(harness.form.clears(), 1);
    assert_eq!(harness.form.validations(), 0);

    harness
        .workflow
        .switch_import_method(ImportMethod::Manual)
        .await;
    let clears = harness.form.clears();

    harness
        .workflow
        .on_network_change(Some(DEST_CHAIN), Some(SRC_CHAIN))
        .await;
    assert_eq!(harness.form.clears(), clears);
    assert_eq!(harness.form.validations(), 1);

    Ok(())
}

/// Disconnecting the wallet clears the selected token and the destination
#[tokio::test]
async fn test_account_disconnect_clears_selection() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    connect(&harness).await;
    harness.workflow.select_nfts(vec![punk(1)]).await?;

    harness.workflow.on_account_change(None).await;

    let ctx = harness.workflow.context().await;
    assert!(ctx.account.is_none());
    assert!(ctx.selected_token.is_none());
    assert!(ctx.selected_nfts.is_empty());
    assert!(ctx.destination.is_none());
    // Once on connect, once on disconnect
    assert_eq!(harness.actions.form_updates(), 2);

    Ok(())
}

// =============================================================================
// Import
// =============================================================================

/// Scan results land in the context and can be selected
#[tokio::test]
async fn test_scan_and_select() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    connect(&harness).await;
    harness
        .fakes
        .scanner
        .set_inventory(OWNER, SRC_CHAIN, vec![punk(1), punk(2)])
        .await;

    let found = harness.workflow.scan(OWNER, SRC_CHAIN).await?;
    assert_eq!(found.len(), 2);

    let ctx = harness.workflow.context().await;
    assert!(ctx.scan.scanned);
    assert!(!ctx.scan.scanning);
    assert_eq!(ctx.scan.found, found);
    assert!(!ctx.can_proceed);

    harness.workflow.select_nfts(vec![found[1].clone()]).await?;
    assert!(harness.workflow.context().await.can_proceed);

    Ok(())
}

/// A failed scan still completes the scan and surfaces the error to the caller
#[tokio::test]
async fn test_scan_failure_marks_scanned() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    harness
        .fakes
        .scanner
        .set_failure(Some("indexer unavailable".to_string()))
        .await;

    assert!(harness.workflow.scan(OWNER, SRC_CHAIN).await.is_err());

    let ctx = harness.workflow.context().await;
    assert!(ctx.scan.scanned);
    assert!(!ctx.scan.scanning);
    assert!(ctx.scan.found.is_empty());

    Ok(())
}

/// Switching from scan to manual clears the selection and stays on import
#[tokio::test]
async fn test_scan_to_manual_switch_clears_selection() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    connect(&harness).await;
    harness
        .fakes
        .scanner
        .set_inventory(OWNER, SRC_CHAIN, vec![punk(1), punk(2)])
        .await;
    let found = harness.workflow.scan(OWNER, SRC_CHAIN).await?;
    harness.workflow.select_nfts(found).await?;
    harness
        .workflow
        .set_contract_address(PUNKS.to_string())
        .await;

    harness
        .workflow
        .switch_import_method(ImportMethod::Manual)
        .await;

    let ctx = harness.workflow.context().await;
    assert!(ctx.selected_nfts.is_empty());
    assert!(ctx.contract_address.is_empty());
    assert!(!ctx.scan.scanned);
    assert!(!ctx.can_proceed);
    assert_eq!(ctx.step, WorkflowStep::Import);

    Ok(())
}

/// Scan results arriving after a form reset are dropped
#[tokio::test]
async fn test_scan_results_dropped_after_reset() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    harness
        .fakes
        .scanner
        .set_inventory(OWNER, SRC_CHAIN, vec![punk(1)])
        .await;
    harness.fakes.scanner.gate.close();

    let workflow = harness.workflow.clone();
    let scan = tokio::spawn(async move { workflow.scan(OWNER, SRC_CHAIN).await });

    harness.fakes.scanner.gate.entered().await;
    harness
        .workflow
        .switch_import_method(ImportMethod::Manual)
        .await;
    harness.fakes.scanner.gate.open();

    let found = scan.await??;
    assert_eq!(found.len(), 1);

    let ctx = harness.workflow.context().await;
    assert!(ctx.scan.found.is_empty());
    assert!(!ctx.scan.scanned);

    Ok(())
}

/// Manual lookup selects the NFT and advances to review
#[tokio::test]
async fn test_manual_lookup_advances() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    connect(&harness).await;

    import_manually(&harness, punk(42)).await?;

    let ctx = harness.workflow.context().await;
    assert_eq!(ctx.step, WorkflowStep::Review);
    assert_eq!(ctx.selected_nfts, vec![punk(42)]);
    assert_eq!(ctx.selected_token, Some(punk(42).token));
    assert!(ctx.can_proceed);

    Ok(())
}

/// The contract entered in the form is looked up on the connected network
#[tokio::test]
async fn test_lookup_entered_contract() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    connect(&harness).await;
    harness.fakes.metadata.insert(SRC_CHAIN, punk(5)).await;
    harness
        .workflow
        .switch_import_method(ImportMethod::Manual)
        .await;

    // Nothing entered yet
    assert!(harness
        .workflow
        .lookup_entered_contract(OWNER, U256::from(5u64))
        .await
        .is_none());

    harness
        .workflow
        .set_contract_address(format!(" {PUNKS} "))
        .await;
    let nft = harness
        .workflow
        .lookup_entered_contract(OWNER, U256::from(5u64))
        .await;

    assert_eq!(nft, Some(punk(5)));
    let ctx = harness.workflow.context().await;
    assert_eq!(ctx.step, WorkflowStep::Review);
    assert_eq!(ctx.contract_address, PUNKS.to_string());

    Ok(())
}

/// A successful lookup keeps the contract it was found in
#[tokio::test]
async fn test_manual_lookup_records_contract() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    connect(&harness).await;

    import_manually(&harness, punk(8)).await?;

    assert_eq!(
        harness.workflow.context().await.contract_address,
        PUNKS.to_string()
    );

    Ok(())
}

/// NFT import is refused while bridging fungible tokens
#[tokio::test]
async fn test_manual_lookup_refused_for_fungible_bridge() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    connect(&harness).await;
    harness.fakes.metadata.insert(SRC_CHAIN, punk(4)).await;
    harness
        .workflow
        .switch_bridge_type(BridgeType::Fungible)
        .await;

    let nft = harness
        .workflow
        .manual_lookup(&PUNKS.to_string(), Some(SRC_CHAIN), OWNER, U256::from(4u64))
        .await;

    assert!(nft.is_none());
    let ctx = harness.workflow.context().await;
    assert!(ctx.selected_token.is_none());
    assert_eq!(ctx.step, WorkflowStep::Import);

    Ok(())
}

/// An unknown NFT is a soft failure: nothing changes and nothing is notified
#[tokio::test]
async fn test_manual_lookup_unknown_nft() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    connect(&harness).await;

    let nft = harness
        .workflow
        .manual_lookup(&PUNKS.to_string(), Some(SRC_CHAIN), OWNER, U256::from(99u64))
        .await;

    assert!(nft.is_none());
    let ctx = harness.workflow.context().await;
    assert_eq!(ctx.step, WorkflowStep::Import);
    assert!(ctx.selected_token.is_none());
    assert!(harness.notifier.notifications().is_empty());

    Ok(())
}

// =============================================================================
// Steps
// =============================================================================

/// Switching bridge type returns to import from any step
#[tokio::test]
async fn test_switch_bridge_type_from_review() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    connect(&harness).await;
    import_manually(&harness, punk(1)).await?;
    assert_eq!(harness.workflow.step().await, WorkflowStep::Review);

    harness
        .workflow
        .switch_bridge_type(BridgeType::Fungible)
        .await;

    let ctx = harness.workflow.context().await;
    assert_eq!(ctx.step, WorkflowStep::Import);
    assert_eq!(ctx.bridge_type, BridgeType::Fungible);
    assert!(ctx.selected_token.is_none());
    // Destination belongs to the chain pair, not the form
    assert_eq!(ctx.destination, Some(DEST_CHAIN));

    Ok(())
}

/// Teardown resets the form and detaches every component
#[tokio::test]
async fn test_teardown_detaches_components() -> Result<()> {
    setup_tracing();
    let harness = create_test_harness().await?;
    connect(&harness).await;
    let clears = harness.form.clears();

    harness.workflow.teardown().await;
    assert_eq!(harness.form.clears(), clears + 1);

    harness.workflow.reset_form().await;
    harness.workflow.on_account_change(None).await;
    assert_eq!(harness.form.clears(), clears + 1);
    assert_eq!(harness.actions.form_updates(), 1);

    Ok(())
}
