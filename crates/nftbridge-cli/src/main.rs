//! NFT bridge operator cli

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use nftbridge::workflow::components::ComponentRegistry;
use nftbridge::{ImportMethod, Nft, Outcome, Token, TokenStandard, Workflow};
use nftbridge_cli::cli::{CLIArgs, Commands};
use nftbridge_cli::config::Settings;
use nftbridge_cli::LogNotifier;
use nftbridge_fake::FakeCollaborators;
use nftbridge_redb::RedbTransactionLog;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,redb=warn";

#[tokio::main]
async fn main() -> Result<()> {
    let args = CLIArgs::parse();

    let work_dir = match &args.work_dir {
        Some(work_dir) => {
            std::fs::create_dir_all(work_dir)?;
            work_dir.clone()
        }
        None => nftbridge_cli::work_dir()?,
    };

    let config_file_path = args
        .config
        .clone()
        .unwrap_or_else(|| work_dir.join("config.toml"));
    let settings = Settings::new(&config_file_path)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            settings
                .info
                .log_filter
                .as_deref()
                .unwrap_or(DEFAULT_LOG_FILTER),
        )
    });
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::debug!("Using config file {}", config_file_path.display());

    match args.command {
        Commands::Routes { src } => {
            for route in settings
                .bridge
                .routes
                .iter()
                .filter(|r| src.map_or(true, |src| r.src_chain_id == src))
            {
                println!("{} -> {}", route.src_chain_id, route.dest_chain_id);
            }
        }
        Commands::Vaults { src, dest } => {
            let vaults = settings
                .bridge
                .vaults(src, dest)
                .ok_or(anyhow!("No vaults configured for {src} -> {dest}"))?;
            println!("{}", serde_json::to_string_pretty(vaults)?);
        }
        Commands::Explorer { chain, hash } => {
            let link = settings
                .bridge
                .explorer_tx_url(chain, &hash)
                .ok_or(anyhow!("No explorer configured for chain {chain}"))?;
            println!("{link}");
        }
        Commands::History { address } => {
            let log = RedbTransactionLog::new(&settings.db_path(&work_dir))?;
            let records = nftbridge::database::TransactionLog::records(&log, address).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Simulate {
            owner,
            src,
            dest,
            contract,
            token_id,
            standard,
            fee,
        } => {
            let standard: TokenStandard = standard.into();
            let fakes = FakeCollaborators::new(owner);
            fakes
                .metadata
                .insert(
                    src,
                    Nft::new(Token::new("SIM", standard, src, contract), token_id),
                )
                .await;

            let log = Arc::new(RedbTransactionLog::new(&settings.db_path(&work_dir))?);
            let workflow = Workflow::new(settings.bridge.clone(), fakes.services(log));
            workflow
                .mount(ComponentRegistry {
                    notifier: Some(Arc::new(LogNotifier)),
                    ..Default::default()
                })
                .await;

            workflow.on_account_change(Some(owner)).await;
            workflow.on_network_change(Some(src), None).await;
            workflow.set_destination(Some(dest)).await;
            workflow.switch_import_method(ImportMethod::Manual).await;
            workflow.set_contract_address(contract.to_string()).await;

            if workflow
                .lookup_entered_contract(owner, token_id)
                .await
                .is_none()
            {
                bail!("Could not import {contract} #{token_id}");
            }
            workflow.set_fee(Some(fee)).await;

            report("Approve", workflow.approve().await)?;
            report("Bridge", workflow.bridge().await)?;

            println!("Finished on step {}", workflow.step_label().await);
            let records = workflow.recorder().records(owner).await?;
            println!("{}", serde_json::to_string_pretty(&records)?);

            workflow.teardown().await;
        }
    }

    Ok(())
}

fn report(action: &str, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Submitted(hash) => println!("{action}: {hash}"),
        Outcome::Skipped => println!("{action}: skipped"),
        Outcome::Failed(kind) => bail!("{action} failed: {kind:?}"),
    }
    Ok(())
}
