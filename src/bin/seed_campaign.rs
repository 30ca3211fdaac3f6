//! Operational tool: make sure the deployed contract has at least one
//! campaign, so a fresh deployment never greets users with an empty list.
//!
//! Configuration comes from the environment:
//!   RPC_URL           (default http://127.0.0.1:8545)
//!   CONTRACT_ADDRESS  (default local devnet deployment)
//!   PRIVATE_KEY       (required; funds the default campaign's creation)

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crowdfund_client::contract::{CampaignSource, CrowdfundingHandle};
use crowdfund_client::session::{LocalConnector, WalletConnector};
use crowdfund_client::types::ClientConfig;
use crowdfund_client::units;

const DEFAULT_TITLE: &str = "Welcome Campaign";
const DEFAULT_DESCRIPTION: &str =
    "This is a default on-chain campaign always visible for new users.";
const DEFAULT_GOAL_ETH: &str = "10";
const DEFAULT_DURATION_DAYS: u64 = 30;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let defaults = ClientConfig::default();
    let rpc_url = std::env::var("RPC_URL").unwrap_or(defaults.rpc_url);
    let contract_address = match std::env::var("CONTRACT_ADDRESS") {
        Ok(raw) => raw.parse().context("invalid CONTRACT_ADDRESS")?,
        Err(_) => defaults.contract_address,
    };
    let private_key = std::env::var("PRIVATE_KEY").context("PRIVATE_KEY is required")?;

    let connector = Arc::new(LocalConnector::from_private_key(&private_key)?);
    let handle = CrowdfundingHandle::with_wallet(
        contract_address,
        &rpc_url,
        connector.signer_wallet()?,
    )?;

    // campaign_count already falls back between the two accessor names
    // deployments have shipped with.
    let count = handle.campaign_count().await?;
    if count > 0 {
        info!(count, "campaigns already exist on-chain, nothing to do");
        return Ok(());
    }

    info!("no campaigns found, creating the default campaign");
    let goal = units::parse_amount(DEFAULT_GOAL_ETH)?;
    handle
        .create_campaign(DEFAULT_TITLE, DEFAULT_DESCRIPTION, goal, DEFAULT_DURATION_DAYS)
        .await?;
    info!("default campaign created");

    Ok(())
}
