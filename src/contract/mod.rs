// src/contract/mod.rs
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::sol;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::types::Campaign;

sol! {
    #[sol(rpc)]
    contract Crowdfunding {
        function campaignCount() external view returns (uint256);
        function getCampaignCount() external view returns (uint256);
        function getCampaign(uint256 id) external view returns (
            address creator,
            string memory title,
            string memory description,
            uint256 goal,
            uint256 raised,
            uint256 deadline,
            bool claimed
        );
        function getContribution(uint256 id, address contributor) external view returns (uint256);
        function createCampaign(
            string memory title,
            string memory description,
            uint256 goal,
            uint256 durationDays
        ) external;
        function contribute(uint256 id) external payable;
        function claimFunds(uint256 id) external;
    }
}

/// Read surface the view models consume: campaign count, one record by id,
/// one contributor's amount. `CrowdfundingHandle` is the chain-backed
/// implementation; tests substitute their own.
#[async_trait]
pub trait CampaignSource: Send + Sync {
    async fn campaign_count(&self) -> ClientResult<u64>;

    async fn campaign(&self, id: u64) -> ClientResult<Campaign>;

    async fn contribution(&self, id: u64, contributor: Address) -> ClientResult<U256>;
}

/// Callable handle to the deployed crowdfunding contract: a fixed address
/// bound to whichever provider/signer was current at construction time.
/// Immutable once built. When the signer changes the session replaces the
/// whole handle rather than mutating this one, so a stale signer can never
/// leak into a later transaction.
pub struct CrowdfundingHandle {
    address: Address,
    instance: Crowdfunding::CrowdfundingInstance<DynProvider>,
}

impl CrowdfundingHandle {
    /// Handle over a plain read-only provider. Reads work, writes revert at
    /// the transport since there is no signer.
    pub fn read_only(address: Address, rpc_url: &str) -> ClientResult<Self> {
        let url: Url = rpc_url
            .parse()
            .map_err(|e| ClientError::InvalidConfiguration(format!("bad RPC URL {rpc_url}: {e}")))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();
        debug!(%address, rpc = rpc_url, "built read-only contract handle");
        Ok(Self::with_provider(address, provider))
    }

    /// Handle bound to a wallet signer; transactions are signed and sent as
    /// the wallet's default account.
    pub fn with_wallet(address: Address, rpc_url: &str, wallet: EthereumWallet) -> ClientResult<Self> {
        let url: Url = rpc_url
            .parse()
            .map_err(|e| ClientError::InvalidConfiguration(format!("bad RPC URL {rpc_url}: {e}")))?;
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased();
        debug!(%address, rpc = rpc_url, "built signer-bound contract handle");
        Ok(Self::with_provider(address, provider))
    }

    fn with_provider(address: Address, provider: DynProvider) -> Self {
        Self {
            address,
            instance: Crowdfunding::new(address, provider),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Submit a create-campaign transaction and wait for confirmation.
    /// The deadline argument is a duration in days.
    pub async fn create_campaign(
        &self,
        title: &str,
        description: &str,
        goal: U256,
        duration_days: u64,
    ) -> ClientResult<()> {
        let pending = self
            .instance
            .createCampaign(
                title.to_string(),
                description.to_string(),
                goal,
                U256::from(duration_days),
            )
            .send()
            .await
            .map_err(|e| ClientError::TxRejected(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ClientError::TxFailed(e.to_string()))?;
        if !receipt.status() {
            return Err(ClientError::TxFailed("create campaign reverted".to_string()));
        }

        info!(tx = %receipt.transaction_hash, "campaign created");
        Ok(())
    }

    /// Submit a contribution; the amount travels as the transaction value,
    /// not as a call argument.
    pub async fn contribute(&self, id: u64, value: U256) -> ClientResult<()> {
        let pending = self
            .instance
            .contribute(U256::from(id))
            .value(value)
            .send()
            .await
            .map_err(|e| ClientError::TxRejected(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ClientError::TxFailed(e.to_string()))?;
        if !receipt.status() {
            return Err(ClientError::TxFailed(format!("contribution to campaign {id} reverted")));
        }

        info!(campaign = id, tx = %receipt.transaction_hash, "contribution confirmed");
        Ok(())
    }

    /// Submit a claim for a campaign's raised funds.
    pub async fn claim_funds(&self, id: u64) -> ClientResult<()> {
        let pending = self
            .instance
            .claimFunds(U256::from(id))
            .send()
            .await
            .map_err(|e| ClientError::TxRejected(e.to_string()))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ClientError::TxFailed(e.to_string()))?;
        if !receipt.status() {
            return Err(ClientError::TxFailed(format!("claim for campaign {id} reverted")));
        }

        info!(campaign = id, tx = %receipt.transaction_hash, "funds claimed");
        Ok(())
    }
}

#[async_trait]
impl CampaignSource for CrowdfundingHandle {
    /// Total number of campaigns. Deployments disagree on the accessor name,
    /// so `campaignCount` is tried first and `getCampaignCount` second.
    /// This is also the single place a contract counter becomes a `u64`.
    async fn campaign_count(&self) -> ClientResult<u64> {
        let raw = match self.instance.campaignCount().call().await {
            Ok(count) => count,
            Err(primary) => {
                debug!(error = %primary, "campaignCount() unavailable, trying getCampaignCount()");
                self.instance
                    .getCampaignCount()
                    .call()
                    .await
                    .map_err(|e| ClientError::ReadError(format!("campaign count: {e}")))?
            }
        };
        u64::try_from(raw).map_err(|_| ClientError::Overflow(format!("campaign count {raw}")))
    }

    /// Fetch one campaign record by id.
    async fn campaign(&self, id: u64) -> ClientResult<Campaign> {
        let record = self
            .instance
            .getCampaign(U256::from(id))
            .call()
            .await
            .map_err(|e| ClientError::ReadError(format!("campaign {id}: {e}")))?;

        Ok(Campaign {
            id,
            creator: record.creator,
            title: record.title,
            description: record.description,
            goal: record.goal,
            raised: record.raised,
            deadline: u64::try_from(record.deadline)
                .map_err(|_| ClientError::Overflow(format!("deadline of campaign {id}")))?,
            claimed: record.claimed,
        })
    }

    /// Fetch one contributor's cumulative contribution to one campaign, in wei.
    async fn contribution(&self, id: u64, contributor: Address) -> ClientResult<U256> {
        self.instance
            .getContribution(U256::from(id), contributor)
            .call()
            .await
            .map_err(|e| ClientError::ReadError(format!("contribution to campaign {id}: {e}")))
    }
}

impl std::fmt::Debug for CrowdfundingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrowdfundingHandle")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
