use std::sync::Arc;
use tracing::{debug, info};

use crate::campaigns::{CampaignDetail, unix_now};
use crate::contract::CampaignSource;
use crate::error::{ClientError, ClientResult};
use crate::flows::FlowState;
use crate::session::WalletSession;
use crate::units;

/// Contribution flow. The amount is carried as the transaction value; after
/// confirmation only the campaign's raised total and the caller's own
/// contribution are re-fetched and applied.
pub struct ContributeFlow {
    session: Arc<WalletSession>,
    state: FlowState,
}

impl ContributeFlow {
    pub fn new(session: Arc<WalletSession>) -> Self {
        Self {
            session,
            state: FlowState::new(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.last_error().await
    }

    pub async fn submit(&self, detail: &CampaignDetail, amount: &str) -> ClientResult<()> {
        if !self.state.try_begin() {
            return Err(ClientError::FlowBusy);
        }
        let result = self.run(detail, amount).await;
        self.state.finish(&result).await;
        result
    }

    async fn run(&self, detail: &CampaignDetail, amount: &str) -> ClientResult<()> {
        let Some(account) = self.session.account().await else {
            return Err(ClientError::NotConnected);
        };
        let campaign = detail
            .campaign()
            .await
            .ok_or(ClientError::CampaignNotFound(detail.id()))?;

        if campaign.claimed {
            return Err(ClientError::AlreadyClaimed);
        }
        if campaign.is_expired_at(unix_now()) {
            return Err(ClientError::CampaignExpired);
        }
        let value = units::parse_amount(amount)?;

        let epoch = self.session.epoch();
        let handle = self.session.contract().await;
        handle.contribute(campaign.id, value).await?;

        // Only the affected fields come back from the chain.
        let raised = handle.campaign(campaign.id).await?.raised;
        let contribution = handle.contribution(campaign.id, account).await?;

        if self.session.epoch() != epoch {
            debug!(campaign = campaign.id, "session changed mid-flow, not applying refresh");
            return Ok(());
        }
        detail.apply_raised(raised).await;
        detail.apply_contribution(contribution).await;
        info!(campaign = campaign.id, amount, "contribution applied");
        Ok(())
    }
}
