use std::sync::Arc;
use tracing::{debug, info};

use crate::campaigns::{CampaignDetail, unix_now};
use crate::contract::CampaignSource;
use crate::error::{ClientError, ClientResult};
use crate::flows::FlowState;
use crate::session::WalletSession;

/// Claim flow: creator-only withdrawal after the deadline. No amount input;
/// after confirmation only the claimed flag is re-fetched. Reaching the goal
/// is not checked here; the contract enforces whatever it requires.
pub struct ClaimFlow {
    session: Arc<WalletSession>,
    state: FlowState,
}

impl ClaimFlow {
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

    pub async fn submit(&self, detail: &CampaignDetail) -> ClientResult<()> {
        if !self.state.try_begin() {
            return Err(ClientError::FlowBusy);
        }
        let result = self.run(detail).await;
        self.state.finish(&result).await;
        result
    }

    async fn run(&self, detail: &CampaignDetail) -> ClientResult<()> {
        let Some(account) = self.session.account().await else {
            return Err(ClientError::NotConnected);
        };
        let campaign = detail
            .campaign()
            .await
            .ok_or(ClientError::CampaignNotFound(detail.id()))?;

        if account != campaign.creator {
            return Err(ClientError::NotCreator);
        }
        if !campaign.is_expired_at(unix_now()) {
            return Err(ClientError::NotExpired);
        }
        if campaign.claimed {
            return Err(ClientError::AlreadyClaimed);
        }

        let epoch = self.session.epoch();
        let handle = self.session.contract().await;
        handle.claim_funds(campaign.id).await?;

        let claimed = handle.campaign(campaign.id).await?.claimed;

        if self.session.epoch() != epoch {
            debug!(campaign = campaign.id, "session changed mid-flow, not applying refresh");
            return Ok(());
        }
        detail.apply_claimed(claimed).await;
        info!(campaign = campaign.id, "claim applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::LocalConnector;
    use crate::types::{Campaign, ClientConfig};
    use alloy::primitives::{Address, U256, utils::parse_ether};
    use alloy::signers::local::PrivateKeySigner;

    async fn connected() -> (Arc<WalletSession>, Address) {
        let connector = Arc::new(LocalConnector::new(PrivateKeySigner::random()));
        let account = connector.address();
        let session = Arc::new(WalletSession::new(ClientConfig::default(), Some(connector)).unwrap());
        session.connect().await;
        (session, account)
    }

    fn campaign(creator: Address, deadline: u64, claimed: bool) -> Campaign {
        Campaign {
            id: 1,
            creator,
            title: "Test".to_string(),
            description: "Test campaign".to_string(),
            goal: parse_ether("10").unwrap(),
            raised: parse_ether("5").unwrap(),
            deadline,
            claimed,
        }
    }

    #[tokio::test]
    async fn test_requires_connection() {
        let session = Arc::new(WalletSession::new(ClientConfig::default(), None).unwrap());
        let flow = ClaimFlow::new(session.clone());
        let detail = CampaignDetail::new(session, 1);

        let err = flow.submit(&detail).await.unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
    }

    #[tokio::test]
    async fn test_rejects_non_creator() {
        let (session, _account) = connected().await;
        let flow = ClaimFlow::new(session.clone());
        let detail = CampaignDetail::new(session, 1);
        detail
            .set_campaign_for_tests(campaign(Address::repeat_byte(0xAA), 1_000, false), U256::ZERO)
            .await;

        let err = flow.submit(&detail).await.unwrap_err();
        assert!(matches!(err, ClientError::NotCreator));
        assert!(!flow.is_busy());
    }

    #[tokio::test]
    async fn test_rejects_before_deadline() {
        let (session, account) = connected().await;
        let flow = ClaimFlow::new(session.clone());
        let detail = CampaignDetail::new(session, 1);
        detail
            .set_campaign_for_tests(campaign(account, u64::MAX, false), U256::ZERO)
            .await;

        let err = flow.submit(&detail).await.unwrap_err();
        assert!(matches!(err, ClientError::NotExpired));
    }

    #[tokio::test]
    async fn test_rejects_double_claim() {
        let (session, account) = connected().await;
        let flow = ClaimFlow::new(session.clone());
        let detail = CampaignDetail::new(session, 1);
        detail
            .set_campaign_for_tests(campaign(account, 1_000, true), U256::ZERO)
            .await;

        let err = flow.submit(&detail).await.unwrap_err();
        assert!(matches!(err, ClientError::AlreadyClaimed));
    }

    #[tokio::test]
    async fn test_under_goal_claim_passes_local_checks() {
        // raised < goal is not a local precondition; the submission proceeds
        // to the chain (and fails here only because no node is listening).
        let (session, account) = connected().await;
        let flow = ClaimFlow::new(session.clone());
        let detail = CampaignDetail::new(session, 1);
        detail
            .set_campaign_for_tests(campaign(account, 1_000, false), U256::ZERO)
            .await;

        let err = flow.submit(&detail).await.unwrap_err();
        assert_eq!(err.category(), "write");
    }
}
