use std::sync::Arc;
use tracing::{info, warn};

use crate::campaigns::CampaignReader;
use crate::error::{ClientError, ClientResult};
use crate::flows::FlowState;
use crate::session::WalletSession;
use crate::units;

/// Form inputs for a new campaign. The goal is a human decimal string in
/// ETH; the duration is a day count starting now.
#[derive(Debug, Clone)]
pub struct CreateCampaignInput {
    pub title: String,
    pub description: String,
    pub goal: String,
    pub duration_days: u64,
}

/// Create-campaign flow. The contract assigns the id and does not return
/// it, so a successful creation refreshes the whole list and the new
/// campaign shows up there.
pub struct CreateFlow {
    session: Arc<WalletSession>,
    state: FlowState,
}

impl CreateFlow {
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

    pub async fn submit(
        &self,
        reader: &CampaignReader,
        input: CreateCampaignInput,
    ) -> ClientResult<()> {
        if !self.state.try_begin() {
            return Err(ClientError::FlowBusy);
        }
        let result = self.run(reader, input).await;
        self.state.finish(&result).await;
        result
    }

    async fn run(&self, reader: &CampaignReader, input: CreateCampaignInput) -> ClientResult<()> {
        if !self.session.is_connected().await {
            return Err(ClientError::NotConnected);
        }

        let title = input.title.trim();
        if title.is_empty() {
            return Err(ClientError::InvalidInput("title is required".to_string()));
        }
        let description = input.description.trim();
        if description.is_empty() {
            return Err(ClientError::InvalidInput("description is required".to_string()));
        }
        let goal = units::parse_amount(&input.goal)?;
        if input.duration_days == 0 {
            return Err(ClientError::InvalidInput(
                "duration must be at least one day".to_string(),
            ));
        }

        let handle = self.session.contract().await;
        handle
            .create_campaign(title, description, goal, input.duration_days)
            .await?;
        info!(title, days = input.duration_days, "campaign created, refreshing list");

        // The creation itself succeeded; a failed refresh only records the
        // list's own load error.
        if let Err(e) = reader.refresh().await {
            warn!(error = %e, "list refresh after create failed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClientConfig;

    fn input(title: &str, description: &str, goal: &str, days: u64) -> CreateCampaignInput {
        CreateCampaignInput {
            title: title.to_string(),
            description: description.to_string(),
            goal: goal.to_string(),
            duration_days: days,
        }
    }

    fn disconnected() -> Arc<WalletSession> {
        Arc::new(WalletSession::new(ClientConfig::default(), None).unwrap())
    }

    async fn connected() -> Arc<WalletSession> {
        use crate::session::LocalConnector;
        use alloy::signers::local::PrivateKeySigner;

        let connector = Arc::new(LocalConnector::new(PrivateKeySigner::random()));
        let session = Arc::new(WalletSession::new(ClientConfig::default(), Some(connector)).unwrap());
        session.connect().await;
        session
    }

    #[tokio::test]
    async fn test_requires_connection() {
        let session = disconnected();
        let flow = CreateFlow::new(session.clone());
        let reader = CampaignReader::new(session);

        let err = flow
            .submit(&reader, input("Title", "Desc", "10", 30))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
        assert!(!flow.is_busy());
        assert_eq!(
            flow.last_error().await.as_deref(),
            Some("Please connect your wallet first")
        );
    }

    #[tokio::test]
    async fn test_rejects_blank_fields() {
        let session = connected().await;
        let flow = CreateFlow::new(session.clone());
        let reader = CampaignReader::new(session);

        let err = flow
            .submit(&reader, input("   ", "Desc", "10", 30))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));

        let err = flow
            .submit(&reader, input("Title", "", "10", 30))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert!(!flow.is_busy());
    }

    #[tokio::test]
    async fn test_rejects_bad_goal_and_duration() {
        let session = connected().await;
        let flow = CreateFlow::new(session.clone());
        let reader = CampaignReader::new(session);

        let err = flow
            .submit(&reader, input("Title", "Desc", "0", 30))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidAmount(_)));

        let err = flow
            .submit(&reader, input("Title", "Desc", "10", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_rejects_while_busy() {
        let session = connected().await;
        let flow = CreateFlow::new(session.clone());
        let reader = CampaignReader::new(session);

        assert!(flow.state.try_begin());
        let err = flow
            .submit(&reader, input("Title", "Desc", "10", 30))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::FlowBusy));
    }
}
