// src/campaigns/mod.rs
use alloy::primitives::{Address, U256};
use futures::future::try_join_all;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::contract::CampaignSource;
use crate::error::ClientResult;
use crate::session::WalletSession;
use crate::types::{Campaign, CampaignView};

const LIST_LOAD_ERROR: &str = "Failed to fetch campaigns";
const DETAIL_LOAD_ERROR: &str = "Failed to load campaign details";

/// Current wall-clock time as Unix seconds, for expiry checks.
pub(crate) fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// What the list view renders: the fetched campaigns in ascending-id order,
/// or a load error. `loaded` distinguishes "nothing fetched yet" from a
/// genuinely empty chain (which gets the create-your-first-campaign prompt).
#[derive(Debug, Clone, Default)]
pub struct ListSnapshot {
    pub campaigns: Vec<CampaignView>,
    pub error: Option<String>,
    pub loaded: bool,
}

/// Read model for the campaign list. Fetches the campaign count and then
/// every record (plus the viewer's contributions when connected)
/// concurrently, joining before anything is applied; a single failed fetch
/// fails the whole batch. Results fetched under an older session epoch are
/// discarded rather than applied.
pub struct CampaignReader {
    session: Arc<WalletSession>,
    source: Option<Arc<dyn CampaignSource>>,
    state: RwLock<ListSnapshot>,
}

impl CampaignReader {
    /// Reader over the session's current contract handle.
    pub fn new(session: Arc<WalletSession>) -> Self {
        Self {
            session,
            source: None,
            state: RwLock::new(ListSnapshot::default()),
        }
    }

    /// Reader pinned to an explicit campaign source instead of the
    /// session's handle. The session still drives account and epoch.
    pub fn with_source(session: Arc<WalletSession>, source: Arc<dyn CampaignSource>) -> Self {
        Self {
            session,
            source: Some(source),
            state: RwLock::new(ListSnapshot::default()),
        }
    }

    async fn source(&self) -> Arc<dyn CampaignSource> {
        match &self.source {
            Some(source) => Arc::clone(source),
            None => {
                let handle: Arc<dyn CampaignSource> = self.session.contract().await;
                handle
            }
        }
    }

    /// Re-fetch everything. On failure the previous campaigns stay rendered
    /// and a generic error is recorded; there is no automatic retry.
    pub async fn refresh(&self) -> ClientResult<()> {
        let epoch = self.session.epoch();
        let source = self.source().await;
        let account = self.session.account().await;

        let fetched = fetch_views(source.as_ref(), account).await;

        let mut state = self.state.write().await;
        if self.session.epoch() != epoch {
            debug!("discarding stale campaign list fetch");
            return Ok(());
        }
        match fetched {
            Ok(views) => {
                debug!(count = views.len(), "campaign list refreshed");
                state.campaigns = views;
                state.error = None;
                state.loaded = true;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "campaign list fetch failed");
                state.error = Some(LIST_LOAD_ERROR.to_string());
                state.loaded = true;
                Err(e)
            }
        }
    }

    pub async fn snapshot(&self) -> ListSnapshot {
        self.state.read().await.clone()
    }

    pub async fn campaigns(&self) -> Vec<CampaignView> {
        self.state.read().await.campaigns.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }
}

async fn fetch_views(
    source: &dyn CampaignSource,
    account: Option<Address>,
) -> ClientResult<Vec<CampaignView>> {
    let count = source.campaign_count().await?;
    if count == 0 {
        return Ok(Vec::new());
    }

    // Ids are 1-based and contiguous; one concurrent fetch per id bounds
    // latency to the slowest single call.
    let campaigns = try_join_all((1..=count).map(|id| source.campaign(id))).await?;
    let contributions = match account {
        Some(who) => Some(try_join_all((1..=count).map(|id| source.contribution(id, who))).await?),
        None => None,
    };

    Ok(campaigns
        .into_iter()
        .enumerate()
        .map(|(i, campaign)| CampaignView {
            campaign,
            viewer_contribution: contributions.as_ref().map(|c| c[i]),
        })
        .collect())
}

/// What the detail view renders for one campaign.
#[derive(Debug, Clone, Default)]
pub struct DetailSnapshot {
    pub campaign: Option<Campaign>,
    pub viewer_contribution: U256,
    pub error: Option<String>,
    pub loaded: bool,
}

/// Read model for one campaign plus the viewer's own contribution. Write
/// flows patch individual fields through the `apply_*` setters after a
/// confirmed transaction instead of reloading the whole record.
pub struct CampaignDetail {
    session: Arc<WalletSession>,
    source: Option<Arc<dyn CampaignSource>>,
    id: u64,
    state: RwLock<DetailSnapshot>,
}

impl CampaignDetail {
    pub fn new(session: Arc<WalletSession>, id: u64) -> Self {
        Self {
            session,
            source: None,
            id,
            state: RwLock::new(DetailSnapshot::default()),
        }
    }

    /// Detail view pinned to an explicit campaign source.
    pub fn with_source(
        session: Arc<WalletSession>,
        source: Arc<dyn CampaignSource>,
        id: u64,
    ) -> Self {
        Self {
            session,
            source: Some(source),
            id,
            state: RwLock::new(DetailSnapshot::default()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    async fn source(&self) -> Arc<dyn CampaignSource> {
        match &self.source {
            Some(source) => Arc::clone(source),
            None => {
                let handle: Arc<dyn CampaignSource> = self.session.contract().await;
                handle
            }
        }
    }

    pub async fn load(&self) -> ClientResult<()> {
        let epoch = self.session.epoch();
        let source = self.source().await;
        let account = self.session.account().await;

        let fetched = fetch_detail(source.as_ref(), self.id, account).await;

        let mut state = self.state.write().await;
        if self.session.epoch() != epoch {
            debug!(campaign = self.id, "discarding stale detail fetch");
            return Ok(());
        }
        match fetched {
            Ok((campaign, contribution)) => {
                state.campaign = Some(campaign);
                state.viewer_contribution = contribution;
                state.error = None;
                state.loaded = true;
                Ok(())
            }
            Err(e) => {
                warn!(campaign = self.id, error = %e, "campaign detail fetch failed");
                state.error = Some(DETAIL_LOAD_ERROR.to_string());
                state.loaded = true;
                Err(e)
            }
        }
    }

    pub async fn snapshot(&self) -> DetailSnapshot {
        self.state.read().await.clone()
    }

    pub async fn campaign(&self) -> Option<Campaign> {
        self.state.read().await.campaign.clone()
    }

    pub async fn viewer_contribution(&self) -> U256 {
        self.state.read().await.viewer_contribution
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn is_creator(&self) -> bool {
        let viewer = self.session.account().await;
        let state = self.state.read().await;
        match (viewer, &state.campaign) {
            (Some(viewer), Some(campaign)) => viewer == campaign.creator,
            _ => false,
        }
    }

    /// Whether the claim control should be shown to the current viewer
    /// right now.
    pub async fn can_claim_now(&self) -> bool {
        let viewer = self.session.account().await;
        let state = self.state.read().await;
        match (viewer, &state.campaign) {
            (Some(viewer), Some(campaign)) => campaign.can_claim(viewer, unix_now()),
            _ => false,
        }
    }

    pub(crate) async fn apply_raised(&self, raised: U256) {
        if let Some(campaign) = self.state.write().await.campaign.as_mut() {
            campaign.raised = raised;
        }
    }

    pub(crate) async fn apply_contribution(&self, amount: U256) {
        self.state.write().await.viewer_contribution = amount;
    }

    pub(crate) async fn apply_claimed(&self, claimed: bool) {
        if let Some(campaign) = self.state.write().await.campaign.as_mut() {
            campaign.claimed = claimed;
        }
    }

    #[cfg(test)]
    pub(crate) async fn set_campaign_for_tests(&self, campaign: Campaign, contribution: U256) {
        let mut state = self.state.write().await;
        state.campaign = Some(campaign);
        state.viewer_contribution = contribution;
        state.loaded = true;
    }
}

async fn fetch_detail(
    source: &dyn CampaignSource,
    id: u64,
    account: Option<Address>,
) -> ClientResult<(Campaign, U256)> {
    let campaign = source.campaign(id).await?;
    let contribution = match account {
        Some(who) => source.contribution(id, who).await?,
        None => U256::ZERO,
    };
    Ok((campaign, contribution))
}
