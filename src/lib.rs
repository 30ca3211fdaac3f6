// src/lib.rs
pub mod campaigns;
pub mod contract;
pub mod error;
pub mod flows;
pub mod session;
pub mod theme;
pub mod types;
pub mod units;

pub use error::{ClientError, ClientResult};
pub use types::{Campaign, CampaignStatus, CampaignView, ClientConfig, WalletEvent};

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::campaigns::{CampaignDetail, CampaignReader};
use crate::flows::{ClaimFlow, ContributeFlow, CreateCampaignInput, CreateFlow};
use crate::session::{WalletConnector, WalletSession};
use crate::theme::ThemeStore;

/// Top-level client wiring the wallet session, campaign read models, write
/// flows and theme preference together behind one handle.
pub struct CrowdfundClient {
    session: Arc<WalletSession>,
    campaigns: CampaignReader,
    create: CreateFlow,
    contribute: ContributeFlow,
    claim: ClaimFlow,
    themes: ThemeStore,
}

impl CrowdfundClient {
    /// Create a new client. `connector` of `None` models an environment
    /// without a wallet; reads still work through the read-only binding.
    pub fn new(
        config: ClientConfig,
        connector: Option<Arc<dyn WalletConnector>>,
    ) -> ClientResult<Self> {
        let themes = ThemeStore::load(&config.theme_path);
        let session = Arc::new(WalletSession::new(config, connector)?);
        Ok(Self {
            campaigns: CampaignReader::new(Arc::clone(&session)),
            create: CreateFlow::new(Arc::clone(&session)),
            contribute: ContributeFlow::new(Arc::clone(&session)),
            claim: ClaimFlow::new(Arc::clone(&session)),
            session,
            themes,
        })
    }

    pub fn session(&self) -> &Arc<WalletSession> {
        &self.session
    }

    /// Connect the wallet and refresh the campaign list under the new
    /// signer. Connection problems are logged, not raised (see
    /// `WalletSession::connect`); a failed refresh records a list error.
    pub async fn connect(&self) {
        self.session.connect().await;
        if self.session.is_connected().await {
            let _ = self.campaigns.refresh().await;
        }
    }

    /// Start handling external wallet notifications (account switch,
    /// network switch) for the lifetime of the returned task.
    pub fn spawn_wallet_listener(&self) -> Option<JoinHandle<()>> {
        self.session.spawn_listener()
    }

    pub fn campaigns(&self) -> &CampaignReader {
        &self.campaigns
    }

    /// Fresh read model for one campaign's detail view.
    pub fn campaign_detail(&self, id: u64) -> CampaignDetail {
        CampaignDetail::new(Arc::clone(&self.session), id)
    }

    /// Create a campaign and refresh the list on success.
    pub async fn create_campaign(&self, input: CreateCampaignInput) -> ClientResult<()> {
        self.create.submit(&self.campaigns, input).await
    }

    pub fn create_flow(&self) -> &CreateFlow {
        &self.create
    }

    /// Contribute `amount` (decimal ETH string) to the campaign shown in
    /// `detail`.
    pub async fn contribute(&self, detail: &CampaignDetail, amount: &str) -> ClientResult<()> {
        self.contribute.submit(detail, amount).await
    }

    pub fn contribute_flow(&self) -> &ContributeFlow {
        &self.contribute
    }

    /// Claim the funds of the campaign shown in `detail`.
    pub async fn claim(&self, detail: &CampaignDetail) -> ClientResult<()> {
        self.claim.submit(detail).await
    }

    pub fn claim_flow(&self) -> &ClaimFlow {
        &self.claim
    }

    pub fn themes(&self) -> &ThemeStore {
        &self.themes
    }
}
