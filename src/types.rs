// src/types.rs
use alloy::primitives::{Address, U256, address};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::units;

/// One campaign record as reported by the contract. The client holds
/// read-only, possibly-stale copies; `raised` and `claimed` are only ever
/// replaced by fresh reads, never computed locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: u64,
    pub creator: Address,
    pub title: String,
    pub description: String,
    /// Goal in wei
    pub goal: U256,
    /// Raised so far, in wei
    pub raised: U256,
    /// Unix timestamp (seconds)
    pub deadline: u64,
    pub claimed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignStatus {
    Claimed,
    Expired,
    GoalReached,
    Active,
}

impl CampaignStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CampaignStatus::Claimed => "Funds Claimed",
            CampaignStatus::Expired => "Expired",
            CampaignStatus::GoalReached => "Goal Reached",
            CampaignStatus::Active => "Active",
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Campaign {
    /// Percent funded, unclamped (text display). A zero goal reads as 0%.
    pub fn percent_funded(&self) -> f64 {
        if self.goal.is_zero() {
            return 0.0;
        }
        units::approx_ether(self.raised) / units::approx_ether(self.goal) * 100.0
    }

    /// Percent funded clamped to [0, 100] for progress bars.
    pub fn progress_display(&self) -> f64 {
        self.percent_funded().clamp(0.0, 100.0)
    }

    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.deadline
    }

    /// Status with priority claimed > expired > goal-reached > active.
    pub fn status_at(&self, now: u64) -> CampaignStatus {
        if self.claimed {
            CampaignStatus::Claimed
        } else if self.is_expired_at(now) {
            CampaignStatus::Expired
        } else if self.raised >= self.goal {
            CampaignStatus::GoalReached
        } else {
            CampaignStatus::Active
        }
    }

    /// Whether the claim control applies for `viewer`: creator only, after
    /// the deadline, while unclaimed. Reaching the goal is not required;
    /// the contract has the final say on the transaction itself.
    pub fn can_claim(&self, viewer: Address, now: u64) -> bool {
        viewer == self.creator && self.is_expired_at(now) && !self.claimed
    }
}

/// A campaign as presented in list or detail views, paired with the
/// connected account's own contribution when one is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignView {
    pub campaign: Campaign,
    /// Viewer's cumulative contribution in wei; None when no wallet is
    /// connected.
    pub viewer_contribution: Option<U256>,
}

/// External wallet notifications, mirroring the provider events a browser
/// extension emits.
#[derive(Debug, Clone)]
pub enum WalletEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub contract_address: Address,
    /// Where the selected theme name is persisted.
    pub theme_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            // Local devnet deployment
            rpc_url: "http://127.0.0.1:8545".to_string(),
            contract_address: address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
            theme_path: PathBuf::from("theme.json"),
        }
    }
}
