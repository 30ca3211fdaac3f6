// src/session/mod.rs
pub mod local;

pub use local::LocalConnector;

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::contract::CrowdfundingHandle;
use crate::error::{ClientError, ClientResult};
use crate::types::{ClientConfig, WalletEvent};

/// Seam to the user's wallet. In the browser this is the injected provider;
/// here it is any signer-capable backend that can hand out accounts and
/// push account/network change notifications.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Ask the wallet for account access; the first returned account becomes
    /// the session account.
    async fn request_accounts(&self) -> ClientResult<Vec<Address>>;

    /// Wallet credential used to sign transactions for the current account.
    fn signer_wallet(&self) -> ClientResult<EthereumWallet>;

    /// Subscribe to account-changed / chain-changed notifications.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}

struct SessionState {
    account: Option<Address>,
    connected: bool,
    contract: Arc<CrowdfundingHandle>,
    notice: Option<String>,
}

/// Connected-wallet session: holds the current account, connection flag and
/// the contract handle bound to the current signer. The handle is replaced
/// wholesale whenever the signer changes; dependents watch `epoch()` to know
/// their cached reads are stale.
pub struct WalletSession {
    config: ClientConfig,
    connector: Option<Arc<dyn WalletConnector>>,
    state: RwLock<SessionState>,
    epoch: AtomicU64,
    listener_started: AtomicBool,
}

impl WalletSession {
    /// Create an empty session. `connector` of `None` models a browser with
    /// no wallet extension installed: campaigns stay readable through the
    /// read-only handle, and `connect` surfaces an install notice instead.
    pub fn new(
        config: ClientConfig,
        connector: Option<Arc<dyn WalletConnector>>,
    ) -> ClientResult<Self> {
        let contract = Arc::new(CrowdfundingHandle::read_only(
            config.contract_address,
            &config.rpc_url,
        )?);
        Ok(Self {
            config,
            connector,
            state: RwLock::new(SessionState {
                account: None,
                connected: false,
                contract,
                notice: None,
            }),
            epoch: AtomicU64::new(0),
            listener_started: AtomicBool::new(false),
        })
    }

    /// Request account access and bind the contract to the wallet signer.
    /// Never raises to the caller: a missing wallet stores a user-facing
    /// install notice, any other failure is logged and the session stays in
    /// its previous state.
    pub async fn connect(&self) {
        let Some(connector) = self.connector.clone() else {
            warn!("no wallet connector available");
            self.state.write().await.notice = Some(ClientError::WalletUnavailable.user_message());
            return;
        };

        let accounts = match connector.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                error!(error = %e, "error connecting wallet");
                return;
            }
        };
        let Some(account) = accounts.first().copied() else {
            error!("wallet returned no accounts");
            return;
        };

        if let Err(e) = self.bind_account(account, connector.as_ref()).await {
            error!(error = %e, "error binding wallet signer");
        }
    }

    /// Run the wallet notification pump for the lifetime of the session.
    /// Returns `None` when there is no connector to listen to, or when a
    /// pump is already running; a second pump would handle every event
    /// twice.
    pub fn spawn_listener(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let connector = self.connector.clone()?;
        if self.listener_started.swap(true, Ordering::SeqCst) {
            warn!("wallet listener already running");
            return None;
        }
        let session = Arc::clone(self);
        let mut events = connector.subscribe();
        Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(WalletEvent::AccountsChanged(accounts)) => {
                        session.handle_accounts_changed(accounts).await;
                    }
                    Ok(WalletEvent::ChainChanged(chain_id)) => {
                        session.handle_chain_changed(chain_id).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "wallet event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }))
    }

    pub async fn account(&self) -> Option<Address> {
        self.state.read().await.account
    }

    pub async fn is_connected(&self) -> bool {
        self.state.read().await.connected
    }

    /// Current contract handle; read-only-bound when no wallet is connected.
    pub async fn contract(&self) -> Arc<CrowdfundingHandle> {
        Arc::clone(&self.state.read().await.contract)
    }

    /// User-facing notice, currently only the install-a-wallet instruction.
    pub async fn notice(&self) -> Option<String> {
        self.state.read().await.notice.clone()
    }

    /// Monotonic counter bumped whenever the account, signer or network
    /// changes. In-flight fetches that started under an older epoch must
    /// discard their results instead of applying them.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn bump_epoch(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    async fn bind_account(
        &self,
        account: Address,
        connector: &dyn WalletConnector,
    ) -> ClientResult<()> {
        let wallet = connector.signer_wallet()?;
        let contract = Arc::new(CrowdfundingHandle::with_wallet(
            self.config.contract_address,
            &self.config.rpc_url,
            wallet,
        )?);

        let mut state = self.state.write().await;
        state.account = Some(account);
        state.connected = true;
        state.contract = contract;
        state.notice = None;
        drop(state);

        self.bump_epoch();
        info!(%account, "wallet connected");
        Ok(())
    }

    async fn handle_accounts_changed(&self, accounts: Vec<Address>) {
        match accounts.first().copied() {
            Some(account) => {
                if self.state.read().await.account == Some(account) {
                    return;
                }
                let Some(connector) = self.connector.clone() else {
                    return;
                };
                debug!(%account, "wallet account changed");
                if let Err(e) = self.bind_account(account, connector.as_ref()).await {
                    error!(error = %e, "error rebinding after account change");
                }
            }
            None => {
                // Wallet locked or disconnected every account.
                info!("wallet disconnected all accounts");
                self.reset().await;
            }
        }
    }

    async fn handle_chain_changed(&self, chain_id: u64) {
        // Chain-specific addresses and the bound handle are now invalid;
        // drop everything and make dependents reload from scratch.
        warn!(chain_id, "network changed, resetting session");
        self.reset().await;
    }

    async fn reset(&self) {
        let contract = match CrowdfundingHandle::read_only(
            self.config.contract_address,
            &self.config.rpc_url,
        ) {
            Ok(handle) => Arc::new(handle),
            Err(e) => {
                // Config was already validated at construction.
                error!(error = %e, "error rebuilding read-only handle");
                return;
            }
        };

        let mut state = self.state.write().await;
        state.account = None;
        state.connected = false;
        state.contract = contract;
        state.notice = None;
        drop(state);

        self.bump_epoch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use alloy::signers::local::PrivateKeySigner;

    struct RejectingConnector;

    #[async_trait]
    impl WalletConnector for RejectingConnector {
        async fn request_accounts(&self) -> ClientResult<Vec<Address>> {
            Err(ClientError::ConnectionRejected("user denied".to_string()))
        }

        fn signer_wallet(&self) -> ClientResult<EthereumWallet> {
            Err(ClientError::ConnectionRejected("user denied".to_string()))
        }

        fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
            broadcast::channel(1).1
        }
    }

    fn session_with(connector: Option<Arc<dyn WalletConnector>>) -> WalletSession {
        WalletSession::new(ClientConfig::default(), connector).unwrap()
    }

    #[tokio::test]
    async fn test_starts_empty() {
        let session = session_with(None);
        assert_eq!(session.account().await, None);
        assert!(!session.is_connected().await);
        assert_eq!(session.epoch(), 0);
    }

    #[tokio::test]
    async fn test_connect_without_wallet_sets_install_notice() {
        let session = session_with(None);
        session.connect().await;

        assert!(!session.is_connected().await);
        assert_eq!(
            session.notice().await,
            Some(ClientError::WalletUnavailable.user_message())
        );
    }

    #[tokio::test]
    async fn test_connect_with_local_connector() {
        let connector = Arc::new(LocalConnector::new(PrivateKeySigner::random()));
        let expected = connector.address();
        let session = session_with(Some(connector));

        session.connect().await;

        assert!(session.is_connected().await);
        assert_eq!(session.account().await, Some(expected));
        assert_eq!(session.notice().await, None);
        assert_eq!(session.epoch(), 1);
    }

    #[tokio::test]
    async fn test_rejection_is_swallowed() {
        let session = session_with(Some(Arc::new(RejectingConnector)));
        session.connect().await;

        assert!(!session.is_connected().await);
        assert_eq!(session.account().await, None);
    }

    #[tokio::test]
    async fn test_empty_accounts_event_disconnects() {
        let connector = Arc::new(LocalConnector::new(PrivateKeySigner::random()));
        let session = session_with(Some(connector));
        session.connect().await;
        assert!(session.is_connected().await);
        let epoch_before = session.epoch();

        session.handle_accounts_changed(vec![]).await;

        assert!(!session.is_connected().await);
        assert_eq!(session.account().await, None);
        assert!(session.epoch() > epoch_before);
    }

    #[tokio::test]
    async fn test_same_account_event_is_ignored() {
        let connector = Arc::new(LocalConnector::new(PrivateKeySigner::random()));
        let account = connector.address();
        let session = session_with(Some(connector));
        session.connect().await;
        let epoch_before = session.epoch();

        session.handle_accounts_changed(vec![account]).await;

        assert_eq!(session.epoch(), epoch_before);
        assert_eq!(session.account().await, Some(account));
    }

    #[tokio::test]
    async fn test_chain_change_resets_session() {
        let connector = Arc::new(LocalConnector::new(PrivateKeySigner::random()));
        let session = session_with(Some(connector));
        session.connect().await;
        let epoch_before = session.epoch();

        session.handle_chain_changed(5).await;

        assert!(!session.is_connected().await);
        assert_eq!(session.account().await, None);
        assert!(session.epoch() > epoch_before);
    }

    #[tokio::test]
    async fn test_listener_receives_events() {
        let connector = Arc::new(LocalConnector::new(PrivateKeySigner::random()));
        let session = Arc::new(session_with(Some(connector.clone())));
        session.connect().await;

        let handle = session.spawn_listener().unwrap();
        connector.emit_chain_changed(5);

        // Give the pump a moment to drain the event.
        for _ in 0..50 {
            if !session.is_connected().await {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(!session.is_connected().await);
        handle.abort();
    }

    #[tokio::test]
    async fn test_listener_spawns_at_most_once() {
        let connector = Arc::new(LocalConnector::new(PrivateKeySigner::random()));
        let session = Arc::new(session_with(Some(connector)));

        let handle = session.spawn_listener();
        assert!(handle.is_some());
        assert!(session.spawn_listener().is_none());
        handle.unwrap().abort();
    }

    #[tokio::test]
    async fn test_listener_needs_a_connector() {
        let session = Arc::new(session_with(None));
        assert!(session.spawn_listener().is_none());
    }
}
