use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::{ClientError, ClientResult};
use crate::session::WalletConnector;
use crate::types::WalletEvent;

const EVENT_CAPACITY: usize = 16;

/// In-process wallet backed by a single private-key signer. Stands in for a
/// browser extension in tools and tests; the `emit_*` methods play the role
/// of the extension pushing notifications.
pub struct LocalConnector {
    signer: PrivateKeySigner,
    events: broadcast::Sender<WalletEvent>,
}

impl LocalConnector {
    pub fn new(signer: PrivateKeySigner) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { signer, events }
    }

    pub fn from_private_key(key: &str) -> ClientResult<Self> {
        let signer: PrivateKeySigner = key
            .trim()
            .parse()
            .map_err(|e| ClientError::InvalidConfiguration(format!("bad private key: {e}")))?;
        Ok(Self::new(signer))
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Simulate the wallet switching accounts (empty list = locked).
    pub fn emit_accounts_changed(&self, accounts: Vec<Address>) {
        let _ = self.events.send(WalletEvent::AccountsChanged(accounts));
    }

    /// Simulate the wallet switching networks.
    pub fn emit_chain_changed(&self, chain_id: u64) {
        let _ = self.events.send(WalletEvent::ChainChanged(chain_id));
    }
}

#[async_trait]
impl WalletConnector for LocalConnector {
    async fn request_accounts(&self) -> ClientResult<Vec<Address>> {
        Ok(vec![self.signer.address()])
    }

    fn signer_wallet(&self) -> ClientResult<EthereumWallet> {
        Ok(EthereumWallet::from(self.signer.clone()))
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}
