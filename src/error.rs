use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    // Connection errors
    #[error("No wallet available")]
    WalletUnavailable,

    #[error("Wallet connection rejected: {0}")]
    ConnectionRejected(String),

    #[error("Wallet not connected")]
    NotConnected,

    // Read errors
    #[error("Read failed: {0}")]
    ReadError(String),

    #[error("Campaign not found: {0}")]
    CampaignNotFound(u64),

    // Write errors
    #[error("Transaction rejected: {0}")]
    TxRejected(String),

    #[error("Transaction failed: {0}")]
    TxFailed(String),

    #[error("Operation already in progress")]
    FlowBusy,

    // Validation errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Only the campaign creator can claim")]
    NotCreator,

    #[error("Campaign deadline has not passed")]
    NotExpired,

    #[error("Campaign has expired")]
    CampaignExpired,

    #[error("Funds already claimed")]
    AlreadyClaimed,

    // Storage errors
    #[error("Persistence error: {0}")]
    PersistError(String),

    // Numeric errors
    #[error("Value out of range: {0}")]
    Overflow(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ClientError {
    /// Check if error is retryable by re-running the same action
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::ReadError(_)
            | ClientError::TxRejected(_)
            | ClientError::TxFailed(_)
            | ClientError::FlowBusy => true,
            _ => false,
        }
    }

    /// Get error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            ClientError::WalletUnavailable
            | ClientError::ConnectionRejected(_)
            | ClientError::NotConnected => "connection",

            ClientError::ReadError(_) | ClientError::CampaignNotFound(_) => "read",

            ClientError::TxRejected(_)
            | ClientError::TxFailed(_)
            | ClientError::FlowBusy => "write",

            ClientError::InvalidInput(_)
            | ClientError::InvalidAmount(_)
            | ClientError::NotCreator
            | ClientError::NotExpired
            | ClientError::CampaignExpired
            | ClientError::AlreadyClaimed => "validation",

            ClientError::PersistError(_) => "storage",

            ClientError::Overflow(_) => "numeric",

            ClientError::InvalidConfiguration(_) => "configuration",
        }
    }

    /// Message suitable for direct display to the user. Transaction errors
    /// keep the underlying reason when one exists, read errors collapse to
    /// a generic line.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::WalletUnavailable => {
                "Please install a wallet extension to continue".to_string()
            }
            ClientError::NotConnected => "Please connect your wallet first".to_string(),
            ClientError::ReadError(_) => "Failed to fetch campaigns".to_string(),
            ClientError::TxRejected(msg) | ClientError::TxFailed(msg) => {
                if msg.trim().is_empty() {
                    "Transaction failed. Please try again.".to_string()
                } else {
                    msg.clone()
                }
            }
            other => other.to_string(),
        }
    }
}

// Result type alias for convenience
pub type ClientResult<T> = Result<T, ClientError>;
