use thiserror::Error;

use crate::core::parse::ParseError;
use crate::process::ProcessError;
use crate::registry::RegistryError;

/// Errors surfaced by [`WalletService`](super::WalletService) operations.
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("wallet not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("wallet creation failed: {0}")]
    WalletCreationFailed(#[source] Box<WalletError>),

    #[error("balance unavailable: {0}")]
    BalanceUnavailable(#[source] ParseError),

    #[error("send output carried no importinput token")]
    TokenExtractionFailed,

    #[error("step '{step}' failed: {source}")]
    StepFailed {
        step: &'static str,
        #[source]
        source: ProcessError,
    },

    /// Send succeeded, the receiver's import chain did not. The token is
    /// what an operator needs to finish the import by hand.
    #[error("funds in flight to wallet {receiver}: import stopped at '{step}': {source}")]
    InFlight {
        receiver: u64,
        token: String,
        step: &'static str,
        #[source]
        source: ProcessError,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl WalletError {
    pub fn is_not_found(&self) -> bool { matches!(self, WalletError::NotFound(_)) }

    pub fn is_invalid_input(&self) -> bool { matches!(self, WalletError::InvalidInput(_)) }
}
