// Error types

use crate::address::Address;
use thiserror::Error;

/// Malformed input detected before anything touches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Crate-wide error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("You do not have enough funds, need {need} but only have {have}")]
    InsufficientFunds { need: u128, have: u128 },

    #[error("This wallet has no default account")]
    NoDefaultAccount,

    #[error("Could not sign the transaction with {0} as it does not exist")]
    UnknownSigner(Address),

    #[error("No nonce detected in tx params when signing in offline mode")]
    NonceRequiredOffline,

    #[error("Network error: {0}")]
    Network(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Node rejected transaction ({code}): {message}")]
    NodeRejected { code: i64, message: String },

    #[error("Transaction {tx_id} is still not confirmed after {attempts} attempts")]
    ConfirmationTimeout { tx_id: String, attempts: u32 },

    #[error("Keystore error: {0}")]
    Keystore(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Whether a caller may sensibly try the same operation again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Network(_) | Error::ConfirmationTimeout { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::Network("connection refused".into()).is_retryable());
        assert!(Error::ConfirmationTimeout { tx_id: "ab".into(), attempts: 3 }.is_retryable());
        assert!(!Error::NodeRejected { code: -26, message: "bad nonce".into() }.is_retryable());
        assert!(!Error::InsufficientFunds { need: 2, have: 1 }.is_retryable());
    }

    #[test]
    fn test_validation_wraps_transparently() {
        let err: Error = ValidationError::InvalidAddress("too short".into()).into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Invalid address: too short");
    }
}
