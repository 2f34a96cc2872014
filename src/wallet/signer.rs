// Signing capability

use async_trait::async_trait;

use crate::core::Transaction;
use crate::error::Result;

/// Whether the signer may query the node for balance and nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignMode {
    #[default]
    Online,
    /// No network access; the transaction must carry its nonce
    Offline,
}

/// Anything that can turn an unsigned transaction into a signed one
#[async_trait]
pub trait Signer: Send + Sync {
    async fn sign(&self, tx: Transaction, mode: SignMode) -> Result<Transaction>;
}
