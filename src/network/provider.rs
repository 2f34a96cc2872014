// Node access abstraction

use async_trait::async_trait;

use super::rpc::{BalanceResult, CreateTxResult, TxStatusResult};
use crate::address::Address;
use crate::core::{TxPayload, TxReceipt};
use crate::error::Result;

/// Typed access to a Zilliqa node.
///
/// Implementations map transport failures to `Error::Network`. A refused
/// `create_transaction` is `Error::NodeRejected`; a transaction the node has
/// not processed yet is `Ok(None)` from `get_transaction`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Balance and last confirmed nonce of an account
    async fn get_balance(&self, address: &Address) -> Result<BalanceResult>;

    /// Broadcast a signed transaction
    async fn create_transaction(&self, payload: &TxPayload) -> Result<CreateTxResult>;

    /// Receipt of a processed transaction, `None` while pending
    async fn get_transaction(&self, tx_id: &str) -> Result<Option<TxReceipt>>;

    async fn get_transaction_status(&self, tx_id: &str) -> Result<TxStatusResult>;

    /// Current transaction block height
    async fn get_num_tx_blocks(&self) -> Result<u64>;
}
