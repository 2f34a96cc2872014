// Transaction submission and confirmation

use std::sync::Arc;
use std::time::Duration;

use super::status::TransactionStatus;
use crate::address::Address;
use crate::core::{Transaction, TxPayload};
use crate::error::{Error, Result, ValidationError};
use crate::network::{BalanceResult, Provider};
use crate::wallet::{SignMode, Signer};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 33;
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Polling budget for confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmOptions {
    pub max_attempts: u32,
    pub interval: Duration,
    /// Query the receipt only after the transaction block height advances
    pub block_confirm: bool,
}

impl Default for ConfirmOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            block_confirm: false,
        }
    }
}

/// Submits signed transactions and tracks them to a terminal receipt
#[derive(Clone)]
pub struct ChainClient {
    provider: Arc<dyn Provider>,
}

impl ChainClient {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Broadcast a signed transaction and return it with the node's id
    async fn submit(&self, tx: Transaction) -> Result<(Transaction, String)> {
        let payload = TxPayload::from_transaction(&tx)?;
        let result = self.provider.create_transaction(&payload).await?;
        log::info!("Submitted transaction {} ({})", result.tran_id, result.info);
        Ok((tx, result.tran_id))
    }

    /// Submit and poll until a receipt arrives or the budget runs out
    pub async fn create_transaction(&self, tx: Transaction, opts: &ConfirmOptions) -> Result<Transaction> {
        let (tx, tx_id) = self.submit(tx).await?;
        self.confirm(tx, tx_id, opts).await
    }

    /// Submit without waiting; the result is Pending with its id set
    pub async fn create_transaction_without_confirm(&self, tx: Transaction) -> Result<Transaction> {
        let (mut tx, tx_id) = self.submit(tx).await?;
        tx.set_pending(tx_id);
        Ok(tx)
    }

    /// Submit and confirm each transaction in order, stopping at the first failure
    pub async fn create_batch_transaction(
        &self,
        txs: Vec<Transaction>,
        opts: &ConfirmOptions,
    ) -> Result<Vec<Transaction>> {
        for tx in &txs {
            tx.require_signed()?;
        }

        let mut confirmed = Vec::with_capacity(txs.len());
        for tx in txs {
            confirmed.push(self.create_transaction(tx, opts).await?);
        }
        Ok(confirmed)
    }

    /// Submit each transaction in order without polling; all come back Pending
    pub async fn create_batch_transaction_without_confirm(&self, txs: Vec<Transaction>) -> Result<Vec<Transaction>> {
        for tx in &txs {
            tx.require_signed()?;
        }

        let mut pending = Vec::with_capacity(txs.len());
        for tx in txs {
            pending.push(self.create_transaction_without_confirm(tx).await?);
        }
        Ok(pending)
    }

    /// Submit a JSON payload signed elsewhere; returns the transaction id
    pub async fn create_transaction_raw(&self, payload: &str) -> Result<String> {
        let payload: TxPayload = serde_json::from_str(payload)
            .map_err(|e| ValidationError::InvalidPayload(e.to_string()))?;
        let tx = Transaction::try_from(payload)?;
        let (_, tx_id) = self.submit(tx).await?;
        Ok(tx_id)
    }

    /// Sign online with `signer`, then submit and confirm
    pub async fn sign_and_create(
        &self,
        signer: &dyn Signer,
        tx: Transaction,
        opts: &ConfirmOptions,
    ) -> Result<Transaction> {
        let signed = signer.sign(tx, SignMode::Online).await?;
        self.create_transaction(signed, opts).await
    }

    /// Poll for the receipt of an already submitted transaction.
    ///
    /// Failed or empty polls count as attempts. Dropping the future stops
    /// polling; it does not retract the broadcast.
    pub async fn confirm(&self, mut tx: Transaction, tx_id: String, opts: &ConfirmOptions) -> Result<Transaction> {
        tx.set_pending(tx_id.clone());
        let mut last_height: Option<u64> = None;

        for attempt in 0..opts.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(opts.interval).await;
            }

            if opts.block_confirm {
                match self.provider.get_num_tx_blocks().await {
                    Ok(height) if last_height.is_some_and(|last| height <= last) => {
                        log::debug!("Block height still {}, skipping receipt query", height);
                        continue;
                    }
                    Ok(height) => last_height = Some(height),
                    Err(e) => log::warn!("Could not read block height: {}", e),
                }
            }

            match self.provider.get_transaction(&tx_id).await {
                Ok(Some(receipt)) => {
                    tx.set_receipt(receipt);
                    log::info!("Transaction {} is {} after {} attempts", tx_id, tx.status, attempt + 1);
                    return Ok(tx);
                }
                Ok(None) => log::debug!("Transaction {} pending (attempt {})", tx_id, attempt + 1),
                Err(e) => log::warn!("Polling transaction {} failed: {}", tx_id, e),
            }
        }

        Err(Error::ConfirmationTimeout {
            tx_id,
            attempts: opts.max_attempts,
        })
    }

    pub async fn get_transaction_status(&self, tx_id: &str) -> Result<TransactionStatus> {
        Ok(self.provider.get_transaction_status(tx_id).await?.into())
    }

    pub async fn get_balance(&self, address: &Address) -> Result<BalanceResult> {
        self.provider.get_balance(address).await
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ChainClient").finish_non_exhaustive()
    }
}
