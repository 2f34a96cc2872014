// In-memory provider for unit tests

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Map;
use tokio::time::Instant;

use super::provider::Provider;
use super::rpc::{BalanceResult, CreateTxResult, TxStatusResult};
use crate::address::Address;
use crate::core::{TxPayload, TxReceipt};
use crate::error::{Error, Result};

#[derive(Default)]
struct MockState {
    balance: u128,
    nonce: u64,
    balance_calls: usize,
    submissions: Vec<TxPayload>,
    reject: Option<(i64, String)>,
    /// `Some(k)`: k pending polls then a receipt; `None`: never processed
    pending_polls: Option<u32>,
    failed_polls: u32,
    receipt_success: bool,
    receipt_polls: Vec<Instant>,
    heights: Vec<u64>,
    height_calls: usize,
}

/// Provider that answers from memory and records every call
pub struct MockProvider {
    state: Mutex<MockState>,
}

impl MockProvider {
    pub fn new(balance: u128, nonce: u64) -> Self {
        Self {
            state: Mutex::new(MockState {
                balance,
                nonce,
                pending_polls: Some(0),
                receipt_success: true,
                ..Default::default()
            }),
        }
    }

    fn with(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    /// Report `polls` pending answers before the receipt
    pub fn with_pending_polls(self, polls: u32) -> Self {
        self.with(|s| s.pending_polls = Some(polls))
    }

    pub fn never_confirming(self) -> Self {
        self.with(|s| s.pending_polls = None)
    }

    /// The first `polls` receipt queries fail at the transport level
    pub fn with_failed_polls(self, polls: u32) -> Self {
        self.with(|s| s.failed_polls = polls)
    }

    pub fn with_failed_receipt(self) -> Self {
        self.with(|s| s.receipt_success = false)
    }

    pub fn rejecting(self, code: i64, message: &str) -> Self {
        let message = message.to_string();
        self.with(|s| s.reject = Some((code, message)))
    }

    /// Block heights returned by successive `GetNumTxBlocks` calls; the last repeats
    pub fn with_heights(self, heights: Vec<u64>) -> Self {
        self.with(|s| s.heights = heights)
    }

    pub fn balance_calls(&self) -> usize {
        self.state.lock().unwrap().balance_calls
    }

    pub fn submissions(&self) -> Vec<TxPayload> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn receipt_polls(&self) -> Vec<Instant> {
        self.state.lock().unwrap().receipt_polls.clone()
    }

    pub fn height_calls(&self) -> usize {
        self.state.lock().unwrap().height_calls
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn get_balance(&self, _address: &Address) -> Result<BalanceResult> {
        let mut state = self.state.lock().unwrap();
        state.balance_calls += 1;
        Ok(BalanceResult {
            balance: state.balance.to_string(),
            nonce: state.nonce,
        })
    }

    async fn create_transaction(&self, payload: &TxPayload) -> Result<CreateTxResult> {
        let mut state = self.state.lock().unwrap();
        if let Some((code, message)) = state.reject.clone() {
            return Err(Error::NodeRejected { code, message });
        }
        state.submissions.push(payload.clone());
        Ok(CreateTxResult {
            info: "Non-contract txn, sent to shard".to_string(),
            tran_id: format!("{:064x}", state.submissions.len()),
            contract_address: None,
        })
    }

    async fn get_transaction(&self, _tx_id: &str) -> Result<Option<TxReceipt>> {
        let mut state = self.state.lock().unwrap();
        state.receipt_polls.push(Instant::now());
        let polled = state.receipt_polls.len() as u32;

        if polled <= state.failed_polls {
            return Err(Error::Network("connection reset".to_string()));
        }

        match state.pending_polls {
            Some(pending) if polled > pending => Ok(Some(TxReceipt {
                success: state.receipt_success,
                cumulative_gas: 50,
                epoch_num: 100 + polled as u64,
                event_logs: Vec::new(),
                extra: Map::new(),
            })),
            _ => Ok(None),
        }
    }

    async fn get_transaction_status(&self, tx_id: &str) -> Result<TxStatusResult> {
        Ok(TxStatusResult {
            id: tx_id.to_string(),
            modification_state: 2,
            status: 3,
            success: true,
            extra: Map::new(),
        })
    }

    async fn get_num_tx_blocks(&self) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let i = state.height_calls.min(state.heights.len().saturating_sub(1));
        state.height_calls += 1;
        Ok(state.heights.get(i).copied().unwrap_or(0))
    }
}
