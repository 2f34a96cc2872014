// Node-reported transaction status

use serde_json::{Map, Value};

use crate::network::TxStatusResult;

/// Human-readable meaning of a `(modificationState, status)` pair
pub fn status_message(modification_state: u8, status: u8) -> Option<&'static str> {
    let message = match (modification_state, status) {
        (0, 0) => "Transaction not found",
        (0, 1) => "Pending - Dispatched",
        (1, 2) => "Pending - Soft-confirmed (awaiting Tx block generation)",
        (1, 4) => "Pending - Nonce is higher than expected",
        (1, 5) => "Pending - Microblock gas limit exceeded",
        (1, 6) => "Pending - Consensus failure in network",
        (2, 3) => "Confirmed",
        (2, 10) => "Rejected - Transaction caused math error",
        (2, 11) => "Rejected - Scilla invocation error",
        (2, 12) => "Rejected - Contract account initialization error",
        (2, 13) => "Rejected - Invalid source account",
        (2, 14) => "Rejected - Gas limit higher than shard gas limit",
        (2, 15) => "Rejected - Unknown transaction type",
        (2, 16) => "Rejected - Transaction sent to wrong shard",
        (2, 17) => "Rejected - Contract & source account cross-shard issue",
        (2, 18) => "Rejected - Code size exceeded limit",
        (2, 19) => "Rejected - Transaction verification failed",
        (2, 20) => "Rejected - Gas limit too low",
        (2, 21) => "Rejected - Insufficient balance",
        (2, 22) => "Rejected - Insufficient gas to invoke Scilla checker",
        (2, 23) => "Rejected - Duplicate transaction exists",
        (2, 24) => "Rejected - Transaction with higher gas price exists",
        (2, 25) => "Rejected - Invalid destination address",
        (2, 26) => "Rejected - Failed to add contract account to state",
        (2, 27) => "Rejected - Nonce is lower than expected",
        (2, 255) => "Rejected - Internal error",
        _ => return None,
    };
    Some(message)
}

/// Status of a transaction as the node sees it
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionStatus {
    pub id: String,
    pub modification_state: u8,
    pub status: u8,
    pub success: bool,
    pub message: String,
    pub extra: Map<String, Value>,
}

impl TransactionStatus {
    pub fn is_pending(&self) -> bool {
        self.modification_state < 2
    }

    pub fn is_confirmed(&self) -> bool {
        self.modification_state == 2 && self.status == 3
    }

    pub fn is_rejected(&self) -> bool {
        self.modification_state == 2 && self.status != 3
    }
}

impl From<TxStatusResult> for TransactionStatus {
    fn from(result: TxStatusResult) -> Self {
        let message = status_message(result.modification_state, result.status)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!("Unknown status ({}, {})", result.modification_state, result.status)
            });

        Self {
            id: result.id,
            modification_state: result.modification_state,
            status: result.status,
            success: result.success,
            message,
            extra: result.extra,
        }
    }
}
