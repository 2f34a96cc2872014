// JSON-RPC envelope and node result types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::TxReceipt;
use crate::error::{Error, Result, ValidationError};

/// Node methods this client calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    GetBalance,
    CreateTransaction,
    GetTransaction,
    GetTransactionStatus,
    GetNumTxBlocks,
}

impl RpcMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcMethod::GetBalance => "GetBalance",
            RpcMethod::CreateTransaction => "CreateTransaction",
            RpcMethod::GetTransaction => "GetTransaction",
            RpcMethod::GetTransactionStatus => "GetTransactionStatus",
            RpcMethod::GetNumTxBlocks => "GetNumTxBlocks",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "GetBalance" => Some(RpcMethod::GetBalance),
            "CreateTransaction" => Some(RpcMethod::CreateTransaction),
            "GetTransaction" => Some(RpcMethod::GetTransaction),
            "GetTransactionStatus" => Some(RpcMethod::GetTransactionStatus),
            "GetNumTxBlocks" => Some(RpcMethod::GetNumTxBlocks),
            _ => None,
        }
    }
}

/// Request envelope
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub id: &'static str,
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(method: RpcMethod, params: Vec<Value>) -> Self {
        Self {
            id: "1",
            jsonrpc: "2.0",
            method: method.as_str(),
            params,
        }
    }
}

/// Error object carried by a failed call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Response envelope; exactly one of `result` or `error` is set
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub jsonrpc: Option<String>,
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

impl<T> RpcResponse<T> {
    pub fn into_result(self) -> Result<T> {
        if let Some(err) = self.error {
            return Err(Error::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        self.result.ok_or_else(|| Error::Rpc {
            code: 0,
            message: "response has neither result nor error".to_string(),
        })
    }
}

/// `GetBalance` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResult {
    /// Decimal Qa
    pub balance: String,
    pub nonce: u64,
}

impl BalanceResult {
    pub fn balance_qa(&self) -> Result<u128> {
        self.balance.trim().parse().map_err(|_| {
            ValidationError::InvalidPayload(format!("balance is not a decimal integer: {}", self.balance))
                .into()
        })
    }
}

/// `CreateTransaction` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTxResult {
    #[serde(rename = "Info", default)]
    pub info: String,
    #[serde(rename = "TranID")]
    pub tran_id: String,
    #[serde(rename = "ContractAddress", default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

/// `GetTransaction` result
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionObject {
    #[serde(rename = "ID")]
    pub id: String,
    pub receipt: TxReceipt,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GetTransactionStatus` result
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TxStatusResult {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "modificationState")]
    pub modification_state: u8,
    pub status: u8,
    #[serde(default)]
    pub success: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
