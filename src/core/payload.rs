// JSON submission payload for CreateTransaction

use serde::{Deserialize, Serialize};

use super::transaction::{Transaction, TxStatus};
use crate::address::Address;
use crate::crypto::{parse_public_key_hex, Signature};
use crate::error::{Error, Result, ValidationError};

/// Wire form of a signed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxPayload {
    pub version: u32,
    pub nonce: u64,
    /// Checksummed hex without `0x`
    pub to_addr: String,
    /// Decimal Qa
    pub amount: String,
    pub pub_key: String,
    pub gas_price: String,
    pub gas_limit: u64,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub data: String,
    pub signature: String,
    #[serde(default)]
    pub priority: bool,
}

fn invalid(msg: impl Into<String>) -> Error {
    ValidationError::InvalidPayload(msg.into()).into()
}

fn parse_u128(field: &str, text: &str) -> Result<u128> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format!("{} must be a decimal integer, got {:?}", field, text)));
    }
    text.parse()
        .map_err(|_| invalid(format!("{} does not fit in 128 bits", field)))
}

impl TxPayload {
    /// Payload for a signed transaction
    pub fn from_transaction(tx: &Transaction) -> Result<Self> {
        let (pub_key, signature) = match (&tx.pub_key, &tx.signature) {
            (Some(key), Some(sig)) => (key, sig),
            _ => {
                return Err(ValidationError::InvalidTransaction(
                    "transaction must be signed before submission".to_string(),
                )
                .into())
            }
        };

        Ok(Self {
            version: tx.version,
            nonce: tx.nonce.unwrap_or(0),
            to_addr: tx.to_addr.to_checksum()[2..].to_string(),
            amount: tx.amount.to_string(),
            pub_key: hex::encode(pub_key.serialize()),
            gas_price: tx.gas_price.to_string(),
            gas_limit: tx.gas_limit,
            code: tx.code.clone(),
            data: tx.data.clone(),
            signature: signature.to_hex(),
            priority: tx.priority,
        })
    }
}

impl TryFrom<TxPayload> for Transaction {
    type Error = Error;

    /// Validate every field; the result is a signed transaction
    fn try_from(payload: TxPayload) -> Result<Self> {
        let to_addr = Address::from_hex(&payload.to_addr)
            .map_err(|e| invalid(format!("toAddr: {}", e)))?;
        let amount = parse_u128("amount", &payload.amount)?;
        let gas_price = parse_u128("gasPrice", &payload.gas_price)?;
        let pub_key = parse_public_key_hex(&payload.pub_key)
            .map_err(|e| invalid(format!("pubKey: {}", e)))?;
        let signature = Signature::from_hex(&payload.signature)
            .map_err(|e| invalid(format!("signature: {}", e)))?;

        Ok(Transaction {
            version: payload.version,
            nonce: Some(payload.nonce),
            to_addr,
            amount,
            gas_price,
            gas_limit: payload.gas_limit,
            code: payload.code,
            data: payload.data,
            priority: payload.priority,
            pub_key: Some(pub_key),
            signature: Some(signature),
            id: None,
            receipt: None,
            status: TxStatus::Initialised,
        })
    }
}

impl TryFrom<&Transaction> for TxPayload {
    type Error = Error;

    fn try_from(tx: &Transaction) -> Result<Self> {
        Self::from_transaction(tx)
    }
}
