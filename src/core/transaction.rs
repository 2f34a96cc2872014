// Transaction data structures

use std::fmt;

use secp256k1::PublicKey;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::codec::{self, TxCore, EMPTY_PUBKEY};
use crate::address::Address;
use crate::crypto::{schnorr, Signature};
use crate::error::{Result, ValidationError};

/// Lifecycle of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TxStatus {
    #[default]
    Initialised,
    Pending,
    Confirmed,
    Rejected,
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Confirmed | TxStatus::Rejected)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            TxStatus::Initialised => "initialised",
            TxStatus::Pending => "pending",
            TxStatus::Confirmed => "confirmed",
            TxStatus::Rejected => "rejected",
        };
        write!(f, "{}", name)
    }
}

/// Nodes report counters either as JSON numbers or decimal strings
fn u64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Number(u64),
        Text(String),
    }

    match Lenient::deserialize(deserializer)? {
        Lenient::Number(n) => Ok(n),
        Lenient::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Terminal record a node returns for a processed transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub success: bool,
    #[serde(default, deserialize_with = "u64_lenient")]
    pub cumulative_gas: u64,
    #[serde(default, deserialize_with = "u64_lenient")]
    pub epoch_num: u64,
    #[serde(default)]
    pub event_logs: Vec<Value>,
    /// Anything else the node attaches (transitions, errors, exceptions)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A transfer or contract call, unsigned until a wallet signs it
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub version: u32,
    pub nonce: Option<u64>,
    pub to_addr: Address,
    pub amount: u128,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub code: String,
    pub data: String,
    /// Route through the DS committee
    pub priority: bool,
    pub pub_key: Option<PublicKey>,
    pub signature: Option<Signature>,
    pub id: Option<String>,
    pub receipt: Option<TxReceipt>,
    pub status: TxStatus,
}

impl Transaction {
    pub fn builder(to_addr: Address) -> TransactionBuilder {
        TransactionBuilder::new(to_addr)
    }

    /// The fields covered by the signature
    pub fn core(&self) -> TxCore {
        TxCore {
            version: self.version,
            nonce: self.nonce.unwrap_or(0),
            to_addr: self.to_addr,
            sender_pubkey: match &self.pub_key {
                Some(key) => key.serialize().to_vec(),
                None => EMPTY_PUBKEY.to_vec(),
            },
            amount: self.amount,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            code: self.code.clone(),
            data: self.data.clone(),
        }
    }

    /// Canonical bytes to sign
    pub fn bytes(&self) -> Vec<u8> {
        codec::encode(&self.core())
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some() && self.pub_key.is_some()
    }

    /// Address derived from the attached sender key, if any
    pub fn sender_address(&self) -> Option<Address> {
        self.pub_key.as_ref().map(Address::from_public_key)
    }

    /// gasPrice * gasLimit + amount, or `None` on overflow
    pub fn debt(&self) -> Option<u128> {
        self.gas_price
            .checked_mul(self.gas_limit as u128)?
            .checked_add(self.amount)
    }

    /// Check the attached signature against the canonical bytes
    pub fn verify_signature(&self) -> Result<bool> {
        match (&self.pub_key, &self.signature) {
            (Some(key), Some(sig)) => schnorr::verify(&self.bytes(), sig, &key.serialize()),
            _ => Err(ValidationError::InvalidTransaction("transaction is not signed".to_string()).into()),
        }
    }

    /// Fail unless both the sender key and signature are attached
    pub fn require_signed(&self) -> Result<()> {
        if !self.is_signed() {
            return Err(ValidationError::InvalidTransaction(
                "transaction must be signed before submission".to_string(),
            )
            .into());
        }
        Ok(())
    }

    pub fn set_pending(&mut self, id: String) {
        self.id = Some(id);
        self.status = TxStatus::Pending;
    }

    /// Attach a terminal receipt and move to Confirmed or Rejected
    pub fn set_receipt(&mut self, receipt: TxReceipt) {
        self.status = if receipt.success {
            TxStatus::Confirmed
        } else {
            TxStatus::Rejected
        };
        self.receipt = Some(receipt);
    }

    pub fn is_pending(&self) -> bool {
        self.status == TxStatus::Pending
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == TxStatus::Confirmed
    }

    pub fn is_rejected(&self) -> bool {
        self.status == TxStatus::Rejected
    }
}

/// Transaction builder
pub struct TransactionBuilder {
    tx: Transaction,
}

impl TransactionBuilder {
    pub fn new(to_addr: Address) -> Self {
        Self {
            tx: Transaction {
                version: 0,
                nonce: None,
                to_addr,
                amount: 0,
                gas_price: 0,
                gas_limit: 0,
                code: String::new(),
                data: String::new(),
                priority: false,
                pub_key: None,
                signature: None,
                id: None,
                receipt: None,
                status: TxStatus::Initialised,
            },
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.tx.version = version;
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.tx.nonce = Some(nonce);
        self
    }

    pub fn amount(mut self, amount: u128) -> Self {
        self.tx.amount = amount;
        self
    }

    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.tx.gas_price = gas_price;
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.tx.gas_limit = gas_limit;
        self
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.tx.code = code.into();
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.tx.data = data.into();
        self
    }

    pub fn priority(mut self, priority: bool) -> Self {
        self.tx.priority = priority;
        self
    }

    /// Pin the sender; the wallet then signs with the matching account
    pub fn pub_key(mut self, pub_key: PublicKey) -> Self {
        self.tx.pub_key = Some(pub_key);
        self
    }

    /// Build the unsigned transaction
    pub fn build(self) -> Result<Transaction> {
        if self.tx.version == 0 {
            return Err(ValidationError::InvalidTransaction("version is required".to_string()).into());
        }
        if self.tx.gas_limit == 0 {
            return Err(ValidationError::InvalidTransaction("gas limit must be positive".to_string()).into());
        }
        Ok(self.tx)
    }
}
