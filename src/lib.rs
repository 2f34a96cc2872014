// Zilliqa crypto and transaction core

pub mod address;
pub mod chain;
pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod network;
pub mod wallet;

// Re-exports for convenience
pub use address::Address;
pub use chain::{ChainClient, ConfirmOptions, TransactionStatus};
pub use cli::{Cli, CliHandler};
pub use config::Config;
pub use core::{Transaction, TransactionBuilder, TxPayload, TxReceipt, TxStatus};
pub use crypto::{KeyPair, Signature};
pub use error::{Error, Result, ValidationError};
pub use network::{HttpProvider, Provider};
pub use wallet::{Account, SignMode, Signer, Wallet};
