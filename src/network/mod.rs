// Node RPC access

mod provider;
mod http;
pub mod rpc;
#[cfg(test)]
pub(crate) mod mock;

pub use provider::Provider;
pub use http::HttpProvider;
pub use rpc::{BalanceResult, CreateTxResult, RpcMethod, TxStatusResult};
