// JSON-RPC over HTTP

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::provider::Provider;
use super::rpc::{
    BalanceResult, CreateTxResult, RpcMethod, RpcRequest, RpcResponse, TransactionObject,
    TxStatusResult,
};
use crate::address::Address;
use crate::core::{TxPayload, TxReceipt};
use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider talking to a node's JSON-RPC endpoint
#[derive(Clone)]
pub struct HttpProvider {
    http_client: reqwest::Client,
    url: Arc<str>,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl HttpProvider {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self::with_client(http_client, url))
    }

    /// Reuse an existing client (shared connection pool)
    pub fn with_client(http_client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: Arc::from(url.into()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one call; an error object becomes `Error::Rpc`
    pub async fn send<T: DeserializeOwned>(&self, method: RpcMethod, params: Vec<Value>) -> Result<T> {
        let request = RpcRequest::new(method, params);
        log::debug!("RPC {} -> {}", method.as_str(), self.url);

        let response = self
            .http_client
            .post(&*self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<RpcResponse<T>>()
            .await?;

        response.into_result()
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn get_balance(&self, address: &Address) -> Result<BalanceResult> {
        self.send(RpcMethod::GetBalance, vec![json!(address.to_hex())]).await
    }

    async fn create_transaction(&self, payload: &TxPayload) -> Result<CreateTxResult> {
        let params = vec![serde_json::to_value(payload).map_err(|e| Error::Codec(e.to_string()))?];
        match self.send(RpcMethod::CreateTransaction, params).await {
            Err(Error::Rpc { code, message }) => Err(Error::NodeRejected { code, message }),
            other => other,
        }
    }

    async fn get_transaction(&self, tx_id: &str) -> Result<Option<TxReceipt>> {
        match self
            .send::<TransactionObject>(RpcMethod::GetTransaction, vec![json!(tx_id)])
            .await
        {
            Ok(obj) => Ok(Some(obj.receipt)),
            Err(Error::Rpc { code, message }) => {
                log::debug!("Transaction {} not available yet ({}: {})", tx_id, code, message);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_transaction_status(&self, tx_id: &str) -> Result<TxStatusResult> {
        self.send(RpcMethod::GetTransactionStatus, vec![json!(tx_id)]).await
    }

    async fn get_num_tx_blocks(&self) -> Result<u64> {
        let height: String = self.send(RpcMethod::GetNumTxBlocks, vec![]).await?;
        height.trim().parse().map_err(|_| Error::Rpc {
            code: 0,
            message: format!("block height is not a number: {}", height),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_client() {
        let provider = HttpProvider::new("https://dev-api.zilliqa.com").unwrap();
        assert_eq!(provider.url(), "https://dev-api.zilliqa.com");
        assert!(format!("{:?}", provider).contains("dev-api.zilliqa.com"));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_network_error() {
        // nothing listens on the discard port
        let provider = HttpProvider::new("http://127.0.0.1:9").unwrap();
        let err = provider.get_num_tx_blocks().await.unwrap_err();
        assert!(err.is_retryable(), "got {:?}", err);
    }
}
