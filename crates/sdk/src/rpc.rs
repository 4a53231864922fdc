//! JSON-RPC 2.0 ledger gateway.

use crate::error::SdkError;
use crate::settings::{SdkConfig, DEFAULT_RECEIPT_POLL_ATTEMPTS, DEFAULT_RECEIPT_POLL_INTERVAL_MS};
use async_trait::async_trait;
use namereg_registry::{CallRequest, GatewayError, LedgerGateway, ReturnData, TransactionReceipt};
use namereg_types::{encode_hex_prefixed, Address, Bytes32};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Talks to a ledger node over HTTP JSON-RPC.
///
/// Reads use `eth_call` against the latest state. Writes use
/// `eth_sendTransaction` and then poll `eth_getTransactionReceipt`, so a
/// successful `transact` is visible to later calls.
#[derive(Debug)]
pub struct JsonRpcGateway {
    endpoint: Url,
    http: Client,
    next_id: AtomicU64,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl JsonRpcGateway {
    /// Create a gateway for `endpoint` with a 10 second request timeout.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self, SdkError> {
        Self::with_http_client(
            endpoint,
            Client::builder().timeout(Duration::from_secs(10)).build()?,
        )
    }

    /// Use an existing reqwest client (useful for custom TLS or middleware).
    pub fn with_http_client(endpoint: impl AsRef<str>, http: Client) -> Result<Self, SdkError> {
        let endpoint = Url::parse(endpoint.as_ref())
            .map_err(|_| SdkError::InvalidEndpoint(endpoint.as_ref().to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(SdkError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(Self {
            endpoint,
            http,
            next_id: AtomicU64::new(1),
            poll_interval: Duration::from_millis(DEFAULT_RECEIPT_POLL_INTERVAL_MS),
            poll_attempts: DEFAULT_RECEIPT_POLL_ATTEMPTS,
        })
    }

    pub fn from_config(config: &SdkConfig) -> Result<Self, SdkError> {
        let http = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self::with_http_client(&config.rpc_url, http)?
            .with_receipt_polling(config.receipt_poll_interval(), config.receipt_poll_attempts))
    }

    pub fn with_receipt_polling(mut self, interval: Duration, attempts: u32) -> Self {
        self.poll_interval = interval;
        self.poll_attempts = attempts.max(1);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one request and return its `result`, `Value::Null` when absent.
    async fn request_raw(&self, method: &str, params: Value) -> Result<Value, GatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(%method, id, "json-rpc request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Transport(format!(
                "http status {}: {}",
                status.as_u16(),
                text
            )));
        }

        let envelope: RpcResponse = response.json().await.map_err(map_transport)?;
        if let Some(error) = envelope.error {
            warn!(%method, code = error.code, message = %error.message, "json-rpc error");
            return Err(GatewayError::Revert(error.message));
        }
        Ok(envelope.result)
    }

    async fn request<T>(&self, method: &str, params: Value) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        let result = self.request_raw(method, params).await?;
        if result.is_null() {
            return Err(GatewayError::Transport(format!(
                "{method} response had no result"
            )));
        }
        serde_json::from_value(result)
            .map_err(|err| GatewayError::Transport(format!("malformed {method} result: {err}")))
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<RpcReceipt, GatewayError> {
        for _ in 0..self.poll_attempts {
            let result = self
                .request_raw("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            if !result.is_null() {
                return serde_json::from_value(result).map_err(|err| {
                    GatewayError::Transport(format!("malformed transaction receipt: {err}"))
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        Err(GatewayError::Timeout)
    }
}

#[async_trait]
impl LedgerGateway for JsonRpcGateway {
    async fn call(&self, request: &CallRequest) -> Result<ReturnData, GatewayError> {
        let params = json!([
            {
                "to": request.contract.to_string(),
                "data": encode_hex_prefixed(&request.calldata()),
            },
            "latest"
        ]);
        let result: String = self.request("eth_call", params).await?;
        decode_hex_data(&result).map(ReturnData)
    }

    async fn transact(
        &self,
        request: &CallRequest,
        sender: &Address,
    ) -> Result<TransactionReceipt, GatewayError> {
        let params = json!([{
            "from": sender.to_string(),
            "to": request.contract.to_string(),
            "data": encode_hex_prefixed(&request.calldata()),
        }]);
        let tx_hash: String = self.request("eth_sendTransaction", params).await?;
        let receipt = self.wait_for_receipt(&tx_hash).await?;

        if receipt.status.as_deref() == Some("0x0") {
            return Err(GatewayError::Revert(format!(
                "transaction {tx_hash} reverted"
            )));
        }

        let tx_hash: Bytes32 = receipt
            .transaction_hash
            .as_deref()
            .unwrap_or(tx_hash.as_str())
            .parse()
            .map_err(|err| GatewayError::Transport(format!("invalid transaction hash: {err}")))?;

        Ok(TransactionReceipt {
            tx_hash,
            sender: *sender,
            contract: request.contract,
            function: request.function,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    #[serde(default)]
    transaction_hash: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

fn map_transport(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(err.to_string())
    }
}

fn decode_hex_data(value: &str) -> Result<Vec<u8>, GatewayError> {
    let payload = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(payload)
        .map_err(|err| GatewayError::Transport(format!("invalid hex in result: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_endpoints() {
        assert!(matches!(
            JsonRpcGateway::new("ftp://node:21"),
            Err(SdkError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            JsonRpcGateway::new("not a url"),
            Err(SdkError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn polling_attempts_are_at_least_one() {
        let gateway = JsonRpcGateway::new("http://127.0.0.1:8545")
            .unwrap()
            .with_receipt_polling(Duration::from_millis(1), 0);
        assert_eq!(gateway.poll_attempts, 1);
    }

    #[test]
    fn decodes_prefixed_and_empty_results() {
        assert_eq!(decode_hex_data("0x").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_hex_data("0x0102").unwrap(), vec![1, 2]);
        assert!(decode_hex_data("0xzz").is_err());
    }

    #[test]
    fn missing_and_null_results_are_null() {
        let envelope: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert!(envelope.error.is_none());
        assert!(envelope.result.is_null());

        let envelope: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":3,"message":"execution reverted: not owner"}}"#,
        )
        .unwrap();
        assert!(envelope.result.is_null());
        assert_eq!(envelope.error.unwrap().message, "execution reverted: not owner");
    }
}
