//! JSON-RPC 2.0 client over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use primitive_types::U256;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::{to_hex, Address, Hash};
use crate::domain::errors::ChainError;

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// Call object for `eth_estimateGas`.
#[derive(Debug, Clone, Serialize)]
pub struct CallRequest {
    pub from: String,
    pub to: String,
    pub data: String,
}

/// Subset of an `eth_getTransactionReceipt` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub block_number: Option<String>,
    pub status: Option<String>,
    pub gas_used: Option<String>,
}

/// Minimal Ethereum JSON-RPC client.
pub struct RpcClient {
    http_client: reqwest::Client,
    rpc_url: String,
    request_id: AtomicU64,
}

impl RpcClient {
    /// Create a new RPC client.
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, ChainError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ChainError::Http)?;

        Ok(Self {
            http_client,
            rpc_url: rpc_url.into(),
            request_id: AtomicU64::new(1),
        })
    }

    /// Make a JSON-RPC call.
    pub async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<Option<R>, ChainError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        debug!(method, id, "JSON-RPC request");

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ChainError::Connection(format!("cannot connect to {}", self.rpc_url))
                } else {
                    ChainError::Http(e)
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| ChainError::Parse(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(ChainError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(rpc_response.result)
    }

    /// Call a method whose result must be present.
    async fn call_required<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, ChainError> {
        self.call(method, params)
            .await?
            .ok_or_else(|| ChainError::Parse(format!("{method}: missing result in response")))
    }

    /// eth_chainId
    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        let result: String = self.call_required("eth_chainId", Vec::<()>::new()).await?;
        parse_hex_u64(&result)
    }

    /// eth_getTransactionCount at the `pending` tag.
    pub async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError> {
        let result: String = self
            .call_required(
                "eth_getTransactionCount",
                (to_hex(address.as_bytes()), "pending"),
            )
            .await?;
        parse_hex_u64(&result)
    }

    /// eth_gasPrice
    pub async fn gas_price(&self) -> Result<U256, ChainError> {
        let result: String = self.call_required("eth_gasPrice", Vec::<()>::new()).await?;
        parse_hex_u256(&result)
    }

    /// eth_estimateGas
    pub async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, ChainError> {
        let result: String = self.call_required("eth_estimateGas", [request]).await?;
        parse_hex_u64(&result)
    }

    /// eth_sendRawTransaction
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<Hash, ChainError> {
        let result: String = self
            .call_required("eth_sendRawTransaction", [to_hex(raw)])
            .await?;
        parse_hash(&result)
    }

    /// eth_getTransactionReceipt. `None` while the transaction is pending.
    pub async fn transaction_receipt(&self, hash: Hash) -> Result<Option<RpcReceipt>, ChainError> {
        self.call("eth_getTransactionReceipt", [to_hex(hash.as_bytes())])
            .await
    }
}

fn strip_hex(s: &str) -> Result<&str, ChainError> {
    s.strip_prefix("0x")
        .ok_or_else(|| ChainError::Parse(format!("expected 0x-prefixed hex, got '{s}'")))
}

/// Parse a hex quantity string to u64.
pub fn parse_hex_u64(s: &str) -> Result<u64, ChainError> {
    let digits = strip_hex(s)?;
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16).map_err(|e| ChainError::Parse(format!("'{s}': {e}")))
}

/// Parse a hex quantity string to U256.
pub fn parse_hex_u256(s: &str) -> Result<U256, ChainError> {
    let digits = strip_hex(s)?;
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16).map_err(|e| ChainError::Parse(format!("'{s}': {e:?}")))
}

/// Parse a 32-byte hex data string.
pub fn parse_hash(s: &str) -> Result<Hash, ChainError> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(strip_hex(s)?, &mut bytes)
        .map_err(|e| ChainError::Parse(format!("'{s}': {e}")))?;
    Ok(Hash::from(bytes))
}
