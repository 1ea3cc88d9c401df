// src/chain.rs
//! Read-only Base network status over JSON-RPC, with ordered fallback
//! endpoints. The first endpoint that answers `eth_blockNumber` is remembered
//! until a status read fails on it.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Used when a node does not implement `eth_maxPriorityFeePerGas`.
const DEFAULT_PRIORITY_FEE_WEI: u128 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub name: String,
    pub chain_id: String,
    pub block_number: String,
}

/// Wei amounts as decimal strings; "0" when the node has no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeData {
    pub gas_price: String,
    pub max_fee_per_gas: String,
    pub max_priority_fee_per_gas: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<FeeData>,
    /// "Primary" or "Fallback N".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NetworkStatus {
    fn disconnected(error: impl Into<String>) -> Self {
        Self {
            connected: false,
            network: None,
            gas_price: None,
            endpoint: None,
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

pub struct ChainClient {
    client: reqwest::Client,
    /// Primary at slot 0, then fallbacks in order. Blank slots stay in place
    /// so labels keep their configured position; `connect` skips them.
    endpoints: Vec<String>,
    current: Mutex<Option<usize>>,
}

impl ChainClient {
    pub fn new(primary: &str, fallbacks: &[String], timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building json-rpc client")?;
        let endpoints = std::iter::once(primary)
            .chain(fallbacks.iter().map(String::as_str))
            .map(|u| u.trim().to_string())
            .collect();
        Ok(Self {
            client,
            endpoints,
            current: Mutex::new(None),
        })
    }

    /// Configured endpoint URLs, blanks dropped.
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.endpoints
            .iter()
            .map(String::as_str)
            .filter(|u| !u.is_empty())
    }

    /// Current status. Never fails: connection problems come back as
    /// `connected: false` with the error text.
    pub async fn status(&self) -> NetworkStatus {
        let Some(idx) = self.active_endpoint().await else {
            return NetworkStatus::disconnected("Failed to connect to any RPC endpoint");
        };

        match self.read_status(idx).await {
            Ok(s) => s,
            Err(first) => {
                let url = &self.endpoints[idx];
                tracing::warn!(target: "chain", url = %url, error = ?first, "status read failed, reconnecting");
                self.set_current(None);
                let Some(idx) = self.connect().await else {
                    return NetworkStatus::disconnected(format!("{first:#}"));
                };
                self.read_status(idx)
                    .await
                    .unwrap_or_else(|e| NetworkStatus::disconnected(format!("{e:#}")))
            }
        }
    }

    async fn active_endpoint(&self) -> Option<usize> {
        let cached = *self.current.lock().unwrap_or_else(PoisonError::into_inner);
        match cached {
            Some(idx) => Some(idx),
            None => self.connect().await,
        }
    }

    /// Probe endpoints in order; remember and return the first live one.
    async fn connect(&self) -> Option<usize> {
        let live = self.endpoints.iter().enumerate().filter(|(_, u)| !u.is_empty());
        for (i, url) in live {
            match self.call(url, "eth_blockNumber", json!([])).await {
                Ok(_) => {
                    tracing::info!(target: "chain", endpoint = %endpoint_label(i), url = %url, "rpc endpoint connected");
                    self.set_current(Some(i));
                    return Some(i);
                }
                Err(e) => {
                    tracing::warn!(target: "chain", url = %url, error = ?e, "rpc endpoint failed");
                }
            }
        }
        tracing::error!(target: "chain", "all rpc endpoints failed");
        None
    }

    fn set_current(&self, idx: Option<usize>) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = idx;
    }

    async fn read_status(&self, idx: usize) -> Result<NetworkStatus> {
        let url = &self.endpoints[idx];
        let block_number = hex_quantity(&self.call(url, "eth_blockNumber", json!([])).await?)?;
        let chain_id = hex_quantity(&self.call(url, "eth_chainId", json!([])).await?)?;
        let gas_price = self.fee_data(url).await?;

        Ok(NetworkStatus {
            connected: true,
            network: Some(NetworkInfo {
                name: network_name(chain_id).to_string(),
                chain_id: chain_id.to_string(),
                block_number: block_number.to_string(),
            }),
            gas_price: Some(gas_price),
            endpoint: Some(endpoint_label(idx)),
            timestamp: Utc::now(),
            error: None,
        })
    }

    /// Legacy gas price plus EIP-1559 fees (`2 * baseFee + priorityFee`).
    async fn fee_data(&self, url: &str) -> Result<FeeData> {
        let gas_price = hex_quantity(&self.call(url, "eth_gasPrice", json!([])).await?)?;
        let block = self
            .call(url, "eth_getBlockByNumber", json!(["latest", false]))
            .await?;
        let base_fee = block
            .get("baseFeePerGas")
            .filter(|v| !v.is_null())
            .map(hex_quantity)
            .transpose()?;

        let (max_fee, priority) = match base_fee {
            Some(base) => {
                let priority = match self.call(url, "eth_maxPriorityFeePerGas", json!([])).await {
                    Ok(v) => hex_quantity(&v)?,
                    Err(_) => DEFAULT_PRIORITY_FEE_WEI,
                };
                (base.saturating_mul(2).saturating_add(priority), priority)
            }
            None => (0, 0),
        };

        Ok(FeeData {
            gas_price: gas_price.to_string(),
            max_fee_per_gas: max_fee.to_string(),
            max_priority_fee_per_gas: priority.to_string(),
        })
    }

    async fn call(&self, url: &str, method: &str, params: Value) -> Result<Value> {
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        let resp: RpcResponse = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("{method} via {url}"))?
            .json()
            .await
            .with_context(|| format!("{method} response from {url}"))?;

        if let Some(err) = resp.error {
            return Err(anyhow!("{method}: rpc error {}: {}", err.code, err.message));
        }
        resp.result
            .filter(|v| !v.is_null())
            .ok_or_else(|| anyhow!("{method}: empty result"))
    }
}

pub fn endpoint_label(idx: usize) -> String {
    if idx == 0 {
        "Primary".to_string()
    } else {
        format!("Fallback {idx}")
    }
}

pub fn network_name(chain_id: u128) -> &'static str {
    match chain_id {
        1 => "mainnet",
        8453 => "base",
        84532 => "base-sepolia",
        _ => "unknown",
    }
}

/// `"0x1a"` → 26. `"0x"` is zero.
fn hex_quantity(v: &Value) -> Result<u128> {
    let s = v
        .as_str()
        .ok_or_else(|| anyhow!("expected hex string, got {v}"))?;
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| anyhow!("missing 0x prefix: {s}"))?;
    if digits.is_empty() {
        return Ok(0);
    }
    u128::from_str_radix(digits, 16).with_context(|| format!("bad hex quantity {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_quantities() {
        assert_eq!(hex_quantity(&json!("0x1a")).unwrap(), 26);
        assert_eq!(hex_quantity(&json!("0x")).unwrap(), 0);
        assert_eq!(hex_quantity(&json!("0x14a34")).unwrap(), 84532);
        assert!(hex_quantity(&json!("12")).is_err());
        assert!(hex_quantity(&json!(12)).is_err());
    }

    #[test]
    fn labels_and_names() {
        assert_eq!(endpoint_label(0), "Primary");
        assert_eq!(endpoint_label(2), "Fallback 2");
        assert_eq!(network_name(84532), "base-sepolia");
        assert_eq!(network_name(5), "unknown");
    }

    #[test]
    fn disconnected_status_shape() {
        let v = serde_json::to_value(NetworkStatus::disconnected("boom")).unwrap();
        assert_eq!(v["connected"], false);
        assert_eq!(v["error"], "boom");
        assert!(v.get("network").is_none());
        assert!(v.get("timestamp").is_some());
    }

    #[test]
    fn blank_primary_keeps_fallback_slots() {
        let fallbacks = vec!["http://a.example".to_string(), " ".to_string()];
        let c = ChainClient::new("", &fallbacks, Duration::from_secs(1)).unwrap();
        assert_eq!(c.endpoints[1], "http://a.example");
        assert_eq!(c.endpoints().collect::<Vec<_>>(), vec!["http://a.example"]);
    }

    #[tokio::test]
    async fn no_endpoints_reports_disconnected() {
        let c = ChainClient::new("", &[], Duration::from_secs(1)).unwrap();
        let s = c.status().await;
        assert!(!s.connected);
        assert!(s.error.unwrap().contains("Failed to connect"));
    }
}
