//! JSON-RPC client for the asset ledger gateway.
//!
//! The gateway fronts the deployed asset contract and owns transaction
//! signing, chain id, and gas parameters; this client only issues
//! asset-level calls and maps transport failures to
//! [`LedgerError::Unavailable`] and RPC error objects to
//! [`LedgerError::Rejected`].

use super::{AssetKind, LedgerAsset, LedgerClient, LedgerError};
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP JSON-RPC adapter over the remote asset ledger.
#[derive(Clone)]
pub struct HttpLedgerClient {
    /// The underlying HTTP client for RPC calls.
    http_client: Client,
    /// The gateway RPC endpoint.
    rpc_url: String,
    /// The deployed asset contract address, sent with every call.
    contract_address: String,
    /// Monotonic request id.
    next_id: std::sync::Arc<AtomicU64>,
}

impl HttpLedgerClient {
    /// Create a new ledger client.
    ///
    /// # Arguments
    /// * `rpc_url` - The gateway RPC endpoint.
    /// * `contract_address` - The deployed asset contract address.
    pub fn new(rpc_url: String, contract_address: String) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            rpc_url,
            contract_address,
            next_id: std::sync::Arc::new(AtomicU64::new(1)),
        }
    }

    /// Execute one JSON-RPC call and return its `result` field.
    async fn execute(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        debug!("Ledger call {} (id {})", method, id);

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        if let Some(err) = payload.get("error") {
            let message = err
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown contract error")
                .to_string();
            warn!("Ledger rejected {}: {}", method, message);
            return Err(LedgerError::Rejected(message));
        }

        Ok(payload.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Resolve the ledger-side token id for a wallet's asset of a kind.
    /// Zero means no such token exists.
    async fn token_id(&self, wallet: &str, kind: AssetKind) -> Result<u64, LedgerError> {
        let result = self
            .execute(
                "zkc_getTokenId",
                json!({
                    "contract": self.contract_address,
                    "wallet": wallet,
                    "assetType": kind.as_str(),
                }),
            )
            .await?;
        Ok(result.as_u64().unwrap_or(0))
    }
}

#[async_trait::async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn mint(&self, wallet: &str, kind: AssetKind, value: &str) -> Result<(), LedgerError> {
        self.execute(
            "zkc_mintAsset",
            json!({
                "contract": self.contract_address,
                "wallet": wallet,
                "assetType": kind.as_str(),
                "value": value,
            }),
        )
        .await?;
        Ok(())
    }

    async fn burn(&self, wallet: &str, kind: AssetKind) -> Result<(), LedgerError> {
        let token_id = self.token_id(wallet, kind).await?;
        if token_id == 0 {
            // Nothing on-chain for this (wallet, kind); burning it is a
            // no-op success.
            return Ok(());
        }
        self.execute(
            "zkc_burnAsset",
            json!({
                "contract": self.contract_address,
                "tokenId": token_id,
            }),
        )
        .await?;
        Ok(())
    }

    async fn query_wallet_assets(&self, wallet: &str) -> Result<Vec<LedgerAsset>, LedgerError> {
        let result = self
            .execute(
                "zkc_getWalletAssets",
                json!({
                    "contract": self.contract_address,
                    "wallet": wallet,
                }),
            )
            .await?;

        serde_json::from_value(result)
            .map_err(|e| LedgerError::Rejected(format!("malformed asset list: {}", e)))
    }
}
