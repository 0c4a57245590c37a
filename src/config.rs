//! Service configuration.
//!
//! Loaded from a JSON file at startup. Parsing and validation are
//! separate on purpose: a config that parses but fails ledger validation
//! still yields a working offline-only engine, reported once to the
//! command layer rather than failing the process.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Connection parameters for the asset ledger gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The gateway RPC endpoint.
    pub rpc_url: String,
    /// Private key of the server-side signer account.
    pub private_key: String,
    /// Address of the deployed asset contract.
    pub contract_address: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
}

impl LedgerConfig {
    /// Check the parameters the online path cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rpc_url.starts_with("http") {
            return Err(ConfigError::Invalid("rpc_url must be a valid URL".to_string()));
        }
        if !self.contract_address.starts_with("0x") {
            return Err(ConfigError::Invalid(
                "contract address must start with 0x".to_string(),
            ));
        }
        if self.private_key.is_empty() || self.private_key == "your-private-key" {
            return Err(ConfigError::Invalid("private_key is not set".to_string()));
        }
        Ok(())
    }
}

/// Top-level configuration for the sync service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the persisted wallet, rank, and item tables.
    pub data_dir: PathBuf,
    /// Seconds between reconciliation poll cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    pub ledger: LedgerConfig,
}

impl EngineConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn default_chain_id() -> u64 {
    // Xsolla ZK Sepolia testnet.
    1377
}

fn default_poll_interval() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> EngineConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn defaults_are_applied() {
        let config = parse(
            r#"{
                "data_dir": "/tmp/zkc",
                "ledger": {
                    "rpc_url": "https://zkrpc.example.test",
                    "private_key": "abc123",
                    "contract_address": "0x1234"
                }
            }"#,
        );
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.ledger.chain_id, 1377);
        assert!(config.ledger.validate().is_ok());
    }

    #[test]
    fn rejects_non_http_rpc_url() {
        let config = parse(
            r#"{
                "data_dir": "/tmp/zkc",
                "ledger": {
                    "rpc_url": "ftp://nope",
                    "private_key": "abc123",
                    "contract_address": "0x1234"
                }
            }"#,
        );
        assert!(config.ledger.validate().is_err());
    }

    #[test]
    fn rejects_bad_contract_address_and_placeholder_key() {
        let bad_address = parse(
            r#"{
                "data_dir": "/tmp/zkc",
                "ledger": {
                    "rpc_url": "https://zkrpc.example.test",
                    "private_key": "abc123",
                    "contract_address": "1234"
                }
            }"#,
        );
        assert!(bad_address.ledger.validate().is_err());

        let placeholder_key = parse(
            r#"{
                "data_dir": "/tmp/zkc",
                "ledger": {
                    "rpc_url": "https://zkrpc.example.test",
                    "private_key": "your-private-key",
                    "contract_address": "0x1234"
                }
            }"#,
        );
        assert!(placeholder_key.ledger.validate().is_err());
    }
}
