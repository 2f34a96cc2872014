// Client configuration

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chain::{ConfirmOptions, DEFAULT_INTERVAL_MS, DEFAULT_MAX_ATTEMPTS};
use crate::core::pack_version;
use crate::error::{Error, Result};

pub const DEFAULT_RPC_URL: &str = "https://dev-api.zilliqa.com";
/// Developer testnet
pub const DEFAULT_CHAIN_ID: u16 = 333;
pub const DEFAULT_MSG_VERSION: u16 = 1;

pub const ENV_RPC_URL: &str = "ZIL_RPC_URL";
pub const ENV_CHAIN_ID: &str = "ZIL_CHAIN_ID";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc_url: String,
    pub chain_id: u16,
    pub msg_version: u16,
    pub max_attempts: u32,
    pub interval_ms: u64,
    pub block_confirm: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            msg_version: DEFAULT_MSG_VERSION,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval_ms: DEFAULT_INTERVAL_MS,
            block_confirm: false,
        }
    }
}

impl Config {
    /// Load config from a JSON file; missing fields take defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        serde_json::from_str(&json)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Save config to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path.as_ref(), json)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Override fields from `ZIL_RPC_URL` and `ZIL_CHAIN_ID`
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) -> Result<()> {
        if let Some(url) = lookup(ENV_RPC_URL) {
            self.rpc_url = url;
        }
        if let Some(chain_id) = lookup(ENV_CHAIN_ID) {
            self.chain_id = chain_id
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("{} must be a 16-bit integer, got {}", ENV_CHAIN_ID, chain_id)))?;
        }
        Ok(())
    }

    /// Packed `version` field for new transactions
    pub fn version(&self) -> u32 {
        pack_version(self.chain_id, self.msg_version)
    }

    pub fn confirm_options(&self) -> ConfirmOptions {
        ConfirmOptions {
            max_attempts: self.max_attempts,
            interval: Duration::from_millis(self.interval_ms),
            block_confirm: self.block_confirm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.rpc_url, "https://dev-api.zilliqa.com");
        assert_eq!(config.version(), 21823489);
        assert_eq!(config.confirm_options(), ConfirmOptions::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            rpc_url: "http://localhost:4201".to_string(),
            chain_id: 1,
            block_confirm: true,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.version(), 65537);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"chain_id": 1}"#).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.chain_id, 1);
        assert_eq!(loaded.max_attempts, 33);
        assert_eq!(loaded.rpc_url, DEFAULT_RPC_URL);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(Config::load(dir.path().join("missing.json")), Err(Error::Config(_))));

        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_vars(|key| match key {
                ENV_RPC_URL => Some("https://api.zilliqa.com".to_string()),
                ENV_CHAIN_ID => Some("1".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.rpc_url, "https://api.zilliqa.com");
        assert_eq!(config.chain_id, 1);

        let err = config
            .apply_vars(|key| (key == ENV_CHAIN_ID).then(|| "mainnet".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
