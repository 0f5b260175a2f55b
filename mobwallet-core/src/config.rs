//! Configuration management
//!
//! Settings live in `settings.json` in the base directory
//! (`$MOBILECOIN_DIR` or `~/.mobilecoin`):
//! ```json
//! {
//!   "network": "testnet",
//!   "rpcUrl": "http://127.0.0.1:9090/wallet",
//!   "sync": { "pollIntervalMs": 1000, "maxAttempts": 300, "timeoutSecs": 300 },
//!   "server": { "binaryDir": "." }
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::full_service::DEFAULT_RPC_URL;
use crate::domain::result::Error;

/// Environment variable overriding the network
pub const NETWORK_ENV: &str = "MOBILECOIN_NETWORK";

/// Environment variable overriding the wallet server URL
pub const RPC_URL_ENV: &str = "MOBILECOIN_RPC_URL";

/// MobileCoin network the wallet server connects to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }

    /// Wallet server executable for this network
    pub fn binary_name(&self) -> &'static str {
        match self {
            Network::Testnet => "full-service-testnet",
            Network::Mainnet => "full-service",
        }
    }

    /// Consensus peers
    pub fn peers(&self) -> &'static [&'static str] {
        match self {
            Network::Testnet => &[
                "mc://node1.test.mobilecoin.com/",
                "mc://node2.test.mobilecoin.com/",
            ],
            Network::Mainnet => &[
                "mc://node1.prod.mobilecoinww.com/",
                "mc://node2.prod.mobilecoinww.com/",
            ],
        }
    }

    /// Ledger archive locations used for syncing blocks
    pub fn tx_source_urls(&self) -> &'static [&'static str] {
        match self {
            Network::Testnet => &[
                "https://s3-us-west-1.amazonaws.com/mobilecoin.chain/node1.test.mobilecoin.com/",
                "https://s3-us-west-1.amazonaws.com/mobilecoin.chain/node2.test.mobilecoin.com/",
            ],
            Network::Mainnet => &[
                "https://ledger.mobilecoinww.com/node1.prod.mobilecoinww.com/",
                "https://ledger.mobilecoinww.com/node2.prod.mobilecoinww.com/",
            ],
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "testnet" | "test" => Ok(Network::Testnet),
            "mainnet" | "main" | "prod" => Ok(Network::Mainnet),
            other => Err(Error::Config(format!(
                "Unknown network '{}' (expected testnet or mainnet)",
                other
            ))),
        }
    }
}

/// Bounds for waiting on account sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    300
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: default_max_attempts(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SyncSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Where to find the wallet server executables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    #[serde(default = "default_binary_dir")]
    pub binary_dir: PathBuf,
}

fn default_binary_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            binary_dir: default_binary_dir(),
        }
    }
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    network: Option<Network>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rpc_url: Option<String>,
    #[serde(default)]
    sync: SyncSettings,
    #[serde(default)]
    server: ServerSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub network: Network,
    pub rpc_url: String,
    pub sync: SyncSettings,
    pub server: ServerSettings,
    base_dir: PathBuf,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Config {
    /// Defaults rooted at `base_dir`, ignoring any settings file
    pub fn with_base_dir(base_dir: &Path) -> Self {
        Self {
            network: Network::default(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            sync: SyncSettings::default(),
            server: ServerSettings::default(),
            base_dir: base_dir.to_path_buf(),
            _raw_settings: SettingsFile::default(),
        }
    }

    /// Load config from the base directory, then apply environment overrides
    pub fn load(base_dir: &Path) -> Result<Self> {
        let mut config = Self::load_file(base_dir)?;
        config.apply_overrides(
            std::env::var(NETWORK_ENV).ok().as_deref(),
            std::env::var(RPC_URL_ENV).ok().as_deref(),
        )?;
        Ok(config)
    }

    /// Load settings.json only
    pub fn load_file(base_dir: &Path) -> Result<Self> {
        let settings_path = base_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings file {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };

        Ok(Self {
            network: raw.network.unwrap_or_default(),
            rpc_url: raw
                .rpc_url
                .clone()
                .unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            sync: raw.sync.clone(),
            server: raw.server.clone(),
            base_dir: base_dir.to_path_buf(),
            _raw_settings: raw,
        })
    }

    /// Override network and server URL (empty values are ignored)
    pub fn apply_overrides(&mut self, network: Option<&str>, rpc_url: Option<&str>) -> Result<()> {
        if let Some(n) = network.filter(|n| !n.trim().is_empty()) {
            self.network = n.parse()?;
        }
        if let Some(url) = rpc_url.filter(|u| !u.trim().is_empty()) {
            self.rpc_url = url.trim().to_string();
        }
        Ok(())
    }

    /// Save config to the base directory
    /// Preserves other settings that the CLI doesn't manage
    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("Failed to create {}", self.base_dir.display()))?;
        let settings_path = self.base_dir.join("settings.json");

        let mut settings = self._raw_settings.clone();
        settings.network = Some(self.network);
        settings.rpc_url = Some(self.rpc_url.clone());
        settings.sync = self.sync.clone();
        settings.server = self.server.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Per-network data directory holding the wallet and ledger databases
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join(self.network.as_str())
    }

    pub fn wallet_db_path(&self) -> PathBuf {
        self.data_dir().join("wallet-db").join("wallet.db")
    }

    pub fn ledger_db_path(&self) -> PathBuf {
        self.data_dir().join("ledger-db")
    }

    pub fn server_log_path(&self) -> PathBuf {
        self.data_dir().join("wallet_server_log.txt")
    }

    pub fn server_binary(&self) -> PathBuf {
        self.server.binary_dir.join(self.network.binary_name())
    }
}
