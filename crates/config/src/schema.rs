//! Configuration schema definitions

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use types::{ConfigError, SecretString};

/// Well-known development key used when no sender key is configured
pub const DEV_PRIVATE_KEY: &str =
    "fad9c8855b740a0b7ed4c221dbad0f33a83a49cad6b3fe8d5817ac83d38b6a19";

/// Recipient used when none is configured
pub const DEFAULT_RECIPIENT: &str = "0xe86Ffce704C00556dF42e31F14CEd095390A08eF";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Node connection
    #[serde(default)]
    pub network: NetworkConfig,
    /// Batch shape and dispatch settings
    #[serde(default)]
    pub drill: DrillConfig,
    /// Sender key
    #[serde(default)]
    pub signer: SignerConfig,
    /// Report output
    #[serde(default)]
    pub report: ReportConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// HTTP JSON-RPC endpoint of the node
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Chain ID the transactions are signed for
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Timeout of a single RPC call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Drill configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillConfig {
    /// Number of transactions to prepare and send
    #[serde(default = "default_transactions")]
    pub transactions: usize,
    /// Maximum number of concurrent sends, 0 sends everything at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Address receiving every transfer
    #[serde(default = "default_recipient")]
    pub recipient: String,
    /// Value of each transfer in wei (as string to handle large numbers)
    #[serde(default = "default_transfer_value")]
    pub transfer_value_wei: String,
    /// Multiplier applied to the node's gas estimate
    #[serde(default = "default_gas_limit_multiplier")]
    pub gas_limit_multiplier: u64,
    /// Exit with a failure status when any send fails
    #[serde(default)]
    pub fail_on_send_errors: bool,
}

/// Signer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Hex private key of the sender account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<SecretString>,
}

/// Report configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Where to write the JSON report, nothing is written when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            chain_id: default_chain_id(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            transactions: default_transactions(),
            concurrency: default_concurrency(),
            recipient: default_recipient(),
            transfer_value_wei: default_transfer_value(),
            gas_limit_multiplier: default_gas_limit_multiplier(),
            fail_on_send_errors: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Parse the recipient address
    pub fn recipient(&self) -> Result<Address, ConfigError> {
        Address::from_str(&self.drill.recipient).map_err(|_| ConfigError::InvalidValue {
            field: "drill.recipient".to_string(),
            value: self.drill.recipient.clone(),
        })
    }

    /// Parse the per-transfer value
    pub fn transfer_value(&self) -> Result<U256, ConfigError> {
        types::utils::string_to_u256(&self.drill.transfer_value_wei).map_err(|_| {
            ConfigError::InvalidValue {
                field: "drill.transfer_value_wei".to_string(),
                value: self.drill.transfer_value_wei.clone(),
            }
        })
    }

    /// The configured sender key, or the development key when none is set
    pub fn private_key(&self) -> SecretString {
        self.signer
            .private_key
            .clone()
            .unwrap_or_else(|| SecretString::from(DEV_PRIVATE_KEY))
    }

    /// Whether the sender key is the well-known development key
    pub fn uses_dev_key(&self) -> bool {
        match &self.signer.private_key {
            None => true,
            Some(key) => key.expose_secret().trim_start_matches("0x") == DEV_PRIVATE_KEY,
        }
    }
}

// Default value functions
fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_chain_id() -> u64 {
    220720
}

fn default_request_timeout() -> u64 {
    30
}

fn default_transactions() -> usize {
    1000
}

fn default_concurrency() -> usize {
    1000
}

fn default_recipient() -> String {
    DEFAULT_RECIPIENT.to_string()
}

fn default_transfer_value() -> String {
    "1".to_string()
}

fn default_gas_limit_multiplier() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
