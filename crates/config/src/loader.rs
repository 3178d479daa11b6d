//! Configuration loader implementation

use crate::schema::Config;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use std::path::{Path, PathBuf};
use types::ConfigError;

/// File picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "chaindriller.yaml";

/// Unprefixed variables understood for compatibility with older setups
const LEGACY_ENV_VARS: &[&str] = &["CHAIN_ID", "ADDRESS_TO_SEND", "PRIVATE_KEY_SENDER", "ETH_RPC_URL"];

/// Command line values that take precedence over every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub chain_id: Option<u64>,
    pub rpc_url: Option<String>,
    pub concurrency: Option<usize>,
    pub transactions: Option<usize>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(chain_id) = self.chain_id {
            config.network.chain_id = chain_id;
        }
        if let Some(ref rpc_url) = self.rpc_url {
            config.network.rpc_url = rpc_url.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.drill.concurrency = concurrency;
        }
        if let Some(transactions) = self.transactions {
            config.drill.transactions = transactions;
        }
    }
}

/// Configuration loader that handles defaults, YAML files and environment variables
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from an optional file and the environment.
    ///
    /// An explicit path must exist. Without one, `chaindriller.yaml` in the
    /// working directory is used when present.
    pub fn load(config_path: Option<&Path>) -> Result<Config> {
        Self::load_with(config_path, &ConfigOverrides::default())
    }

    /// Load configuration and apply command line overrides on top
    pub fn load_with(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config> {
        let file = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    }
                    .into());
                }
                Some(path.to_path_buf())
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                default_path.exists().then_some(default_path)
            }
        };

        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(ref path) = file {
            figment = figment.merge(Yaml::file(path));
        }

        let mut config: Config = figment
            // Override with environment variables (prefixed with CHAINDRILLER_)
            .merge(Env::prefixed("CHAINDRILLER_").split("__"))
            .merge(legacy_env())
            .extract()
            .context("Failed to parse configuration")?;

        overrides.apply(&mut config);
        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from string (for testing)
    pub fn load_from_str(yaml_content: &str) -> Result<Config> {
        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::string(yaml_content))
            .extract()
            .context("Failed to parse configuration from string")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let rpc_url = &config.network.rpc_url;
        if rpc_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "network.rpc_url".to_string(),
            });
        }

        if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
            return Err(ConfigError::ValidationError {
                field: "network.rpc_url".to_string(),
                message: format!("RPC URL must start with http:// or https://: {}", rpc_url),
            });
        }

        if config.network.chain_id == 0 {
            return Err(ConfigError::ValidationError {
                field: "network.chain_id".to_string(),
                message: "Chain ID cannot be 0".to_string(),
            });
        }

        if config.network.request_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError {
                field: "network.request_timeout_seconds".to_string(),
                message: "Request timeout cannot be 0".to_string(),
            });
        }

        if !types::utils::is_valid_address(&config.drill.recipient) {
            return Err(ConfigError::ValidationError {
                field: "drill.recipient".to_string(),
                message: format!("Invalid recipient address: {}", config.drill.recipient),
            });
        }

        config.transfer_value()?;

        if config.drill.gas_limit_multiplier == 0 {
            return Err(ConfigError::ValidationError {
                field: "drill.gas_limit_multiplier".to_string(),
                message: "Gas limit multiplier cannot be 0".to_string(),
            });
        }

        if let Some(ref key) = config.signer.private_key {
            if !types::utils::is_valid_private_key(key.expose_secret()) {
                return Err(ConfigError::ValidationError {
                    field: "signer.private_key".to_string(),
                    message: "Private key must be 32 bytes of hex".to_string(),
                });
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logging.level".to_string(),
                message: format!(
                    "Invalid log level: {}. Valid levels: {:?}",
                    config.logging.level, valid_log_levels
                ),
            });
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logging.format".to_string(),
                message: format!(
                    "Invalid log format: {}. Valid formats: {:?}",
                    config.logging.format, valid_log_formats
                ),
            });
        }

        Ok(())
    }

    /// Get default configuration
    pub fn default() -> Config {
        Config::default()
    }

    /// Create example configuration file
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let yaml_content = serde_yaml::to_string(&config)
            .context("Failed to serialize default configuration")?;

        std::fs::write(path.as_ref(), yaml_content)
            .context("Failed to write example configuration file")?;

        Ok(())
    }
}

/// Unprefixed variables mapped onto their configuration keys. Blank values,
/// and a `CHAIN_ID` that is not a number, leave the lower layers in place.
fn legacy_env() -> Env {
    Env::raw()
        .only(LEGACY_ENV_VARS)
        .filter(|key| legacy_value_usable(key.as_str()))
        .map(|key| {
            match key.as_str().to_ascii_uppercase().as_str() {
                "CHAIN_ID" => "network.chain_id",
                "ADDRESS_TO_SEND" => "drill.recipient",
                "PRIVATE_KEY_SENDER" => "signer.private_key",
                "ETH_RPC_URL" => "network.rpc_url",
                _ => "unused",
            }
            .into()
        })
}

fn legacy_value_usable(name: &str) -> bool {
    let name = name.to_ascii_uppercase();
    match std::env::var(&name) {
        Ok(value) if value.trim().is_empty() => false,
        Ok(value) if name == "CHAIN_ID" => value.trim().parse::<u64>().is_ok(),
        Ok(_) => true,
        Err(_) => false,
    }
}
