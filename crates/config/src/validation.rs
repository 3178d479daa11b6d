//! Configuration validation utilities

use crate::schema::Config;
use alloy::primitives::U256;

/// Gas multipliers above this are almost certainly a typo
const HIGH_GAS_LIMIT_MULTIPLIER: u64 = 100;

/// Chains where a drill spends real funds
const PUBLIC_MAINNETS: &[u64] = &[1, 10, 56, 137, 8453, 42161];

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete configuration
    pub fn validate(config: &Config) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_network(config, &mut report);
        Self::validate_drill(config, &mut report);
        Self::validate_signer(config, &mut report);
        Self::validate_report(config, &mut report);
        Self::validate_logging(config, &mut report);

        report
    }

    fn validate_network(config: &Config, report: &mut ValidationReport) {
        let rpc_url = &config.network.rpc_url;
        if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
            report.add_error("network.rpc_url", "RPC URL must start with http:// or https://");
        }

        if config.network.chain_id == 0 {
            report.add_error("network.chain_id", "Chain ID cannot be 0");
        } else if PUBLIC_MAINNETS.contains(&config.network.chain_id) {
            report.add_warning(
                "network.chain_id",
                &format!(
                    "Chain {} is a public mainnet, every transfer spends real gas",
                    config.network.chain_id
                ),
            );
        }

        if config.network.request_timeout_seconds == 0 {
            report.add_error("network.request_timeout_seconds", "Request timeout cannot be 0");
        } else if config.network.request_timeout_seconds > 300 {
            report.add_warning("network.request_timeout_seconds", "Request timeout is very high");
        }
    }

    fn validate_drill(config: &Config, report: &mut ValidationReport) {
        let drill = &config.drill;

        if drill.transactions == 0 {
            report.add_warning("drill.transactions", "No transactions will be prepared");
        }

        if drill.concurrency == 0 {
            report.add_warning(
                "drill.concurrency",
                "Concurrency 0 sends every transaction at once",
            );
        } else if drill.concurrency > drill.transactions && drill.transactions > 0 {
            report.add_warning(
                "drill.concurrency",
                &format!(
                    "Concurrency {} is above the transaction count, only {} workers will run",
                    drill.concurrency, drill.transactions
                ),
            );
        }

        if config.recipient().is_err() {
            report.add_error("drill.recipient", "Invalid recipient address");
        }

        match config.transfer_value() {
            Ok(value) if value == U256::ZERO => {
                report.add_warning("drill.transfer_value_wei", "Transfers carry no value");
            }
            Ok(_) => {}
            Err(e) => report.add_error("drill.transfer_value_wei", &e.to_string()),
        }

        if drill.gas_limit_multiplier == 0 {
            report.add_error("drill.gas_limit_multiplier", "Gas limit multiplier cannot be 0");
        } else if drill.gas_limit_multiplier > HIGH_GAS_LIMIT_MULTIPLIER {
            report.add_warning(
                "drill.gas_limit_multiplier",
                &format!(
                    "Gas limit multiplier {} may exceed the block gas limit",
                    drill.gas_limit_multiplier
                ),
            );
        }
    }

    fn validate_signer(config: &Config, report: &mut ValidationReport) {
        if let Some(ref key) = config.signer.private_key {
            if !types::utils::is_valid_private_key(key.expose_secret()) {
                report.add_error("signer.private_key", "Private key must be 32 bytes of hex");
                return;
            }
        }

        if config.uses_dev_key() {
            report.add_warning(
                "signer.private_key",
                "Using the well-known development key, set PRIVATE_KEY_SENDER for a real account",
            );
        }
    }

    fn validate_report(config: &Config, report: &mut ValidationReport) {
        if let Some(ref output_path) = config.report.output_path {
            if let Some(parent) = output_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    report.add_warning("report.output_path", "Report directory does not exist");
                }
            }
        }
    }

    fn validate_logging(config: &Config, report: &mut ValidationReport) {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.logging.level.as_str()) {
            report.add_error(
                "logging.level",
                &format!(
                    "Invalid log level: {}. Valid levels: {:?}",
                    config.logging.level, valid_levels
                ),
            );
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&config.logging.format.as_str()) {
            report.add_error(
                "logging.format",
                &format!(
                    "Invalid log format: {}. Valid formats: {:?}",
                    config.logging.format, valid_formats
                ),
            );
        }

        if (config.logging.level == "trace" || config.logging.level == "debug")
            && config.drill.transactions > 10_000
        {
            report.add_warning(
                "logging.level",
                "Debug/trace logging of a large batch slows down dispatch",
            );
        }
    }
}

/// Validation report containing errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!(
            "Validation: {} errors, {} warnings",
            self.errors.len(),
            self.warnings.len()
        )
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
