//! Utility functions and helpers

use alloy::primitives::U256;
use chrono::{DateTime, Utc};

/// Parse U256 from a decimal or 0x-prefixed hex string
pub fn string_to_u256(s: &str) -> Result<U256, String> {
    s.parse().map_err(|e| format!("Failed to parse U256: {}", e))
}

/// Convert wei to ETH (as f64)
pub fn wei_to_eth(wei: U256) -> f64 {
    if wei == U256::ZERO {
        return 0.0;
    }

    // Precision loss is fine, display only
    let wei_f64: f64 = wei.to_string().parse().unwrap_or(0.0);
    wei_f64 / 1e18
}

/// Format wei amount for display
pub fn format_wei(wei: U256) -> String {
    if wei == U256::ZERO {
        return "0 wei".to_string();
    }

    let eth_amount = wei_to_eth(wei);
    if eth_amount >= 0.001 {
        format!("{:.6} ETH", eth_amount)
    } else {
        format!("{} wei", wei)
    }
}

/// Generate an identifier for one drill run
pub fn generate_run_id() -> uuid::Uuid {
    uuid::Uuid::new_v4()
}

/// Calculate time difference in milliseconds
pub fn time_diff_ms(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    end.timestamp_millis() - start.timestamp_millis()
}

/// Validate Ethereum address format
pub fn is_valid_address(address: &str) -> bool {
    if !address.starts_with("0x") {
        return false;
    }

    if address.len() != 42 {
        return false;
    }

    address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Validate a hex private key, with or without 0x prefix
pub fn is_valid_private_key(key: &str) -> bool {
    let key = key.strip_prefix("0x").unwrap_or(key);
    key.len() == 64 && key.chars().all(|c| c.is_ascii_hexdigit())
}

/// Calculate percentage
pub fn calculate_percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64) * 100.0
}

/// Round to specified decimal places
pub fn round_to_decimal_places(value: f64, places: u32) -> f64 {
    let multiplier = 10f64.powi(places as i32);
    (value * multiplier).round() / multiplier
}
