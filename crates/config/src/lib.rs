//! Configuration management for chaindriller
//!
//! This crate handles parsing, validation, and management of configuration
//! from defaults, YAML files, environment variables and command line flags.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, ConfigOverrides, DEFAULT_CONFIG_FILE};
pub use schema::*;
pub use validation::*;
