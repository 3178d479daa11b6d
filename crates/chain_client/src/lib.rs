//! Chain client for talking to the drilled node
//!
//! This crate defines the narrow capability the drill engine needs from a
//! node (balance, nonce, gas price, gas estimate, submission) and implements
//! it over JSON-RPC, together with a preflight health check.

pub mod client;
pub mod health;
pub mod traits;

pub use client::*;
pub use health::*;
pub use traits::*;
