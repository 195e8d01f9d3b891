//! Configuration management
//!
//! Load settings from a TOML file or from the environment (.env supported).
//! The chain id is checked against the router table at load time, so an
//! unsupported chain fails before anything connects.
//!
//! Created: 2026-10-18
//!
//! Example TOML:
//! ```toml
//! chain_id = 137
//! receive_address = "0x0101010101010101010101010101010101010101"
//! ws_url = "wss://polygon-mainnet.example/ws"
//! event_capacity = 512
//! ```

use alloy::primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::router::router_address;
use crate::service::DEFAULT_API_URL;
use crate::watcher::DEFAULT_EVENT_CAPACITY;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KitConfig {
    pub chain_id: u64,
    /// Local wallet whose swaps are watched
    pub receive_address: Address,
    pub ws_url: String,
    #[serde(default = "default_api_url")]
    pub oneinch_api_url: String,
    /// Per-listener buffer of the swap event channel
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String { DEFAULT_API_URL.to_string() }
fn default_event_capacity() -> usize { DEFAULT_EVENT_CAPACITY }
fn default_request_timeout_secs() -> u64 { 30 }

impl KitConfig {
    /// Load from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: KitConfig =
            toml::from_str(content).with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{} not set", key));

        let chain_id = required("CHAIN_ID")?
            .parse()
            .context("CHAIN_ID must be an integer")?;
        let receive_address = Address::from_str(required("RECEIVE_ADDRESS")?.trim())
            .context("RECEIVE_ADDRESS is not a valid address")?;

        let config = KitConfig {
            chain_id,
            receive_address,
            ws_url: required("WS_URL")?,
            oneinch_api_url: lookup("ONEINCH_API_URL").unwrap_or_else(default_api_url),
            event_capacity: match lookup("EVENT_CAPACITY") {
                Some(value) => value.parse().context("EVENT_CAPACITY must be an integer")?,
                None => default_event_capacity(),
            },
            request_timeout_secs: match lookup("REQUEST_TIMEOUT_SECS") {
                Some(value) => value.parse().context("REQUEST_TIMEOUT_SECS must be an integer")?,
                None => default_request_timeout_secs(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        router_address(self.chain_id)?;
        anyhow::ensure!(self.event_capacity > 0, "event_capacity must be positive");
        anyhow::ensure!(!self.ws_url.is_empty(), "ws_url must not be empty");
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
