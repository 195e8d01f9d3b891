//! Aggregation Router Address Table
//!
//! Static chain id → router contract mapping. Unknown chains fail fast so a
//! misconfigured kit is rejected at construction instead of silently
//! declining every transaction.
//!
//! Created: 2026-10-18

use alloy::primitives::{address, Address};
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::UnrecognizedChainError;

// ── Chain ids ───────────────────────────────────────────────────────
pub const ETHEREUM: u64 = 1;
pub const ROPSTEN: u64 = 3;
pub const RINKEBY: u64 = 4;
pub const GOERLI: u64 = 5;
pub const OPTIMISM: u64 = 10;
pub const KOVAN: u64 = 42;
pub const BINANCE_SMART_CHAIN: u64 = 56;
pub const POLYGON: u64 = 137;
pub const ARBITRUM_ONE: u64 = 42161;

// ── Router deployments ──────────────────────────────────────────────
pub const MAINNET_ROUTER: Address = address!("1111111254fb6c44bac0bed2854e76f90643097d");
pub const OPTIMISM_ROUTER: Address = address!("1111111254760f7ab3f16433eea9304126dcd199");
pub const TESTNET_ROUTER: Address = address!("11111112542d85b3ef69ae05771c2dccff4faa26");

static ROUTERS: Lazy<HashMap<u64, Address>> = Lazy::new(|| {
    HashMap::from([
        (ETHEREUM, MAINNET_ROUTER),
        (BINANCE_SMART_CHAIN, MAINNET_ROUTER),
        (POLYGON, MAINNET_ROUTER),
        (ARBITRUM_ONE, MAINNET_ROUTER),
        (OPTIMISM, OPTIMISM_ROUTER),
        (ROPSTEN, TESTNET_ROUTER),
        (KOVAN, TESTNET_ROUTER),
        (RINKEBY, TESTNET_ROUTER),
        (GOERLI, TESTNET_ROUTER),
    ])
});

/// Router address for a chain.
pub fn router_address(chain_id: u64) -> Result<Address, UnrecognizedChainError> {
    ROUTERS
        .get(&chain_id)
        .copied()
        .ok_or(UnrecognizedChainError { chain_id })
}

/// Chain ids with a known router deployment, ascending.
pub fn supported_chains() -> Vec<u64> {
    let mut ids: Vec<u64> = ROUTERS.keys().copied().collect();
    ids.sort_unstable();
    ids
}
