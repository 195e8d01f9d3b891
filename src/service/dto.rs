//! Aggregator API — Request and Response Types
//!
//! Purpose:
//!     Typed views of the aggregator's quote, swap and approve endpoints plus
//!     the parameter sets used to build their queries.
//!
//! Created: 2026-10-18
//!
//! Notes:
//!     - Token amounts arrive as decimal strings and are parsed into U256.
//!     - Gas prices arrive either as decimal strings or as JSON numbers.
//!     - `route` (JSON `protocols`) is passed through untouched.

use alloy::primitives::{Address, Bytes, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub address: Address,
    #[serde(rename = "logoURI", default)]
    pub logo_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub from_token: Token,
    pub to_token: Token,
    #[serde(deserialize_with = "decimal_u256")]
    pub from_token_amount: U256,
    #[serde(deserialize_with = "decimal_u256")]
    pub to_token_amount: U256,
    #[serde(rename = "protocols", default)]
    pub route: serde_json::Value,
    pub estimated_gas: u64,
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Quote {} {} -> {} {}",
            self.from_token_amount, self.from_token.symbol, self.to_token_amount, self.to_token.symbol
        )
    }
}

/// Ready-to-sign router transaction returned by the swap endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    #[serde(deserialize_with = "decimal_u256")]
    pub value: U256,
    #[serde(default, deserialize_with = "opt_quantity")]
    pub gas_price: Option<u128>,
    #[serde(default, deserialize_with = "opt_quantity")]
    pub max_fee_per_gas: Option<u128>,
    #[serde(default, deserialize_with = "opt_quantity")]
    pub max_priority_fee_per_gas: Option<u128>,
    #[serde(rename = "gas")]
    pub gas_limit: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swap {
    pub from_token: Token,
    pub to_token: Token,
    #[serde(deserialize_with = "decimal_u256")]
    pub from_token_amount: U256,
    #[serde(deserialize_with = "decimal_u256")]
    pub to_token_amount: U256,
    #[serde(rename = "protocols", default)]
    pub route: serde_json::Value,
    #[serde(rename = "tx")]
    pub transaction: SwapTransaction,
}

impl fmt::Display for Swap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Swap {} {} -> {} {} via {:?}",
            self.from_token_amount,
            self.from_token.symbol,
            self.to_token_amount,
            self.to_token.symbol,
            self.transaction.to
        )
    }
}

/// ERC-20 approve transaction for the router.
///
/// Two values are equal when they describe the same call (`to`, `value`,
/// `data`); the suggested gas price is not part of the identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveCallData {
    pub data: Bytes,
    #[serde(default, deserialize_with = "opt_quantity")]
    pub gas_price: Option<u128>,
    pub to: Address,
    #[serde(deserialize_with = "decimal_u256")]
    pub value: U256,
}

impl PartialEq for ApproveCallData {
    fn eq(&self, other: &Self) -> bool {
        self.to == other.to && self.value == other.value && self.data == other.data
    }
}

impl Eq for ApproveCallData {}

impl Hash for ApproveCallData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to.hash(state);
        self.value.hash(state);
        self.data.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Spender {
    pub address: Address,
}

/// Gas price attached to quote and swap requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPrice {
    Legacy {
        gas_price: u128,
    },
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteParams {
    pub from_token: Address,
    pub to_token: Address,
    pub amount: U256,
    pub protocols: Option<Vec<String>>,
    pub gas_price: Option<GasPrice>,
    pub complexity_level: Option<u32>,
    pub connector_tokens: Option<Vec<String>>,
    pub gas_limit: Option<u64>,
    pub main_route_parts: Option<u32>,
    pub parts: Option<u32>,
}

impl QuoteParams {
    pub fn new(from_token: Address, to_token: Address, amount: U256) -> Self {
        Self {
            from_token,
            to_token,
            amount,
            protocols: None,
            gas_price: None,
            complexity_level: None,
            connector_tokens: None,
            gas_limit: None,
            main_route_parts: None,
            parts: None,
        }
    }

    pub fn with_gas_price(mut self, gas_price: GasPrice) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_protocols(mut self, protocols: Vec<String>) -> Self {
        self.protocols = Some(protocols);
        self
    }

    /// Query pairs in the order the API documents them
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("fromTokenAddress", self.from_token.to_string()),
            ("toTokenAddress", self.to_token.to_string()),
            ("amount", self.amount.to_string()),
        ];

        if let Some(protocols) = &self.protocols {
            query.push(("protocols", protocols.join(",")));
        }
        match self.gas_price {
            Some(GasPrice::Legacy { gas_price }) => {
                query.push(("gasPrice", gas_price.to_string()));
            }
            Some(GasPrice::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            }) => {
                query.push(("maxFeePerGas", max_fee_per_gas.to_string()));
                query.push(("maxPriorityFeePerGas", max_priority_fee_per_gas.to_string()));
            }
            None => {}
        }
        if let Some(level) = self.complexity_level {
            query.push(("complexityLevel", level.to_string()));
        }
        if let Some(tokens) = &self.connector_tokens {
            query.push(("connectorTokens", tokens.join(",")));
        }
        if let Some(gas_limit) = self.gas_limit {
            query.push(("gasLimit", gas_limit.to_string()));
        }
        if let Some(parts) = self.main_route_parts {
            query.push(("mainRouteParts", parts.to_string()));
        }
        if let Some(parts) = self.parts {
            query.push(("parts", parts.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwapParams {
    pub quote: QuoteParams,
    /// Sender of the swap transaction
    pub from_address: Address,
    /// Slippage tolerance in percent (1.5 = 1.5%)
    pub slippage: Decimal,
    /// Receiver of the output tokens when it is not the sender
    pub recipient: Option<Address>,
    pub burn_chi: bool,
    pub allow_partial_fill: bool,
}

impl SwapParams {
    pub fn new(quote: QuoteParams, from_address: Address, slippage: Decimal) -> Self {
        Self {
            quote,
            from_address,
            slippage,
            recipient: None,
            burn_chi: false,
            allow_partial_fill: false,
        }
    }

    pub fn with_recipient(mut self, recipient: Address) -> Self {
        self.recipient = Some(recipient);
        self
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = self.quote.query();
        query.push(("fromAddress", self.from_address.to_string()));
        query.push(("slippage", self.slippage.normalize().to_string()));
        if let Some(recipient) = self.recipient {
            query.push(("destReceiver", recipient.to_string()));
        }
        if self.burn_chi {
            query.push(("burnChi", "true".to_string()));
        }
        if self.allow_partial_fill {
            query.push(("allowPartialFill", "true".to_string()));
        }
        query
    }
}

/// Decimal string (or plain JSON number) into U256
fn decimal_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    match Quantity::deserialize(deserializer)? {
        Quantity::Text(text) => U256::from_str_radix(text.trim(), 10).map_err(serde::de::Error::custom),
        Quantity::Number(value) => Ok(U256::from(value)),
    }
}

fn opt_quantity<'de, D>(deserializer: D) -> Result<Option<u128>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Quantity>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Quantity::Number(value)) => Ok(Some(u128::from(value))),
        Some(Quantity::Text(text)) => u128::from_str(text.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Quantity {
    Number(u64),
    Text(String),
}
