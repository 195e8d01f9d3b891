//! Decoder — Type Definitions
//!
//! Purpose:
//!     Selector newtype and the typed decoration produced from router calldata.
//!
//! Created: 2026-10-18
//!
//! Dependencies:
//!     - alloy (Address, U256)

use alloy::primitives::{address, Address, U256};
use std::fmt;

/// Address the router uses for the chain's native coin.
pub const NATIVE_SENTINEL: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

/// First four bytes of a contract call's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// Split calldata into selector and argument bytes.
    pub fn split(input: &[u8]) -> Option<(Self, &[u8])> {
        let (head, args) = input.split_first_chunk::<4>()?;
        Some((Self(*head), args))
    }
}

impl From<[u8; 4]> for Selector {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "0x{:02x}{:02x}{:02x}{:02x}", a, b, c, d)
    }
}

/// Which router entry point produced the decoration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    /// `swap` through the generic executor
    Swap,
    /// `unoswap` / `unoswapWithPermit` over V2-style pairs
    Unoswap,
    /// `uniswapV3Swap` / `uniswapV3SwapTo`
    UniswapV3Swap,
    /// `clipperSwap`
    ClipperSwap,
    /// `fillOrderRFQ` against a market maker quote
    LiquidityFill,
}

impl fmt::Display for DecorationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecorationKind::Swap => write!(f, "Swap"),
            DecorationKind::Unoswap => write!(f, "Unoswap"),
            DecorationKind::UniswapV3Swap => write!(f, "UniswapV3Swap"),
            DecorationKind::ClipperSwap => write!(f, "ClipperSwap"),
            DecorationKind::LiquidityFill => write!(f, "LiquidityFill"),
        }
    }
}

/// Asset side of a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapToken {
    Native,
    Erc20(Address),
}

impl SwapToken {
    /// Map a token address, treating the router's 0xEeee… sentinel as native.
    pub fn from_address(address: Address) -> Self {
        if address == NATIVE_SENTINEL {
            SwapToken::Native
        } else {
            SwapToken::Erc20(address)
        }
    }

    /// Like `from_address`, but also treats the zero address as native.
    /// Used by entry points that encode ETH as address(0).
    pub fn from_address_or_zero(address: Address) -> Self {
        if address.is_zero() {
            SwapToken::Native
        } else {
            Self::from_address(address)
        }
    }

    /// An ERC20 must have a real contract address
    pub fn is_well_formed(&self) -> bool {
        match self {
            SwapToken::Native => true,
            SwapToken::Erc20(address) => !address.is_zero(),
        }
    }
}

impl fmt::Display for SwapToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SwapToken::Native => write!(f, "native"),
            SwapToken::Erc20(address) => write!(f, "{:?}", address),
        }
    }
}

/// Decoded meaning of a router call. Built once per transaction, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decoration {
    pub kind: DecorationKind,
    /// None when the calldata alone does not name the token (pool-routed calls)
    pub token_in: Option<SwapToken>,
    pub token_out: Option<SwapToken>,
    /// For RFQ fills this is the taker amount
    pub amount_in: U256,
    pub min_amount_out: U256,
    /// Explicit recipient, when the call names one
    pub recipient: Option<Address>,
    /// Hop pools extracted from packed pool words
    pub pools: Vec<Address>,
    pub selector: Selector,
}

impl Decoration {
    /// True if every token the call names is well-formed.
    pub fn has_well_formed_tokens(&self) -> bool {
        [self.token_in, self.token_out]
            .iter()
            .flatten()
            .all(SwapToken::is_well_formed)
    }
}
