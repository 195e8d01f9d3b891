//! Router V4 Method Factories
//!
//! Purpose:
//!     Decode AggregationRouterV4 calldata into `Decoration`s.
//!
//! Created: 2026-10-18
//!
//! Dependencies:
//!     - alloy (sol! call types, strict ABI decoding)
//!
//! Supported entry points (selectors come from the `sol!` definitions):
//!     swap               — generic executor swap, tokens in SwapDescription
//!     unoswap            — V2-style pools packed in bytes32 words
//!     unoswapWithPermit  — same, with an ERC2612 permit
//!     uniswapV3Swap      — V3 pools packed in uint256 words
//!     uniswapV3SwapTo    — same, explicit recipient
//!     clipperSwap        — Clipper exchange, address(0) means ETH
//!     fillOrderRFQ       — RFQ limit order fill (liquidity fill)
//!
//! Decoding is strict: an address word with non-zero padding, a bad dynamic
//! offset or truncated arguments yield `MalformedCalldataError`.

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolCall;

use super::registry::{DecodeFn, MethodFactory};
use super::types::{Decoration, DecorationKind, Selector, SwapToken};
use crate::contracts::IAggregationRouterV4::{
    clipperSwapCall, fillOrderRFQCall, swapCall, uniswapV3SwapCall, uniswapV3SwapToCall,
    unoswapCall, unoswapWithPermitCall,
};
use crate::error::MalformedCalldataError;

pub const SWAP: Selector = Selector(swapCall::SELECTOR);
pub const UNOSWAP: Selector = Selector(unoswapCall::SELECTOR);
pub const UNOSWAP_WITH_PERMIT: Selector = Selector(unoswapWithPermitCall::SELECTOR);
pub const UNISWAP_V3_SWAP: Selector = Selector(uniswapV3SwapCall::SELECTOR);
pub const UNISWAP_V3_SWAP_TO: Selector = Selector(uniswapV3SwapToCall::SELECTOR);
pub const CLIPPER_SWAP: Selector = Selector(clipperSwapCall::SELECTOR);
pub const FILL_ORDER_RFQ: Selector = Selector(fillOrderRFQCall::SELECTOR);

// ── Pool word flags ─────────────────────────────────────────────────
// Flags live in the top byte of each pool word; the pool address is the low
// 160 bits.
/// unoswap: unwrap WETH to ETH after the last hop
const UNOSWAP_WETH_FLAG: u8 = 0x40;
/// uniswapV3Swap: unwrap WETH to ETH after the last hop (bit 253)
const V3_WETH_UNWRAP_FLAG: u8 = 0x20;

/// Every router V4 factory, in registration order.
pub fn default_factories() -> Vec<Box<dyn MethodFactory>> {
    vec![
        Box::new(SwapMethodFactory),
        Box::new(UnoswapMethodFactory),
        Box::new(UniswapV3MethodFactory),
        Box::new(ClipperMethodFactory),
        Box::new(LimitOrderMethodFactory),
    ]
}

pub struct SwapMethodFactory;

impl MethodFactory for SwapMethodFactory {
    fn name(&self) -> &str {
        "swap"
    }

    fn methods(&self) -> Vec<(Selector, DecodeFn)> {
        vec![(SWAP, decode_swap)]
    }
}

pub struct UnoswapMethodFactory;

impl MethodFactory for UnoswapMethodFactory {
    fn name(&self) -> &str {
        "unoswap"
    }

    fn methods(&self) -> Vec<(Selector, DecodeFn)> {
        vec![
            (UNOSWAP, decode_unoswap),
            (UNOSWAP_WITH_PERMIT, decode_unoswap_with_permit),
        ]
    }
}

pub struct UniswapV3MethodFactory;

impl MethodFactory for UniswapV3MethodFactory {
    fn name(&self) -> &str {
        "uniswapV3"
    }

    fn methods(&self) -> Vec<(Selector, DecodeFn)> {
        vec![
            (UNISWAP_V3_SWAP, decode_uniswap_v3_swap),
            (UNISWAP_V3_SWAP_TO, decode_uniswap_v3_swap_to),
        ]
    }
}

pub struct ClipperMethodFactory;

impl MethodFactory for ClipperMethodFactory {
    fn name(&self) -> &str {
        "clipper"
    }

    fn methods(&self) -> Vec<(Selector, DecodeFn)> {
        vec![(CLIPPER_SWAP, decode_clipper_swap)]
    }
}

pub struct LimitOrderMethodFactory;

impl MethodFactory for LimitOrderMethodFactory {
    fn name(&self) -> &str {
        "limitOrderRFQ"
    }

    fn methods(&self) -> Vec<(Selector, DecodeFn)> {
        vec![(FILL_ORDER_RFQ, decode_fill_order_rfq)]
    }
}

// ── Decoders ────────────────────────────────────────────────────────

/// swap(address caller, SwapDescription desc, bytes data)
fn decode_swap(args: &[u8]) -> Result<Decoration, MalformedCalldataError> {
    let call = swapCall::abi_decode_raw_validate(args).map_err(malformed(SWAP))?;
    let desc = call.desc;

    Ok(Decoration {
        kind: DecorationKind::Swap,
        token_in: Some(SwapToken::from_address(desc.srcToken)),
        token_out: Some(SwapToken::from_address(desc.dstToken)),
        amount_in: desc.amount,
        min_amount_out: desc.minReturnAmount,
        // zero receiver means "send to msg.sender"
        recipient: non_zero(desc.dstReceiver),
        pools: Vec::new(),
        selector: SWAP,
    })
}

/// unoswap(address srcToken, uint256 amount, uint256 minReturn, bytes32[] pools)
fn decode_unoswap(args: &[u8]) -> Result<Decoration, MalformedCalldataError> {
    let call = unoswapCall::abi_decode_raw_validate(args).map_err(malformed(UNOSWAP))?;
    unoswap_decoration(UNOSWAP, call.srcToken, call.amount, call.minReturn, &call.pools)
}

/// unoswapWithPermit(address srcToken, uint256 amount, uint256 minReturn, bytes32[] pools, bytes permit)
fn decode_unoswap_with_permit(args: &[u8]) -> Result<Decoration, MalformedCalldataError> {
    let call = unoswapWithPermitCall::abi_decode_raw_validate(args)
        .map_err(malformed(UNOSWAP_WITH_PERMIT))?;
    unoswap_decoration(
        UNOSWAP_WITH_PERMIT,
        call.srcToken,
        call.amount,
        call.minReturn,
        &call.pools,
    )
}

fn unoswap_decoration(
    selector: Selector,
    src_token: Address,
    amount: U256,
    min_return: U256,
    pools: &[B256],
) -> Result<Decoration, MalformedCalldataError> {
    let last = pools
        .last()
        .ok_or_else(|| MalformedCalldataError::new(selector, "empty pools"))?;

    // Output token is only known from calldata when the route unwraps to ETH
    let token_out = (last[0] & UNOSWAP_WETH_FLAG != 0).then_some(SwapToken::Native);

    Ok(Decoration {
        kind: DecorationKind::Unoswap,
        token_in: Some(SwapToken::from_address_or_zero(src_token)),
        token_out,
        amount_in: amount,
        min_amount_out: min_return,
        recipient: None,
        pools: pools.iter().map(|word| Address::from_word(*word)).collect(),
        selector,
    })
}

/// uniswapV3Swap(uint256 amount, uint256 minReturn, uint256[] pools)
fn decode_uniswap_v3_swap(args: &[u8]) -> Result<Decoration, MalformedCalldataError> {
    let call = uniswapV3SwapCall::abi_decode_raw_validate(args)
        .map_err(malformed(UNISWAP_V3_SWAP))?;
    uniswap_v3_decoration(UNISWAP_V3_SWAP, call.amount, call.minReturn, &call.pools, None)
}

/// uniswapV3SwapTo(address recipient, uint256 amount, uint256 minReturn, uint256[] pools)
fn decode_uniswap_v3_swap_to(args: &[u8]) -> Result<Decoration, MalformedCalldataError> {
    let call = uniswapV3SwapToCall::abi_decode_raw_validate(args)
        .map_err(malformed(UNISWAP_V3_SWAP_TO))?;
    uniswap_v3_decoration(
        UNISWAP_V3_SWAP_TO,
        call.amount,
        call.minReturn,
        &call.pools,
        non_zero(call.recipient),
    )
}

fn uniswap_v3_decoration(
    selector: Selector,
    amount: U256,
    min_return: U256,
    pools: &[U256],
    recipient: Option<Address>,
) -> Result<Decoration, MalformedCalldataError> {
    let words: Vec<B256> = pools.iter().map(|pool| B256::from(*pool)).collect();
    let last = words
        .last()
        .ok_or_else(|| MalformedCalldataError::new(selector, "empty pools"))?;

    let token_out = (last[0] & V3_WETH_UNWRAP_FLAG != 0).then_some(SwapToken::Native);

    Ok(Decoration {
        kind: DecorationKind::UniswapV3Swap,
        // the input side is msg.value or a pool token, neither is in the args
        token_in: None,
        token_out,
        amount_in: amount,
        min_amount_out: min_return,
        recipient,
        pools: words.iter().map(|word| Address::from_word(*word)).collect(),
        selector,
    })
}

/// clipperSwap(address srcToken, address dstToken, uint256 amount, uint256 minReturn)
fn decode_clipper_swap(args: &[u8]) -> Result<Decoration, MalformedCalldataError> {
    let call = clipperSwapCall::abi_decode_raw_validate(args).map_err(malformed(CLIPPER_SWAP))?;

    Ok(Decoration {
        kind: DecorationKind::ClipperSwap,
        token_in: Some(SwapToken::from_address_or_zero(call.srcToken)),
        token_out: Some(SwapToken::from_address_or_zero(call.dstToken)),
        amount_in: call.amount,
        min_amount_out: call.minReturn,
        recipient: None,
        pools: Vec::new(),
        selector: CLIPPER_SWAP,
    })
}

/// fillOrderRFQ(OrderRFQ order, bytes signature, uint256 makingAmount, uint256 takingAmount)
///
/// The sender is the taker: it pays `takerAsset` and receives `makerAsset`.
/// A zero amount argument means "the order's own amount".
fn decode_fill_order_rfq(args: &[u8]) -> Result<Decoration, MalformedCalldataError> {
    let call = fillOrderRFQCall::abi_decode_raw_validate(args).map_err(malformed(FILL_ORDER_RFQ))?;
    let order = call.order;

    let amount_in = if call.takingAmount.is_zero() {
        order.takingAmount
    } else {
        call.takingAmount
    };
    let min_amount_out = if call.makingAmount.is_zero() {
        order.makingAmount
    } else {
        call.makingAmount
    };

    Ok(Decoration {
        kind: DecorationKind::LiquidityFill,
        token_in: Some(SwapToken::from_address(order.takerAsset)),
        token_out: Some(SwapToken::from_address(order.makerAsset)),
        amount_in,
        min_amount_out,
        recipient: None,
        pools: Vec::new(),
        selector: FILL_ORDER_RFQ,
    })
}

// ── Helpers ─────────────────────────────────────────────────────────

fn malformed(selector: Selector) -> impl Fn(alloy::sol_types::Error) -> MalformedCalldataError {
    move |err| MalformedCalldataError::new(selector, err)
}

fn non_zero(address: Address) -> Option<Address> {
    (!address.is_zero()).then_some(address)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::contracts::IAggregationRouterV4::OrderRFQ;
    use crate::decoder::registry::{DecodeOutcome, MethodDecoderRegistry};
    use crate::decoder::types::NATIVE_SENTINEL;
    use alloy::primitives::Bytes;

    fn decode(input: &[u8]) -> DecodeOutcome {
        MethodDecoderRegistry::with_default_factories().decode_input(input)
    }

    fn pool_word(flag: u8, pool: Address) -> B256 {
        let mut word = [0u8; 32];
        word[0] = flag;
        word[12..].copy_from_slice(pool.as_slice());
        B256::from(word)
    }

    #[test]
    fn test_decode_swap() {
        let receiver = Address::repeat_byte(0x77);
        let input = swap_calldata(WETH, USDC, receiver);

        let decoration = decode(&input).into_decoration().unwrap();
        assert_eq!(decoration.kind, DecorationKind::Swap);
        assert_eq!(decoration.token_in, Some(SwapToken::Erc20(WETH)));
        assert_eq!(decoration.token_out, Some(SwapToken::Erc20(USDC)));
        assert_eq!(decoration.amount_in, U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(decoration.min_amount_out, U256::from(2_950_000_000u64));
        assert_eq!(decoration.recipient, Some(receiver));
        assert_eq!(decoration.selector, SWAP);
    }

    #[test]
    fn test_decode_swap_native_sentinel() {
        let input = swap_calldata(NATIVE_SENTINEL, USDC, Address::ZERO);
        let decoration = decode(&input).into_decoration().unwrap();
        assert_eq!(decoration.token_in, Some(SwapToken::Native));
        assert_eq!(decoration.recipient, None);
    }

    #[test]
    fn test_every_registered_method_decodes() {
        let samples = every_method_calldata();
        assert_eq!(samples.len(), MethodDecoderRegistry::with_default_factories().len());

        for (selector, input) in samples {
            assert_eq!(&input[..4], selector.0.as_slice());
            let decoration = decode(&input).into_decoration().unwrap();
            assert_eq!(decoration.selector, selector);
        }
    }

    #[test]
    fn test_decode_is_deterministic() {
        let input = swap_calldata(WETH, USDC, Address::repeat_byte(0x77));
        assert_eq!(decode(&input), decode(&input));
    }

    #[test]
    fn test_decode_unoswap_with_weth_unwrap() {
        let pair_a = Address::repeat_byte(0xa1);
        let pair_b = Address::repeat_byte(0xb2);
        let input = unoswap_calldata(
            USDC,
            vec![pool_word(0x80, pair_a), pool_word(UNOSWAP_WETH_FLAG, pair_b)],
        );

        let decoration = decode(&input).into_decoration().unwrap();
        assert_eq!(decoration.kind, DecorationKind::Unoswap);
        assert_eq!(decoration.token_in, Some(SwapToken::Erc20(USDC)));
        assert_eq!(decoration.token_out, Some(SwapToken::Native));
        assert_eq!(decoration.pools, vec![pair_a, pair_b]);
        assert_eq!(decoration.amount_in, U256::from(500u64));
        assert_eq!(decoration.min_amount_out, U256::from(490u64));
    }

    #[test]
    fn test_decode_unoswap_from_eth() {
        let input = unoswap_calldata(Address::ZERO, vec![pool_word(0, Address::repeat_byte(0xa1))]);
        let decoration = decode(&input).into_decoration().unwrap();
        assert_eq!(decoration.token_in, Some(SwapToken::Native));
        assert_eq!(decoration.token_out, None);
    }

    #[test]
    fn test_unoswap_empty_pools_is_malformed() {
        let input = unoswap_calldata(USDC, Vec::new());
        match decode(&input) {
            DecodeOutcome::Malformed(err) => {
                assert_eq!(err.selector, UNOSWAP);
                assert!(err.reason.contains("empty pools"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_unoswap_with_permit_shares_kind() {
        let input = unoswapWithPermitCall {
            srcToken: USDC,
            amount: U256::from(10u64),
            minReturn: U256::from(9u64),
            pools: vec![pool_word(0, Address::repeat_byte(0xa1))],
            permit: Bytes::from(vec![0x01; 32]),
        }
        .abi_encode();

        let decoration = decode(&input).into_decoration().unwrap();
        assert_eq!(decoration.kind, DecorationKind::Unoswap);
        assert_eq!(decoration.selector, UNOSWAP_WITH_PERMIT);
    }

    #[test]
    fn test_decode_uniswap_v3_swap_to() {
        let recipient = Address::repeat_byte(0x99);
        let pool = Address::repeat_byte(0x3c);
        let input = uniswapV3SwapToCall {
            recipient,
            amount: U256::from(7u64),
            minReturn: U256::from(6u64),
            pools: vec![U256::from_be_bytes(pool_word(0x80 | V3_WETH_UNWRAP_FLAG, pool).0)],
        }
        .abi_encode();

        let decoration = decode(&input).into_decoration().unwrap();
        assert_eq!(decoration.kind, DecorationKind::UniswapV3Swap);
        assert_eq!(decoration.token_in, None);
        assert_eq!(decoration.token_out, Some(SwapToken::Native));
        assert_eq!(decoration.recipient, Some(recipient));
        assert_eq!(decoration.pools, vec![pool]);
    }

    #[test]
    fn test_decode_uniswap_v3_swap_without_flags() {
        let pool = Address::repeat_byte(0x3c);
        let input = uniswapV3SwapCall {
            amount: U256::from(7u64),
            minReturn: U256::from(6u64),
            pools: vec![U256::from_be_bytes(pool_word(0, pool).0)],
        }
        .abi_encode();

        let decoration = decode(&input).into_decoration().unwrap();
        assert_eq!(decoration.token_out, None);
        assert_eq!(decoration.recipient, None);
    }

    #[test]
    fn test_decode_clipper_swap_eth_out() {
        let input = clipperSwapCall {
            srcToken: USDC,
            dstToken: Address::ZERO,
            amount: U256::from(1_000u64),
            minReturn: U256::from(1u64),
        }
        .abi_encode();

        let decoration = decode(&input).into_decoration().unwrap();
        assert_eq!(decoration.kind, DecorationKind::ClipperSwap);
        assert_eq!(decoration.token_in, Some(SwapToken::Erc20(USDC)));
        assert_eq!(decoration.token_out, Some(SwapToken::Native));
    }

    #[test]
    fn test_decode_fill_order_rfq() {
        let order = OrderRFQ {
            info: U256::from(1u64),
            makerAsset: WETH,
            takerAsset: USDC,
            maker: Address::repeat_byte(0x4d),
            allowedSender: Address::ZERO,
            makingAmount: U256::from(1_000u64),
            takingAmount: U256::from(3_000u64),
        };
        let input = fillOrderRFQCall {
            order,
            signature: Bytes::from(vec![0x1b; 65]),
            makingAmount: U256::ZERO,
            takingAmount: U256::from(1_500u64),
        }
        .abi_encode();

        let decoration = decode(&input).into_decoration().unwrap();
        assert_eq!(decoration.kind, DecorationKind::LiquidityFill);
        assert_eq!(decoration.token_in, Some(SwapToken::Erc20(USDC)));
        assert_eq!(decoration.token_out, Some(SwapToken::Erc20(WETH)));
        assert_eq!(decoration.amount_in, U256::from(1_500u64));
        assert_eq!(decoration.min_amount_out, U256::from(1_000u64));
    }

    #[test]
    fn test_truncated_args_are_malformed() {
        let input = swap_calldata(WETH, USDC, Address::ZERO);
        let truncated = &input[..input.len() / 2];
        assert!(matches!(decode(truncated), DecodeOutcome::Malformed(_)));
    }

    #[test]
    fn test_dirty_address_padding_is_malformed() {
        let mut input = unoswap_calldata(USDC, vec![pool_word(0, Address::repeat_byte(0xa1))]);
        // first byte of the srcToken word, which must be zero padding
        input[4] = 0xff;
        assert!(matches!(decode(&input), DecodeOutcome::Malformed(_)));
    }
}
