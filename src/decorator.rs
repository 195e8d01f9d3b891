//! Swap Decorator
//!
//! Classifies a transaction as a router swap. Declines (returns None) for
//! anything that is not a well-formed call to this chain's router; decoding
//! failures never escape this boundary.
//!
//! Created: 2026-10-18

use alloy::primitives::Address;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::decoder::{DecodeOutcome, Decoration, MethodDecoderRegistry, Selector};
use crate::error::UnrecognizedChainError;
use crate::host::TransactionDecorator;
use crate::router::router_address;
use crate::types::Transaction;

#[derive(Debug, Clone)]
pub struct SwapDecorator {
    chain_id: u64,
    router: Address,
    registry: Arc<MethodDecoderRegistry>,
}

impl SwapDecorator {
    /// Resolve the router for `chain_id` up front; unknown chains are rejected here.
    pub fn new(
        chain_id: u64,
        registry: Arc<MethodDecoderRegistry>,
    ) -> Result<Self, UnrecognizedChainError> {
        let router = router_address(chain_id)?;
        Ok(Self {
            chain_id,
            router,
            registry,
        })
    }

    /// Decorator with every router V4 method registered.
    pub fn for_chain(chain_id: u64) -> Result<Self, UnrecognizedChainError> {
        Self::new(chain_id, Arc::new(MethodDecoderRegistry::with_default_factories()))
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn router(&self) -> Address {
        self.router
    }

    pub fn registry(&self) -> &Arc<MethodDecoderRegistry> {
        &self.registry
    }

    /// Cheap pre-check, no decoding
    pub fn is_router_bound(&self, tx: &Transaction) -> bool {
        tx.to == Some(self.router)
    }

    pub fn decorate(&self, tx: &Transaction) -> Option<Decoration> {
        if !self.is_router_bound(tx) {
            return None;
        }

        let (selector, args) = match Selector::split(&tx.input) {
            Some(split) => split,
            None => {
                trace!("Router call without selector: {:?}", tx.hash);
                return None;
            }
        };

        let decoration = match self.registry.decode(selector, args) {
            DecodeOutcome::Decoded(decoration) => decoration,
            DecodeOutcome::Unrecognized => {
                trace!("Undecorated router call {:?} | selector={}", tx.hash, selector);
                return None;
            }
            DecodeOutcome::Malformed(err) => {
                debug!("Undecorated router call {:?}: {}", tx.hash, err);
                return None;
            }
        };

        if !decoration.has_well_formed_tokens() {
            debug!(
                "Undecorated router call {:?}: malformed token address (in={:?} out={:?})",
                tx.hash, decoration.token_in, decoration.token_out
            );
            return None;
        }

        Some(decoration)
    }
}

impl TransactionDecorator for SwapDecorator {
    fn decorate(&self, tx: &Transaction) -> Option<Decoration> {
        SwapDecorator::decorate(self, tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::methods::fixtures::{
        every_method_calldata, swap_calldata, unoswap_calldata, USDC, WETH,
    };
    use crate::decoder::methods::{SWAP, UNOSWAP};
    use crate::decoder::{DecorationKind, SwapToken};
    use crate::router::{ETHEREUM, MAINNET_ROUTER, OPTIMISM};
    use crate::types::fixtures::transaction;
    use alloy::primitives::{Bytes, B256, U256};

    fn tx_to(to: Address, input: Vec<u8>) -> Transaction {
        transaction(
            B256::repeat_byte(0xaa),
            Address::repeat_byte(0x01),
            Some(to),
            Bytes::from(input),
        )
    }

    #[test]
    fn test_unknown_chain_fails_at_construction() {
        let err = SwapDecorator::for_chain(43114).unwrap_err();
        assert_eq!(err.chain_id, 43114);
    }

    #[test]
    fn test_decorates_mainnet_swap() {
        let decorator = SwapDecorator::for_chain(ETHEREUM).unwrap();
        assert_eq!(decorator.router(), MAINNET_ROUTER);

        let tx = tx_to(MAINNET_ROUTER, swap_calldata(WETH, USDC, Address::ZERO));
        let decoration = decorator.decorate(&tx).unwrap();
        assert_eq!(decoration.kind, DecorationKind::Swap);
        assert_eq!(decoration.token_in, Some(SwapToken::Erc20(WETH)));
        assert_eq!(decoration.token_out, Some(SwapToken::Erc20(USDC)));
        assert_eq!(decoration.amount_in, U256::from(1_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_declines_other_destinations_for_every_selector() {
        let decorator = SwapDecorator::for_chain(ETHEREUM).unwrap();

        for (selector, input) in every_method_calldata() {
            let to_router = tx_to(MAINNET_ROUTER, input.clone());
            let decoration = decorator.decorate(&to_router).unwrap();
            assert_eq!(decoration.selector, selector);

            let elsewhere = tx_to(Address::repeat_byte(0x42), input.clone());
            assert!(decorator.decorate(&elsewhere).is_none(), "{} off-router", selector);

            let mut contract_creation = tx_to(MAINNET_ROUTER, input);
            contract_creation.to = None;
            assert!(decorator.decorate(&contract_creation).is_none(), "{} creation", selector);
        }
    }

    #[test]
    fn test_router_is_chain_specific() {
        // mainnet router address is not the Optimism router
        let decorator = SwapDecorator::for_chain(OPTIMISM).unwrap();
        let tx = tx_to(MAINNET_ROUTER, swap_calldata(WETH, USDC, Address::ZERO));
        assert!(decorator.decorate(&tx).is_none());
    }

    #[test]
    fn test_declines_unknown_selector_and_short_input() {
        let decorator = SwapDecorator::for_chain(ETHEREUM).unwrap();
        assert!(decorator
            .decorate(&tx_to(MAINNET_ROUTER, vec![0x12, 0x34, 0x56, 0x78, 0x00]))
            .is_none());
        assert!(decorator.decorate(&tx_to(MAINNET_ROUTER, vec![0x7c])).is_none());
    }

    #[test]
    fn test_malformed_calldata_degrades_to_none() {
        let decorator = SwapDecorator::for_chain(ETHEREUM).unwrap();
        let mut input = swap_calldata(WETH, USDC, Address::ZERO);
        input.truncate(100);
        assert_eq!(&input[..4], SWAP.0.as_slice());
        assert!(decorator.decorate(&tx_to(MAINNET_ROUTER, input)).is_none());
    }

    #[test]
    fn test_zero_token_address_downgrades() {
        let decorator = SwapDecorator::for_chain(ETHEREUM).unwrap();
        let tx = tx_to(MAINNET_ROUTER, swap_calldata(Address::ZERO, USDC, Address::ZERO));
        assert!(decorator.decorate(&tx).is_none());
    }

    #[test]
    fn test_late_registration_is_visible() {
        fn fake_unoswap(_args: &[u8]) -> Result<Decoration, crate::error::MalformedCalldataError> {
            Ok(Decoration {
                kind: DecorationKind::LiquidityFill,
                token_in: None,
                token_out: None,
                amount_in: U256::ZERO,
                min_amount_out: U256::ZERO,
                recipient: None,
                pools: Vec::new(),
                selector: UNOSWAP,
            })
        }

        let decorator = SwapDecorator::for_chain(ETHEREUM).unwrap();
        decorator.registry().register(UNOSWAP, fake_unoswap);

        let tx = tx_to(MAINNET_ROUTER, unoswap_calldata(USDC, vec![B256::repeat_byte(0x01)]));
        assert_eq!(
            decorator.decorate(&tx).unwrap().kind,
            DecorationKind::LiquidityFill
        );
    }
}
