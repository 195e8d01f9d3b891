//! Method Decoder Registry
//!
//! Purpose:
//!     Selector → decode function table. Method factories register their
//!     selectors at setup time; later registrations overwrite earlier ones.
//!
//! Created: 2026-10-18
//!
//! Notes:
//!     - Unknown selectors are a normal outcome (`DecodeOutcome::Unrecognized`),
//!       most calldata belongs to contracts we do not understand.
//!     - The table is read-mostly. A `RwLock` keeps a late registration from
//!       racing an in-flight decode.

use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, trace};

use super::methods;
use super::types::{Decoration, Selector};
use crate::error::MalformedCalldataError;

/// Pure decode function: argument bytes (selector stripped) → decoration
pub type DecodeFn = fn(&[u8]) -> Result<Decoration, MalformedCalldataError>;

/// Result of a registry lookup + decode
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Decoded(Decoration),
    /// No decoder registered for the selector
    Unrecognized,
    /// Decoder found, arguments did not parse
    Malformed(MalformedCalldataError),
}

impl DecodeOutcome {
    /// Collapse to the decoration, treating both failure shapes as "not a swap".
    pub fn into_decoration(self) -> Option<Decoration> {
        match self {
            DecodeOutcome::Decoded(decoration) => Some(decoration),
            DecodeOutcome::Unrecognized | DecodeOutcome::Malformed(_) => None,
        }
    }
}

/// A group of related router methods that registers itself in one go.
pub trait MethodFactory: Send + Sync {
    /// Name for logging
    fn name(&self) -> &str;

    /// (selector, decoder) pairs this factory provides
    fn methods(&self) -> Vec<(Selector, DecodeFn)>;
}

#[derive(Default)]
pub struct MethodDecoderRegistry {
    decoders: RwLock<HashMap<Selector, DecodeFn>>,
}

impl std::fmt::Debug for MethodDecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut selectors: Vec<Selector> = self.read_table().keys().copied().collect();
        selectors.sort();
        f.debug_struct("MethodDecoderRegistry")
            .field("selectors", &selectors)
            .finish()
    }
}

impl MethodDecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every router V4 method factory.
    pub fn with_default_factories() -> Self {
        let registry = Self::new();
        for factory in methods::default_factories() {
            registry.register_factory(factory.as_ref());
        }
        registry
    }

    /// Associate a selector with a decoder. Overwrites any previous mapping.
    pub fn register(&self, selector: Selector, decode_fn: DecodeFn) {
        let mut decoders = self
            .decoders
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if decoders.insert(selector, decode_fn).is_some() {
            debug!("Decoder for {} replaced", selector);
        }
    }

    pub fn register_factory(&self, factory: &dyn MethodFactory) {
        let methods = factory.methods();
        debug!("Registering {} methods from {}", methods.len(), factory.name());
        for (selector, decode_fn) in methods {
            self.register(selector, decode_fn);
        }
    }

    pub fn is_registered(&self, selector: Selector) -> bool {
        self.read_table().contains_key(&selector)
    }

    pub fn len(&self) -> usize {
        self.read_table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode argument bytes for a selector.
    pub fn decode(&self, selector: Selector, args: &[u8]) -> DecodeOutcome {
        // Copy the fn pointer out so the lock is not held while decoding
        let decode_fn = match self.read_table().get(&selector) {
            Some(decode_fn) => *decode_fn,
            None => {
                trace!("Unknown selector: {}", selector);
                return DecodeOutcome::Unrecognized;
            }
        };

        match decode_fn(args) {
            Ok(decoration) => DecodeOutcome::Decoded(decoration),
            Err(err) => DecodeOutcome::Malformed(err),
        }
    }

    /// Decode a full input buffer (selector + arguments).
    pub fn decode_input(&self, input: &[u8]) -> DecodeOutcome {
        match Selector::split(input) {
            Some((selector, args)) => self.decode(selector, args),
            None => DecodeOutcome::Unrecognized,
        }
    }

    fn read_table(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Selector, DecodeFn>> {
        self.decoders
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::types::{DecorationKind, SwapToken};
    use alloy::primitives::{Address, U256};

    const SEL: Selector = Selector([0xde, 0xad, 0xbe, 0xef]);

    fn fixed_swap(_args: &[u8]) -> Result<Decoration, MalformedCalldataError> {
        Ok(Decoration {
            kind: DecorationKind::Swap,
            token_in: Some(SwapToken::Native),
            token_out: Some(SwapToken::Erc20(Address::repeat_byte(0x22))),
            amount_in: U256::from(1),
            min_amount_out: U256::from(2),
            recipient: None,
            pools: Vec::new(),
            selector: SEL,
        })
    }

    fn fixed_fill(_args: &[u8]) -> Result<Decoration, MalformedCalldataError> {
        let mut decoration = fixed_swap(&[])?;
        decoration.kind = DecorationKind::LiquidityFill;
        Ok(decoration)
    }

    fn always_malformed(_args: &[u8]) -> Result<Decoration, MalformedCalldataError> {
        Err(MalformedCalldataError::new(SEL, "truncated"))
    }

    #[test]
    fn test_unknown_selector_is_unrecognized() {
        let registry = MethodDecoderRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.decode(SEL, &[]), DecodeOutcome::Unrecognized);
        assert_eq!(registry.decode_input(&[0x01, 0x02]), DecodeOutcome::Unrecognized);
    }

    #[test]
    fn test_later_registration_wins() {
        let registry = MethodDecoderRegistry::new();
        registry.register(SEL, fixed_swap);
        registry.register(SEL, fixed_fill);

        assert_eq!(registry.len(), 1);
        match registry.decode(SEL, &[]) {
            DecodeOutcome::Decoded(d) => assert_eq!(d.kind, DecorationKind::LiquidityFill),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_collapses_to_none() {
        let registry = MethodDecoderRegistry::new();
        registry.register(SEL, always_malformed);

        let outcome = registry.decode_input(&[0xde, 0xad, 0xbe, 0xef, 0x00]);
        assert!(matches!(outcome, DecodeOutcome::Malformed(_)));
        assert!(outcome.into_decoration().is_none());
    }

    #[test]
    fn test_default_factories_cover_router_methods() {
        let registry = MethodDecoderRegistry::with_default_factories();
        assert_eq!(registry.len(), 7);
    }
}
