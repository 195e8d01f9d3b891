//! Router Calldata Decoder
//!
//! Purpose:
//!     Turn a 4-byte selector plus ABI-encoded arguments into a typed swap
//!     decoration for the 1inch aggregation router.
//!
//! Created: 2026-10-18
//!
//! Architecture:
//!     types.rs     — Selector, Decoration, DecorationKind, SwapToken
//!     registry.rs  — MethodDecoderRegistry, MethodFactory, DecodeOutcome
//!     methods.rs   — router V4 method factories and their decoders

pub mod methods;
pub mod registry;
pub mod types;

pub use registry::{DecodeFn, DecodeOutcome, MethodDecoderRegistry, MethodFactory};
pub use types::{Decoration, DecorationKind, Selector, SwapToken, NATIVE_SENTINEL};
