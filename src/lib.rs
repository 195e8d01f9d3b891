//! 1inch Swap Kit Library
//!
//! Decodes 1inch aggregation router calls into swap decorations, correlates
//! them with receipts, and notifies listeners when the local wallet's swaps
//! succeed or revert. Also wraps the aggregator's quote / swap / approve API.
//!
//! Created: 2026-10-18

pub mod config;
pub mod contracts;
pub mod decoder;
pub mod decorator;
pub mod error;
pub mod host;
pub mod kit;
pub mod router;
pub mod service;
pub mod store;
pub mod types;
pub mod watcher;

// Re-export commonly used types
pub use config::KitConfig;
pub use decoder::{Decoration, DecorationKind, MethodDecoderRegistry, Selector, SwapToken};
pub use decorator::SwapDecorator;
pub use error::{ChainMismatchError, MalformedCalldataError, OrphanReceiptError, ServiceError, UnrecognizedChainError};
pub use host::{ChainEvent, ChainHost, TransactionDecorator, TransactionWatcher};
pub use kit::OneInchKit;
pub use router::router_address;
pub use store::ReceiptStore;
pub use types::{Transaction, TransactionReceipt};
pub use watcher::{SwapEvent, SwapOutcome, SwapWatcher};
