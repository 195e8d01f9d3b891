//! Swap Watcher Module
//!
//! Purpose:
//!     Follow the local wallet's router swaps from submission to receipt and
//!     broadcast one terminal event per swap.
//!
//! Created: 2026-10-18
//!
//! Architecture:
//!     types.rs         — PendingSwap, SwapState, SwapOutcome, SwapEvent
//!     swap_watcher.rs  — SwapWatcher (ingestion hooks, state machine, broadcast)

pub mod swap_watcher;
pub mod types;

pub use swap_watcher::{SwapWatcher, DEFAULT_EVENT_CAPACITY};
pub use types::{PendingSwap, SwapEvent, SwapOutcome, SwapState};
