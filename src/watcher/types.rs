//! Swap Watcher — Type Definitions
//!
//! Purpose:
//!     Per-hash watch state and the notification sent to listeners.
//!
//! Created: 2026-10-18
//!
//! Dependencies:
//!     - alloy (Address, TxHash)
//!     - chrono (timestamps)

use alloy::primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use std::fmt;

use crate::decoder::Decoration;

/// A decorated swap waiting for its receipt
#[derive(Debug, Clone)]
pub struct PendingSwap {
    pub tx_hash: TxHash,
    pub from: Address,
    pub decoration: Decoration,
    pub seen_at: DateTime<Utc>,
}

/// Watch state of one transaction hash.
///
/// `Pending` moves to exactly one terminal state. Terminal states keep no
/// decoration; they only remember that the hash was already reported.
#[derive(Debug, Clone)]
pub enum SwapState {
    Pending(PendingSwap),
    Confirmed,
    Reverted,
}

impl SwapState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SwapState::Pending(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    Succeeded,
    Failed,
}

impl fmt::Display for SwapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SwapOutcome::Succeeded => write!(f, "succeeded"),
            SwapOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Terminal notification, sent once per hash that reached `Pending`
#[derive(Debug, Clone)]
pub struct SwapEvent {
    pub tx_hash: TxHash,
    pub from: Address,
    pub decoration: Decoration,
    pub outcome: SwapOutcome,
    pub block_number: u64,
    pub gas_used: u64,
    pub seen_at: DateTime<Utc>,
    pub resolved_at: DateTime<Utc>,
}

impl SwapEvent {
    pub fn is_success(&self) -> bool {
        self.outcome == SwapOutcome::Succeeded
    }
}
