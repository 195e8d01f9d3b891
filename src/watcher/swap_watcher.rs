//! Swap Watcher — State Machine
//!
//! Purpose:
//!     Track router swaps sent by (or paying out to) the local wallet from the
//!     moment the transaction is seen until its receipt arrives, then notify
//!     listeners exactly once.
//!
//! Created: 2026-10-18
//!
//! Notes:
//!     - Both hooks are synchronous and in-memory; they never block on I/O.
//!     - Duplicate transaction deliveries and receipts without a pending entry
//!       are ignored.
//!     - Emitted notifications are never retracted, even if the transaction is
//!       later invalidated by a reorg.
//!     - There is no timeout: a swap that never confirms stays pending.
//!     - A resolved entry is dropped when the host evicts its transaction;
//!       the host never replays an evicted hash.

use alloy::primitives::{Address, TxHash};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, trace, warn};

use super::types::{PendingSwap, SwapEvent, SwapOutcome, SwapState};
use crate::decorator::SwapDecorator;
use crate::host::TransactionWatcher;
use crate::types::{Transaction, TransactionReceipt};

/// Default listener buffer; slow listeners lag instead of blocking ingestion
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

pub struct SwapWatcher {
    receive_address: Address,
    decorator: Arc<SwapDecorator>,
    states: DashMap<TxHash, SwapState>,
    events: broadcast::Sender<SwapEvent>,
}

impl SwapWatcher {
    pub fn new(receive_address: Address, decorator: Arc<SwapDecorator>, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            receive_address,
            decorator,
            states: DashMap::new(),
            events,
        }
    }

    pub fn receive_address(&self) -> Address {
        self.receive_address
    }

    /// New listener; receives every event emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SwapEvent> {
        self.events.subscribe()
    }

    /// Listener as a `Stream`
    pub fn events(&self) -> BroadcastStream<SwapEvent> {
        BroadcastStream::new(self.subscribe())
    }

    pub fn state(&self, hash: &TxHash) -> Option<SwapState> {
        self.states.get(hash).map(|state| state.clone())
    }

    pub fn pending_count(&self) -> usize {
        self.states.iter().filter(|entry| entry.value().is_pending()).count()
    }

    /// Drop terminal entries. After pruning, a re-delivered transaction for a
    /// pruned hash would be tracked again, so call this only for hashes the
    /// host will not replay.
    pub fn prune_resolved(&self) -> usize {
        let before = self.states.len();
        self.states.retain(|_, state| state.is_pending());
        let pruned = before - self.states.len();
        debug!("Pruned {} resolved swap entries", pruned);
        pruned
    }

    /// Drop the entry for an evicted transaction unless it is still pending.
    pub fn forget(&self, hash: &TxHash) -> bool {
        self.states.remove_if(hash, |_, state| !state.is_pending()).is_some()
    }

    /// Ingestion hook for transactions. Idempotent per hash.
    pub fn on_new_transaction(&self, tx: &Transaction) {
        if !self.decorator.is_router_bound(tx) {
            return;
        }
        if self.states.contains_key(&tx.hash) {
            trace!("Duplicate transaction ignored: {:?}", tx.hash);
            return;
        }

        let decoration = match self.decorator.decorate(tx) {
            Some(decoration) => decoration,
            None => return,
        };

        let ours =
            tx.from == self.receive_address || decoration.recipient == Some(self.receive_address);
        if !ours {
            trace!("Router swap {:?} not related to local wallet", tx.hash);
            return;
        }

        match self.states.entry(tx.hash) {
            Entry::Occupied(_) => {
                trace!("Duplicate transaction ignored: {:?}", tx.hash);
            }
            Entry::Vacant(entry) => {
                info!(
                    "PENDING swap: {:?} | {} | in={} out={} | amount={} min_out={}",
                    tx.hash,
                    decoration.kind,
                    display_token(&decoration.token_in),
                    display_token(&decoration.token_out),
                    decoration.amount_in,
                    decoration.min_amount_out,
                );
                entry.insert(SwapState::Pending(PendingSwap {
                    tx_hash: tx.hash,
                    from: tx.from,
                    decoration,
                    seen_at: Utc::now(),
                }));
            }
        }
    }

    /// Ingestion hook for receipts. Resolves a pending swap, ignores anything else.
    pub fn on_new_receipt(&self, receipt: &TransactionReceipt) {
        let hash = receipt.transaction_hash;
        let outcome = if receipt.is_failed() {
            SwapOutcome::Failed
        } else {
            SwapOutcome::Succeeded
        };

        // Transition under the entry lock; notify after releasing it
        let pending = {
            let mut state = match self.states.get_mut(&hash) {
                Some(state) => state,
                None => {
                    trace!("Receipt for untracked transaction ignored: {:?}", hash);
                    return;
                }
            };
            let terminal = match outcome {
                SwapOutcome::Succeeded => SwapState::Confirmed,
                SwapOutcome::Failed => SwapState::Reverted,
            };
            match std::mem::replace(&mut *state, terminal) {
                SwapState::Pending(pending) => pending,
                resolved => {
                    *state = resolved;
                    trace!("Receipt for already reported swap ignored: {:?}", hash);
                    return;
                }
            }
        };

        let event = SwapEvent {
            tx_hash: hash,
            from: pending.from,
            decoration: pending.decoration,
            outcome,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
            seen_at: pending.seen_at,
            resolved_at: Utc::now(),
        };

        match outcome {
            SwapOutcome::Succeeded => info!(
                "CONFIRMED swap: {:?} | {} | block={} gas={}",
                hash, event.decoration.kind, event.block_number, event.gas_used
            ),
            SwapOutcome::Failed => warn!(
                "REVERTED swap: {:?} | {} | block={} gas={}",
                hash, event.decoration.kind, event.block_number, event.gas_used
            ),
        }

        if self.events.send(event).is_err() {
            debug!("No swap listeners for {:?}", hash);
        }
    }
}

impl TransactionWatcher for SwapWatcher {
    fn on_new_transaction(&self, tx: &Transaction) {
        SwapWatcher::on_new_transaction(self, tx)
    }

    fn on_new_receipt(&self, receipt: &TransactionReceipt) {
        SwapWatcher::on_new_receipt(self, receipt)
    }

    fn on_evicted(&self, hash: &TxHash) {
        if self.forget(hash) {
            trace!("Resolved swap {:?} evicted", hash);
        }
    }
}

fn display_token(token: &Option<crate::decoder::SwapToken>) -> String {
    token
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string())
}
