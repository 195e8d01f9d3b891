//! Host Chain Client Boundary
//!
//! Purpose:
//!     Capability traits the chain client calls into, and a small in-process
//!     host that owns the receipt store, the ordered decorator/watcher lists
//!     and the event loop that feeds them.
//!
//! Created: 2026-10-18
//!
//! Architecture:
//!     mod.rs  — TransactionDecorator, TransactionWatcher, ChainEvent, ChainHost
//!     rpc.rs  — alloy websocket feed producing ChainEvents

pub mod rpc;

use alloy::primitives::{Address, TxHash};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::decoder::Decoration;
use crate::error::OrphanReceiptError;
use crate::store::ReceiptStore;
use crate::types::{Transaction, TransactionReceipt};

/// Mined blocks kept below the head before their transactions are evicted.
/// Also the deepest reorg the feed will repair.
pub const DEFAULT_RETENTION_BLOCKS: u64 = 64;

/// Classifies transactions. Returns None to let the next decorator try.
pub trait TransactionDecorator: Send + Sync {
    fn decorate(&self, tx: &Transaction) -> Option<Decoration>;
}

/// Observes the transaction and receipt streams.
///
/// Hooks run on the ingestion path: they must be cheap and must not block.
pub trait TransactionWatcher: Send + Sync {
    fn on_new_transaction(&self, tx: &Transaction);
    fn on_new_receipt(&self, receipt: &TransactionReceipt);

    /// The transaction fell out of the host's retention window.
    fn on_evicted(&self, _hash: &TxHash) {}
}

/// Event produced by a chain feed
#[derive(Debug, Clone)]
pub enum ChainEvent {
    Transaction(Transaction),
    Receipt(TransactionReceipt),
    /// The transaction was dropped from the canonical chain
    Invalidated(TxHash),
}

pub struct ChainHost {
    chain_id: u64,
    receive_address: Address,
    store: ReceiptStore,
    decorators: RwLock<Vec<Arc<dyn TransactionDecorator>>>,
    watchers: RwLock<Vec<Arc<dyn TransactionWatcher>>>,
    retention: u64,
    /// Stored mined transactions by block number
    mined: Mutex<BTreeMap<u64, Vec<TxHash>>>,
}

impl ChainHost {
    pub fn new(chain_id: u64, receive_address: Address) -> Self {
        Self::with_retention(chain_id, receive_address, DEFAULT_RETENTION_BLOCKS)
    }

    /// Keep mined transactions for `retention` blocks below the highest block seen
    pub fn with_retention(chain_id: u64, receive_address: Address, retention: u64) -> Self {
        Self {
            chain_id,
            receive_address,
            store: ReceiptStore::new(),
            decorators: RwLock::new(Vec::new()),
            watchers: RwLock::new(Vec::new()),
            retention,
            mined: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Local wallet address used to scope relevant transactions
    pub fn receive_address(&self) -> Address {
        self.receive_address
    }

    pub fn store(&self) -> &ReceiptStore {
        &self.store
    }

    pub fn add_decorator(&self, decorator: Arc<dyn TransactionDecorator>) {
        self.decorators
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(decorator);
    }

    pub fn add_transaction_watcher(&self, watcher: Arc<dyn TransactionWatcher>) {
        self.watchers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(watcher);
    }

    /// First decorator (in registration order) that claims the transaction wins.
    pub fn decorate(&self, tx: &Transaction) -> Option<Decoration> {
        self.decorators
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .find_map(|decorator| decorator.decorate(tx))
    }

    pub fn ingest_transaction(&self, tx: Transaction) {
        self.store.insert_transaction(tx.clone());
        for watcher in self.watcher_snapshot() {
            watcher.on_new_transaction(&tx);
        }
        // pending transactions stay until invalidated or mined
        if let Some(block) = tx.block_number {
            self.retire_below(tx.hash, block);
        }
    }

    /// Store the receipt, then fan out. Orphans never reach the watchers.
    pub fn ingest_receipt(&self, receipt: TransactionReceipt) -> Result<(), OrphanReceiptError> {
        self.store.upsert(receipt.clone())?;
        for watcher in self.watcher_snapshot() {
            watcher.on_new_receipt(&receipt);
        }
        Ok(())
    }

    /// Reorg path: drop the transaction and, by cascade, its receipt.
    pub fn invalidate_transaction(&self, hash: &TxHash) -> Option<TransactionReceipt> {
        self.store.on_parent_deleted(hash)
    }

    pub fn handle(&self, event: ChainEvent) {
        match event {
            ChainEvent::Transaction(tx) => self.ingest_transaction(tx),
            ChainEvent::Receipt(receipt) => {
                // already logged by the store
                let _ = self.ingest_receipt(receipt);
            }
            ChainEvent::Invalidated(hash) => {
                self.invalidate_transaction(&hash);
            }
        }
    }

    /// Drain a feed until every sender is dropped.
    pub async fn run(&self, mut events: mpsc::Receiver<ChainEvent>) {
        info!(
            "Chain host running | chain_id={} | wallet={:?}",
            self.chain_id, self.receive_address
        );
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        info!("Chain feed closed | {} transactions stored", self.store.len());
    }

    pub fn retention(&self) -> u64 {
        self.retention
    }

    /// Index a mined transaction, then evict every block that fell out of the window
    fn retire_below(&self, hash: TxHash, block: u64) {
        let expired = {
            let mut mined = self.mined.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            mined.entry(block).or_default().push(hash);
            let head = mined.keys().next_back().copied().unwrap_or(block);
            let kept = mined.split_off(&head.saturating_sub(self.retention));
            std::mem::replace(&mut *mined, kept)
        };
        if expired.is_empty() {
            return;
        }

        let watchers = self.watcher_snapshot();
        let mut evicted = 0usize;
        for (block, hashes) in expired {
            for hash in hashes {
                // re-mined in a later block after a reorg: that entry owns it now
                let mined_at = self.store.transaction(&hash).and_then(|tx| tx.block_number);
                if mined_at != Some(block) {
                    continue;
                }
                self.store.on_parent_deleted(&hash);
                for watcher in &watchers {
                    watcher.on_evicted(&hash);
                }
                evicted += 1;
            }
        }
        debug!("Evicted {} transactions | {} stored", evicted, self.store.len());
    }

    // Callbacks run without holding the registration lock
    fn watcher_snapshot(&self) -> Vec<Arc<dyn TransactionWatcher>> {
        let watchers = self
            .watchers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        debug!("Dispatching to {} watchers", watchers.len());
        watchers
    }
}
