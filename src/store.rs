//! Receipt Store
//!
//! Thread-safe transaction + receipt storage using DashMap.
//!
//! Each transaction hash owns a single map entry holding the transaction and
//! its optional receipt. Receipt upserts and parent deletion therefore lock
//! the same entry: whatever order they run in, no receipt survives without
//! its transaction.
//!
//! Created: 2026-10-18

use alloy::primitives::TxHash;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::OrphanReceiptError;
use crate::host::TransactionWatcher;
use crate::types::{Transaction, TransactionReceipt};

/// Parent transaction plus its execution result, if any
#[derive(Debug, Clone)]
struct Record {
    transaction: Transaction,
    receipt: Option<TransactionReceipt>,
}

/// Passive receipt cache with cascading delete.
///
/// Cloning is cheap and shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct ReceiptStore {
    records: Arc<DashMap<TxHash, Record>>,
}

impl ReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a parent transaction. Re-inserting a known hash replaces the
    /// transaction and keeps its receipt.
    pub fn insert_transaction(&self, transaction: Transaction) {
        let hash = transaction.hash;
        match self.records.entry(hash) {
            Entry::Occupied(mut entry) => entry.get_mut().transaction = transaction,
            Entry::Vacant(entry) => {
                entry.insert(Record {
                    transaction,
                    receipt: None,
                });
            }
        }
        debug!("Transaction stored: {:?}", hash);
    }

    /// Insert or replace the receipt for its transaction (last write wins).
    pub fn upsert(&self, receipt: TransactionReceipt) -> Result<(), OrphanReceiptError> {
        let hash = receipt.transaction_hash;
        match self.records.get_mut(&hash) {
            Some(mut record) => {
                debug!(
                    "Receipt stored: {:?} | block={} status={:?}",
                    hash, receipt.block_number, receipt.status
                );
                record.receipt = Some(receipt);
                Ok(())
            }
            None => {
                warn!("Rejected receipt for unknown transaction {:?}", hash);
                Err(OrphanReceiptError { tx_hash: hash })
            }
        }
    }

    /// Receipt for a transaction. None while pending or unknown.
    pub fn get(&self, hash: &TxHash) -> Option<TransactionReceipt> {
        self.records
            .get(hash)
            .and_then(|record| record.receipt.clone())
    }

    pub fn transaction(&self, hash: &TxHash) -> Option<Transaction> {
        self.records.get(hash).map(|record| record.transaction.clone())
    }

    pub fn contains_transaction(&self, hash: &TxHash) -> bool {
        self.records.contains_key(hash)
    }

    /// Delete a transaction and cascade to its receipt.
    /// Returns the receipt that was removed with it, if there was one.
    pub fn on_parent_deleted(&self, hash: &TxHash) -> Option<TransactionReceipt> {
        let removed = self.records.remove(hash).and_then(|(_, record)| record.receipt);
        debug!(
            "Transaction deleted: {:?} (receipt cascaded: {})",
            hash,
            removed.is_some()
        );
        removed
    }

    /// Number of stored transactions
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of stored receipts
    pub fn receipt_count(&self) -> usize {
        self.records
            .iter()
            .filter(|entry| entry.value().receipt.is_some())
            .count()
    }
}

/// Lets a host without its own store feed this one as a plain watcher.
impl TransactionWatcher for ReceiptStore {
    fn on_new_transaction(&self, tx: &Transaction) {
        self.insert_transaction(tx.clone());
    }

    fn on_new_receipt(&self, receipt: &TransactionReceipt) {
        // orphans are already logged by upsert
        let _ = self.upsert(receipt.clone());
    }

    fn on_evicted(&self, hash: &TxHash) {
        self.on_parent_deleted(hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::{receipt, transaction};
    use alloy::primitives::{Address, Bytes, B256};
    use std::thread;

    fn tx(hash: TxHash) -> Transaction {
        transaction(hash, Address::repeat_byte(0x01), None, Bytes::new())
    }

    #[test]
    fn test_upsert_and_get() {
        let store = ReceiptStore::new();
        let hash = B256::repeat_byte(0x10);
        store.insert_transaction(tx(hash));

        assert!(store.get(&hash).is_none());
        store.upsert(receipt(hash, Some(1))).unwrap();

        let stored = store.get(&hash).unwrap();
        assert_eq!(stored.transaction_hash, hash);
        assert_eq!(store.receipt_count(), 1);
    }

    #[test]
    fn test_upsert_last_write_wins() {
        let store = ReceiptStore::new();
        let hash = B256::repeat_byte(0x11);
        store.insert_transaction(tx(hash));

        store.upsert(receipt(hash, Some(1))).unwrap();
        let mut replacement = receipt(hash, Some(0));
        replacement.block_number = 42;
        store.upsert(replacement).unwrap();

        let stored = store.get(&hash).unwrap();
        assert_eq!(stored.block_number, 42);
        assert_eq!(stored.status, Some(0));
        assert_eq!(store.receipt_count(), 1);
    }

    #[test]
    fn test_orphan_receipt_rejected() {
        let store = ReceiptStore::new();
        let hash = B256::repeat_byte(0x12);

        let err = store.upsert(receipt(hash, Some(1))).unwrap_err();
        assert_eq!(err.tx_hash, hash);
        assert!(store.get(&hash).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_cascade_delete() {
        let store = ReceiptStore::new();
        let with_receipt = B256::repeat_byte(0x13);
        let without_receipt = B256::repeat_byte(0x14);
        store.insert_transaction(tx(with_receipt));
        store.insert_transaction(tx(without_receipt));
        store.upsert(receipt(with_receipt, Some(1))).unwrap();

        assert!(store.on_parent_deleted(&with_receipt).is_some());
        assert!(store.on_parent_deleted(&without_receipt).is_none());

        assert!(store.get(&with_receipt).is_none());
        assert!(store.get(&without_receipt).is_none());
        assert!(!store.contains_transaction(&with_receipt));

        // the parent is gone, so a late receipt is now an orphan
        assert!(store.upsert(receipt(with_receipt, Some(1))).is_err());
    }

    #[test]
    fn test_reinsert_keeps_receipt() {
        let store = ReceiptStore::new();
        let hash = B256::repeat_byte(0x15);
        store.insert_transaction(tx(hash));
        store.upsert(receipt(hash, Some(1))).unwrap();

        let mut mined = tx(hash);
        mined.block_number = Some(19_000_000);
        store.insert_transaction(mined);

        assert!(store.get(&hash).is_some());
        assert_eq!(store.transaction(&hash).unwrap().block_number, Some(19_000_000));
    }

    #[test]
    fn test_concurrent_upsert_and_delete_leave_no_orphans() {
        for round in 0..50u8 {
            let store = ReceiptStore::new();
            let hash = B256::repeat_byte(round);
            store.insert_transaction(tx(hash));

            let writer = {
                let store = store.clone();
                thread::spawn(move || {
                    let _ = store.upsert(receipt(hash, Some(1)));
                })
            };
            let deleter = {
                let store = store.clone();
                thread::spawn(move || {
                    store.on_parent_deleted(&hash);
                })
            };
            writer.join().unwrap();
            deleter.join().unwrap();

            assert!(!store.contains_transaction(&hash));
            assert!(store.get(&hash).is_none());
        }
    }

    #[test]
    fn test_store_as_watcher() {
        let store = ReceiptStore::new();
        let hash = B256::repeat_byte(0x16);

        let watcher: &dyn TransactionWatcher = &store;
        watcher.on_new_receipt(&receipt(hash, Some(1)));
        assert!(store.is_empty());

        watcher.on_new_transaction(&tx(hash));
        watcher.on_new_receipt(&receipt(hash, Some(1)));
        assert!(store.get(&hash).is_some());

        watcher.on_evicted(&hash);
        assert!(store.is_empty());
    }
}
