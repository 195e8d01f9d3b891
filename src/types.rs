//! Chain Record Types
//!
//! Purpose:
//!     Core chain records shared by the store, decorator and watcher.
//!
//! Created: 2026-10-18
//!
//! Both records are immutable once built and identified by transaction hash.
//! Receipts compare and hash by `transaction_hash` only, so a re-delivered
//! receipt with different block data is still the same entity.

use alloy::consensus::{Eip658Value, TxReceipt};
use alloy::primitives::{Address, Bloom, Bytes, TxHash, B256, U256};
use std::hash::{Hash, Hasher};

/// Transaction as seen by the host chain client.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub hash: TxHash,
    pub nonce: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    /// None while the transaction is still pending.
    pub block_number: Option<u64>,
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Transaction {}

impl Hash for Transaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl From<&alloy::rpc::types::Transaction> for Transaction {
    fn from(tx: &alloy::rpc::types::Transaction) -> Self {
        use alloy::consensus::Transaction as ConsensusTx;
        use alloy::network::TransactionResponse;

        Self {
            hash: TransactionResponse::tx_hash(tx),
            nonce: ConsensusTx::nonce(tx),
            from: TransactionResponse::from(tx),
            to: ConsensusTx::to(tx),
            value: ConsensusTx::value(tx),
            input: ConsensusTx::input(tx).clone(),
            block_number: tx.block_number,
        }
    }
}

/// Execution result of a transaction.
#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub transaction_index: u64,
    pub block_hash: B256,
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub cumulative_gas_used: u64,
    pub gas_used: u64,
    pub contract_address: Option<Address>,
    pub logs_bloom: Bloom,
    /// Post-state root (pre-Byzantium receipts only)
    pub root: Option<B256>,
    /// 1 = success, 0 = failure, None = unknown (pre-Byzantium)
    pub status: Option<u8>,
}

impl TransactionReceipt {
    /// True only for an explicit failure status. Unknown status is not a failure.
    pub fn is_failed(&self) -> bool {
        self.status == Some(0)
    }
}

impl PartialEq for TransactionReceipt {
    fn eq(&self, other: &Self) -> bool {
        self.transaction_hash == other.transaction_hash
    }
}

impl Eq for TransactionReceipt {}

impl Hash for TransactionReceipt {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.transaction_hash.hash(state);
    }
}

impl From<&alloy::rpc::types::TransactionReceipt> for TransactionReceipt {
    fn from(receipt: &alloy::rpc::types::TransactionReceipt) -> Self {
        let (status, root) = match receipt.inner.status_or_post_state() {
            Eip658Value::Eip658(success) => (Some(u8::from(success)), None),
            Eip658Value::PostState(root) => (None, Some(root)),
        };

        Self {
            transaction_hash: receipt.transaction_hash,
            transaction_index: receipt.transaction_index.unwrap_or_default(),
            block_hash: receipt.block_hash.unwrap_or_default(),
            block_number: receipt.block_number.unwrap_or_default(),
            from: receipt.from,
            to: receipt.to,
            cumulative_gas_used: receipt.inner.cumulative_gas_used(),
            gas_used: receipt.gas_used,
            contract_address: receipt.contract_address,
            logs_bloom: receipt.inner.bloom(),
            root,
            status,
        }
    }
}
