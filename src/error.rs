//! Error Types
//!
//! Purpose:
//!     Typed failures for the store, the calldata decoder, the router table and
//!     the aggregator HTTP service. Decode and receipt anomalies are absorbed by
//!     their callers; only configuration errors are meant to reach the user.
//!
//! Created: 2026-10-18

use alloy::primitives::TxHash;

use crate::decoder::Selector;

/// A receipt was offered for a transaction the store has never seen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("receipt for unknown transaction {tx_hash}")]
pub struct OrphanReceiptError {
    pub tx_hash: TxHash,
}

/// A selector matched a registered method but its arguments did not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed calldata for selector {selector}: {reason}")]
pub struct MalformedCalldataError {
    pub selector: Selector,
    pub reason: String,
}

impl MalformedCalldataError {
    pub fn new(selector: Selector, reason: impl ToString) -> Self {
        Self {
            selector,
            reason: reason.to_string(),
        }
    }
}

/// No router address is known for this chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no aggregation router configured for chain id {chain_id}")]
pub struct UnrecognizedChainError {
    pub chain_id: u64,
}

/// A host for another chain was handed to a kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("host runs chain id {found}, kit is bound to chain id {expected}")]
pub struct ChainMismatchError {
    pub expected: u64,
    pub found: u64,
}

/// Failures of a single aggregator API request.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Transport failure (connect, TLS, timeout).
    #[error("aggregator request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("aggregator returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body did not match the expected schema.
    #[error("malformed aggregator response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid aggregator url: {0}")]
    InvalidUrl(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
