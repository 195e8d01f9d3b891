//! Aggregator Service Module
//!
//! Purpose:
//!     Remote quote, swap and approve requests against the 1inch aggregation
//!     API. Independent of the decoding pipeline; nothing here touches the
//!     receipt store or the watcher.
//!
//! Created: 2026-10-18
//!
//! Architecture:
//!     dto.rs   — request parameters and response types
//!     http.rs  — OneInchService (reqwest client)

pub mod dto;
pub mod http;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::error::ServiceResult;

pub use dto::{ApproveCallData, GasPrice, Quote, QuoteParams, Spender, Swap, SwapParams, SwapTransaction, Token};
pub use http::{OneInchService, DEFAULT_API_URL, DEFAULT_TIMEOUT};

/// Remote aggregator API
#[async_trait]
pub trait AggregatorService: Send + Sync {
    async fn quote(&self, params: &QuoteParams) -> ServiceResult<Quote>;

    async fn swap(&self, params: &SwapParams) -> ServiceResult<Swap>;

    /// Approve transaction letting the router spend `amount` of `token`
    async fn approve_call_data(&self, token: Address, amount: U256) -> ServiceResult<ApproveCallData>;

    /// Address that must be approved (the router)
    async fn approve_spender(&self) -> ServiceResult<Spender>;
}
