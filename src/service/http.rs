//! Aggregator HTTP client
//!
//! Stateless `reqwest` client for `{base_url}/v4.0/{chain_id}/...`. Every
//! call is an independent GET; dropping the returned future cancels it.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::dto::{ApproveCallData, Quote, QuoteParams, Spender, Swap, SwapParams};
use super::AggregatorService;
use crate::error::{ServiceError, ServiceResult};

pub const DEFAULT_API_URL: &str = "https://api.1inch.exchange";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const API_VERSION: &str = "v4.0";

#[derive(Debug, Clone)]
pub struct OneInchService {
    client: Client,
    base_url: Url,
    chain_id: u64,
    timeout: Duration,
}

impl OneInchService {
    pub fn new(chain_id: u64) -> ServiceResult<Self> {
        Self::with_base_url(DEFAULT_API_URL, chain_id, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url(base_url: &str, chain_id: u64, timeout: Duration) -> ServiceResult<Self> {
        let base_url = api_root(base_url, chain_id)?;
        Ok(Self {
            client: Client::new(),
            base_url,
            chain_id,
            timeout,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn endpoint(&self, path: &str) -> ServiceResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", path, e)))
    }

    #[tracing::instrument(level = "debug", skip(self, query), fields(chain_id = self.chain_id))]
    async fn send_request<T>(&self, path: &str, query: &[(&str, String)]) -> ServiceResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!("Aggregator {} answered {}", path, status);
            return Err(ServiceError::Status { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl AggregatorService for OneInchService {
    async fn quote(&self, params: &QuoteParams) -> ServiceResult<Quote> {
        self.send_request("quote", &params.query()).await
    }

    async fn swap(&self, params: &SwapParams) -> ServiceResult<Swap> {
        self.send_request("swap", &params.query()).await
    }

    async fn approve_call_data(&self, token: Address, amount: U256) -> ServiceResult<ApproveCallData> {
        let query = [("tokenAddress", token.to_string()), ("amount", amount.to_string())];
        self.send_request("approve/transaction", &query).await
    }

    async fn approve_spender(&self) -> ServiceResult<Spender> {
        self.send_request("approve/spender", &[]).await
    }
}

/// `{base}/v4.0/{chain_id}/`, with the trailing slash `Url::join` needs
fn api_root(base_url: &str, chain_id: u64) -> ServiceResult<Url> {
    let root = format!(
        "{}/{}/{}/",
        base_url.trim_end_matches('/'),
        API_VERSION,
        chain_id
    );
    let url = Url::parse(&root).map_err(|e| ServiceError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(ServiceError::InvalidUrl(base_url.to_string()));
    }
    Ok(url)
}
