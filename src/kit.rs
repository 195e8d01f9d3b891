//! OneInchKit Facade
//!
//! Purpose:
//!     Single entry point for a wallet on one chain: the router address, the
//!     remote quote / swap / approve requests, and registration of the swap
//!     decorator and watcher with a `ChainHost`.
//!
//! Created: 2026-10-18
//!
//! Usage:
//!     let kit = OneInchKit::from_config(&config)?;
//!     kit.add_decorator(&host)?;
//!     let watcher = kit.add_transaction_watcher(&host, config.event_capacity)?;
//!     let quote = kit.get_quote(&QuoteParams::new(from, to, amount)).await?;
//!
//! The decorator and the watcher share one `SwapDecorator`, so methods
//! registered on `kit.decorator().registry()` reach both.

use alloy::primitives::{Address, U256};
use anyhow::Result;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

use crate::config::KitConfig;
use crate::decorator::SwapDecorator;
use crate::error::{ChainMismatchError, ServiceResult, UnrecognizedChainError};
use crate::host::ChainHost;
use crate::service::{
    AggregatorService, ApproveCallData, OneInchService, Quote, QuoteParams, Spender, Swap,
    SwapParams,
};
use crate::watcher::SwapWatcher;

pub struct OneInchKit {
    chain_id: u64,
    receive_address: Address,
    decorator: Arc<SwapDecorator>,
    service: Arc<dyn AggregatorService>,
}

impl OneInchKit {
    pub fn new(
        chain_id: u64,
        receive_address: Address,
        service: Arc<dyn AggregatorService>,
    ) -> Result<Self, UnrecognizedChainError> {
        let decorator = Arc::new(SwapDecorator::for_chain(chain_id)?);
        Ok(Self {
            chain_id,
            receive_address,
            decorator,
            service,
        })
    }

    /// Kit backed by the public aggregator API
    pub fn from_config(config: &KitConfig) -> Result<Self> {
        let service = OneInchService::with_base_url(
            &config.oneinch_api_url,
            config.chain_id,
            config.request_timeout(),
        )?;
        Ok(Self::new(config.chain_id, config.receive_address, Arc::new(service))?)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn router_address(&self) -> Address {
        self.decorator.router()
    }

    /// Decorator shared by everything this kit registers
    pub fn decorator(&self) -> &Arc<SwapDecorator> {
        &self.decorator
    }

    pub fn receive_address(&self) -> Address {
        self.receive_address
    }

    pub async fn get_quote(&self, params: &QuoteParams) -> ServiceResult<Quote> {
        self.service.quote(params).await
    }

    /// Swap parameters sent from the local wallet
    pub fn swap_params(&self, quote: QuoteParams, slippage: Decimal) -> SwapParams {
        SwapParams::new(quote, self.receive_address, slippage)
    }

    pub async fn get_swap(&self, params: &SwapParams) -> ServiceResult<Swap> {
        self.service.swap(params).await
    }

    pub async fn get_approve_call_data(
        &self,
        token: Address,
        amount: U256,
    ) -> ServiceResult<ApproveCallData> {
        self.service.approve_call_data(token, amount).await
    }

    pub async fn get_spender(&self) -> ServiceResult<Spender> {
        self.service.approve_spender().await
    }

    /// Register the swap decorator with the host
    pub fn add_decorator(&self, host: &ChainHost) -> Result<Arc<SwapDecorator>, ChainMismatchError> {
        self.check_chain(host)?;
        host.add_decorator(self.decorator.clone());
        info!("Swap decorator registered | router={:?}", self.decorator.router());
        Ok(self.decorator.clone())
    }

    /// Register a swap watcher for the host's wallet and return it for subscription
    pub fn add_transaction_watcher(
        &self,
        host: &ChainHost,
        event_capacity: usize,
    ) -> Result<Arc<SwapWatcher>, ChainMismatchError> {
        self.check_chain(host)?;
        let watcher = Arc::new(SwapWatcher::new(
            host.receive_address(),
            self.decorator.clone(),
            event_capacity,
        ));
        host.add_transaction_watcher(watcher.clone());
        info!("Swap watcher registered | wallet={:?}", host.receive_address());
        Ok(watcher)
    }

    fn check_chain(&self, host: &ChainHost) -> Result<(), ChainMismatchError> {
        if host.chain_id() != self.chain_id {
            return Err(ChainMismatchError {
                expected: self.chain_id,
                found: host.chain_id(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::IERC20::approveCall;
    use crate::decoder::{Decoration, DecorationKind, Selector};
    use crate::error::{MalformedCalldataError, ServiceError};
    use crate::router::{ETHEREUM, MAINNET_ROUTER, OPTIMISM, OPTIMISM_ROUTER};
    use crate::service::Token;
    use crate::types::fixtures::transaction;
    use alloy::primitives::{address, Bytes, B256};
    use alloy::sol_types::SolCall;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    const WALLET: Address = Address::repeat_byte(0x01);
    const DAI: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");

    /// Canned responses; records the swap params it was asked for
    #[derive(Default)]
    struct MockService {
        swap_requests: Mutex<Vec<SwapParams>>,
    }

    fn token(symbol: &str, address: Address) -> Token {
        Token {
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            decimals: 18,
            address,
            logo_uri: None,
        }
    }

    #[async_trait::async_trait]
    impl AggregatorService for MockService {
        async fn quote(&self, params: &QuoteParams) -> ServiceResult<Quote> {
            Ok(Quote {
                from_token: token("ETH", params.from_token),
                to_token: token("DAI", params.to_token),
                from_token_amount: params.amount,
                to_token_amount: params.amount * U256::from(3000u64),
                route: serde_json::Value::Null,
                estimated_gas: 150_000,
            })
        }

        async fn swap(&self, params: &SwapParams) -> ServiceResult<Swap> {
            self.swap_requests
                .lock()
                .unwrap()
                .push(params.clone());
            Err(ServiceError::Status {
                status: reqwest::StatusCode::BAD_REQUEST,
                body: "insufficient liquidity".to_string(),
            })
        }

        async fn approve_call_data(&self, token: Address, amount: U256) -> ServiceResult<ApproveCallData> {
            let call = approveCall {
                spender: MAINNET_ROUTER,
                amount,
            };
            Ok(ApproveCallData {
                data: Bytes::from(call.abi_encode()),
                gas_price: Some(1),
                to: token,
                value: U256::ZERO,
            })
        }

        async fn approve_spender(&self) -> ServiceResult<Spender> {
            Ok(Spender {
                address: MAINNET_ROUTER,
            })
        }
    }

    fn kit(chain_id: u64) -> (OneInchKit, Arc<MockService>) {
        let service = Arc::new(MockService::default());
        let kit = OneInchKit::new(chain_id, WALLET, service.clone()).unwrap();
        (kit, service)
    }

    #[test]
    fn test_router_address_per_chain() {
        assert_eq!(kit(ETHEREUM).0.router_address(), MAINNET_ROUTER);
        assert_eq!(kit(OPTIMISM).0.router_address(), OPTIMISM_ROUTER);
    }

    #[test]
    fn test_unknown_chain_rejected() {
        let err = OneInchKit::new(250, WALLET, Arc::new(MockService::default()))
            .err()
            .unwrap();
        assert_eq!(err.chain_id, 250);
    }

    #[tokio::test]
    async fn test_quote_passes_through() {
        let (kit, _) = kit(ETHEREUM);
        let quote = kit
            .get_quote(&QuoteParams::new(Address::ZERO, DAI, U256::from(2u64)))
            .await
            .unwrap();
        assert_eq!(quote.to_token.address, DAI);
        assert_eq!(quote.to_token_amount, U256::from(6000u64));
    }

    #[tokio::test]
    async fn test_swap_is_sent_from_wallet_and_errors_propagate() {
        let (kit, service) = kit(ETHEREUM);
        let params = kit.swap_params(QuoteParams::new(Address::ZERO, DAI, U256::from(1u64)), dec!(1));

        let err = kit.get_swap(&params).await.unwrap_err();
        assert!(matches!(err, ServiceError::Status { .. }));

        let requests = service.swap_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].from_address, WALLET);
    }

    #[test]
    fn test_approve_and_spender() {
        let (kit, _) = kit(ETHEREUM);
        tokio_test::block_on(async {
            let a = kit.get_approve_call_data(DAI, U256::from(5u64)).await.unwrap();
            let b = kit.get_approve_call_data(DAI, U256::from(5u64)).await.unwrap();
            assert_eq!(a, b);
            assert_eq!(a.to, DAI);

            let (selector, args) = Selector::split(&a.data).unwrap();
            assert_eq!(selector.0, approveCall::SELECTOR);
            let call = approveCall::abi_decode_raw_validate(args).unwrap();
            assert_eq!(call.spender, MAINNET_ROUTER);
            assert_eq!(call.amount, U256::from(5u64));
            assert_eq!(kit.get_spender().await.unwrap().address, kit.router_address());
        });
    }

    #[test]
    fn test_registration_with_host() {
        let (kit, _) = kit(ETHEREUM);
        let host = ChainHost::new(ETHEREUM, WALLET);
        let decorator = kit.add_decorator(&host).unwrap();
        let watcher = kit.add_transaction_watcher(&host, 16).unwrap();

        assert!(Arc::ptr_eq(&decorator, kit.decorator()));
        assert_eq!(decorator.router(), MAINNET_ROUTER);
        assert_eq!(watcher.receive_address(), WALLET);
        assert_eq!(watcher.pending_count(), 0);
    }

    #[test]
    fn test_late_method_registration_reaches_watcher() {
        const CUSTOM: Selector = Selector([0x12, 0x34, 0x56, 0x78]);

        fn custom_fill(_args: &[u8]) -> Result<Decoration, MalformedCalldataError> {
            Ok(Decoration {
                kind: DecorationKind::LiquidityFill,
                token_in: None,
                token_out: None,
                amount_in: U256::from(1u64),
                min_amount_out: U256::ZERO,
                recipient: None,
                pools: Vec::new(),
                selector: CUSTOM,
            })
        }

        let (kit, _) = kit(ETHEREUM);
        let host = ChainHost::new(ETHEREUM, WALLET);
        kit.add_decorator(&host).unwrap();
        let watcher = kit.add_transaction_watcher(&host, 16).unwrap();

        kit.decorator().registry().register(CUSTOM, custom_fill);

        let hash = B256::repeat_byte(0x31);
        let tx = transaction(
            hash,
            WALLET,
            Some(MAINNET_ROUTER),
            Bytes::from(vec![0x12, 0x34, 0x56, 0x78]),
        );
        assert_eq!(host.decorate(&tx).unwrap().kind, DecorationKind::LiquidityFill);

        host.ingest_transaction(tx);
        assert!(watcher.state(&hash).unwrap().is_pending());
    }

    #[test]
    fn test_registration_rejects_other_chain() {
        let (kit, _) = kit(ETHEREUM);
        let host = ChainHost::new(OPTIMISM, WALLET);

        let err = kit.add_decorator(&host).err().unwrap();
        assert_eq!(err, ChainMismatchError { expected: ETHEREUM, found: OPTIMISM });
        assert!(kit.add_transaction_watcher(&host, 16).is_err());
    }
}
