//! oneinch-watch
//!
//! Follows new blocks over a websocket, decodes the wallet's 1inch router
//! swaps and logs one line per swap when its receipt lands.
//!
//! Usage:
//!   oneinch-watch --config watch.toml
//!   CHAIN_ID=137 RECEIVE_ADDRESS=0x... WS_URL=wss://... oneinch-watch
//!
//! Stops on SIGINT / SIGTERM.
//!
//! Created: 2026-10-18

use anyhow::{Context, Result};
use clap::Parser;
use futures::StreamExt;
use oneinch_kit::host::rpc::{run_block_feed, FeedFilter};
use oneinch_kit::{ChainHost, KitConfig, OneInchKit, SwapEvent};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Channel between the block feed and the host
const FEED_BUFFER: usize = 1024;

/// Watch a wallet's 1inch swaps until they settle
#[derive(Parser)]
#[command(name = "oneinch-watch")]
struct Args {
    /// TOML config file; environment variables are used when absent
    #[arg(short, long, env = "ONEINCH_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured chain id
    #[arg(long)]
    chain_id: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    let mut config = match &args.config {
        Some(path) => KitConfig::load(path)?,
        None => KitConfig::from_env().context("Failed to load configuration from environment")?,
    };
    if let Some(chain_id) = args.chain_id {
        config.chain_id = chain_id;
        config.validate()?;
    }

    let kit = OneInchKit::from_config(&config)?;
    info!(
        "oneinch-watch starting | chain_id={} | router={:?} | wallet={:?}",
        kit.chain_id(),
        kit.router_address(),
        kit.receive_address()
    );

    let host = Arc::new(ChainHost::new(config.chain_id, config.receive_address));
    kit.add_decorator(&host)?;
    let watcher = kit.add_transaction_watcher(&host, config.event_capacity)?;

    let mut events = watcher.events();
    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => log_swap(&event),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!("Swap log lagged, {} events skipped", skipped);
                }
            }
        }
    });

    let (sender, receiver) = mpsc::channel(FEED_BUFFER);
    let filter = FeedFilter {
        receive_address: config.receive_address,
        router: kit.router_address(),
    };
    let ws_url = config.ws_url.clone();
    let mut feed = tokio::spawn(async move { run_block_feed(&ws_url, filter, sender).await });

    let host_loop = {
        let host = Arc::clone(&host);
        tokio::spawn(async move { host.run(receiver).await })
    };

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let signals_handle = signals.handle();

    tokio::select! {
        sig = signals.next() => {
            info!("Received signal {:?}, shutting down", sig);
            feed.abort();
        }
        result = &mut feed => {
            match result {
                Ok(Ok(())) => info!("Block feed finished"),
                Ok(Err(e)) => error!("Block feed failed: {:#}", e),
                Err(e) => error!("Block feed task panicked: {}", e),
            }
        }
    }
    signals_handle.close();

    // the feed owned the only sender, so the host drains and returns
    if let Err(e) = host_loop.await {
        error!("Host loop panicked: {}", e);
    }
    info!(
        "Stopped | {} swaps still pending | {} transactions stored",
        watcher.pending_count(),
        host.store().len()
    );
    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn log_swap(event: &SwapEvent) {
    let decoration = &event.decoration;
    let token = |token: &Option<oneinch_kit::SwapToken>| {
        token
            .as_ref()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    let latency = (event.resolved_at - event.seen_at).num_milliseconds();

    if event.is_success() {
        info!(
            "Swap {} {:?} | {} {} -> {} | block={} gas={} | {}ms",
            event.outcome,
            event.tx_hash,
            decoration.kind,
            token(&decoration.token_in),
            token(&decoration.token_out),
            event.block_number,
            event.gas_used,
            latency
        );
    } else {
        warn!(
            "Swap {} {:?} | {} {} -> {} | block={} gas={}",
            event.outcome,
            event.tx_hash,
            decoration.kind,
            token(&decoration.token_in),
            token(&decoration.token_out),
            event.block_number,
            event.gas_used
        );
    }
}
