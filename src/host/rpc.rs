//! Websocket Block Feed
//!
//! Purpose:
//!     Turn an alloy websocket block subscription into `ChainEvent`s for a
//!     `ChainHost`: relevant transactions of each new block, their receipts,
//!     and invalidations when a block is replaced.
//!
//! Created: 2026-10-18
//!
//! Relevance:
//!     A transaction is forwarded when it is sent by the local wallet or
//!     addressed to the router (the wallet may only be the swap recipient).
//!
//! Delivery:
//!     A block is recorded only after every relevant receipt was fetched and
//!     all events were sent. Anything short of that leaves the height
//!     unrecorded, and the next header resumes from the last recorded block,
//!     so heights skipped by the subscription or a reconnect are backfilled.
//!
//! Reorgs:
//!     Before processing, the recorded hashes just below the resume height are
//!     compared with the canonical chain (the header's parent hash first, then
//!     fetched hashes), walking back while they differ. Every transaction
//!     forwarded from a block at or above the fork point is invalidated before
//!     the replacement blocks are read.

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, TxHash, B256};
use alloy::providers::{Provider, ProviderBuilder, WsConnect};
use anyhow::{Context, Result};
use futures::StreamExt;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{ChainEvent, DEFAULT_RETENTION_BLOCKS};
use crate::types::{Transaction, TransactionReceipt};

const MAX_RECONNECTS: u32 = 50;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

const RECEIPT_ATTEMPTS: u32 = 5;
const RECEIPT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Blocks kept for reorg detection, and the longest backfill after a gap
const REORG_DEPTH: u64 = DEFAULT_RETENTION_BLOCKS;

/// Which transactions the feed forwards
#[derive(Debug, Clone, Copy)]
pub struct FeedFilter {
    pub receive_address: Address,
    pub router: Address,
}

impl FeedFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        tx.from == self.receive_address || tx.to == Some(self.router)
    }
}

/// Fully processed blocks and the hashes forwarded from each
#[derive(Debug, Default)]
struct BlockWindow {
    blocks: BTreeMap<u64, (B256, Vec<TxHash>)>,
}

impl BlockWindow {
    fn hash_at(&self, number: u64) -> Option<B256> {
        self.blocks.get(&number).map(|(hash, _)| *hash)
    }

    fn head(&self) -> Option<u64> {
        self.blocks.keys().next_back().copied()
    }

    /// The header needs no work: already recorded, or older than the window
    fn is_settled(&self, number: u64, hash: B256) -> bool {
        let below_window = matches!(self.blocks.keys().next(), Some(&lowest) if number < lowest);
        below_window || self.hash_at(number) == Some(hash)
    }

    /// First height to process for a header at `number`, before fork checks
    fn resume_height(&self, number: u64) -> u64 {
        let resume = match self.head() {
            Some(head) => number.min(head + 1),
            None => number,
        };
        let floor = number.saturating_sub(REORG_DEPTH);
        if resume < floor {
            warn!(
                "Block feed gap of {} blocks, backfilling only from {}",
                number - resume,
                floor
            );
            return floor;
        }
        resume
    }

    /// Forget blocks from `number` up; returns the hashes forwarded from them
    fn rewind(&mut self, number: u64) -> Vec<TxHash> {
        self.blocks
            .split_off(&number)
            .into_values()
            .flat_map(|(_, hashes)| hashes)
            .collect()
    }

    fn record(&mut self, number: u64, hash: B256, forwarded: Vec<TxHash>) {
        self.blocks.insert(number, (hash, forwarded));
        let floor = number.saturating_sub(REORG_DEPTH);
        self.blocks = self.blocks.split_off(&floor);
    }
}

enum BlockStep {
    Recorded,
    /// The node has no block at this height yet
    Unavailable,
    /// The event receiver is gone
    Closed,
}

/// Walk back from `start` while the recorded parent differs from the
/// canonical hash at that height. Returns the lowest height to replace.
async fn fork_start<F, Fut>(window: &BlockWindow, mut start: u64, mut canonical_hash: F) -> Result<u64>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<B256>>,
{
    while start > 0 {
        let Some(recorded) = window.hash_at(start - 1) else {
            break;
        };
        if canonical_hash(start - 1).await? == recorded {
            break;
        }
        start -= 1;
    }
    Ok(start)
}

/// Poll for a receipt a bounded number of times
async fn await_receipt<R, F, Fut>(
    hash: TxHash,
    attempts: u32,
    delay: Duration,
    mut fetch: F,
) -> Result<R>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<R>>>,
{
    for attempt in 1..=attempts {
        if let Some(receipt) = fetch().await? {
            return Ok(receipt);
        }
        debug!(
            "Receipt for {:?} not available yet (attempt {}/{})",
            hash, attempt, attempts
        );
        if attempt < attempts {
            tokio::time::sleep(delay).await;
        }
    }
    anyhow::bail!("Receipt for {:?} still missing after {} attempts", hash, attempts)
}

/// Follow new blocks until the receiving side closes.
///
/// Connection failures are retried up to `MAX_RECONNECTS` times with a fixed
/// delay; the window of recorded blocks survives reconnects.
pub async fn run_block_feed(
    ws_url: &str,
    filter: FeedFilter,
    sender: mpsc::Sender<ChainEvent>,
) -> Result<()> {
    info!(
        "Block feed starting | wallet={:?} | router={:?}",
        filter.receive_address, filter.router
    );

    let mut window = BlockWindow::default();
    let mut reconnects = 0u32;

    loop {
        match follow_blocks(ws_url, filter, &sender, &mut window).await {
            Ok(()) => {
                info!("Block feed stopped: event receiver closed");
                return Ok(());
            }
            Err(e) => {
                reconnects += 1;
                if reconnects > MAX_RECONNECTS {
                    error!(
                        "Block feed: {} reconnects exhausted, giving up: {:#}",
                        MAX_RECONNECTS, e
                    );
                    return Err(e);
                }
                warn!(
                    "Block feed error (reconnect {}/{}): {:#}, retrying in {}s",
                    reconnects,
                    MAX_RECONNECTS,
                    e,
                    RECONNECT_DELAY.as_secs()
                );
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

/// One websocket session. Ok means the receiver is gone; Err asks for a reconnect.
async fn follow_blocks(
    ws_url: &str,
    filter: FeedFilter,
    sender: &mpsc::Sender<ChainEvent>,
    window: &mut BlockWindow,
) -> Result<()> {
    let provider = ProviderBuilder::new()
        .connect_ws(WsConnect::new(ws_url))
        .await
        .context("Block feed websocket connect failed")?;

    let subscription = provider
        .subscribe_blocks()
        .await
        .context("newHeads subscription failed")?;
    let mut headers = subscription.into_stream();
    info!("Block feed: newHeads subscription active");

    while let Some(header) = headers.next().await {
        let number = header.number;
        if window.is_settled(number, header.hash) {
            continue;
        }

        let parent_hash = header.parent_hash;
        let node = &provider;
        let start = fork_start(window, window.resume_height(number), move |height| async move {
            if height + 1 == number {
                return Ok(parent_hash);
            }
            canonical_hash(node, height).await
        })
        .await?;

        if window.head().is_some_and(|head| start <= head) {
            let invalidated = window.rewind(start);
            warn!(
                "Reorg from block {} to {} | invalidating {} transactions",
                start,
                number,
                invalidated.len()
            );
            for hash in invalidated {
                if sender.send(ChainEvent::Invalidated(hash)).await.is_err() {
                    return Ok(());
                }
            }
        }

        for height in start..=number {
            match process_block(&provider, height, filter, sender, window).await? {
                BlockStep::Recorded => {}
                BlockStep::Unavailable => {
                    debug!("Block {} not available yet, resuming on next header", height);
                    break;
                }
                BlockStep::Closed => return Ok(()),
            }
        }
    }

    anyhow::bail!("newHeads subscription ended")
}

async fn canonical_hash<P: Provider>(provider: &P, number: u64) -> Result<B256> {
    let block = provider
        .get_block_by_number(BlockNumberOrTag::Number(number))
        .await
        .with_context(|| format!("Failed to fetch block {}", number))?;
    block
        .map(|block| block.header.hash)
        .with_context(|| format!("Block {} not available", number))
}

/// Fetch a block and all relevant receipts, then send and record it.
async fn process_block<P: Provider>(
    provider: &P,
    number: u64,
    filter: FeedFilter,
    sender: &mpsc::Sender<ChainEvent>,
    window: &mut BlockWindow,
) -> Result<BlockStep> {
    let block = provider
        .get_block_by_number(BlockNumberOrTag::Number(number))
        .full()
        .await
        .with_context(|| format!("Failed to fetch block {}", number))?;
    let Some(block) = block else {
        return Ok(BlockStep::Unavailable);
    };

    let relevant: Vec<Transaction> = block
        .transactions
        .txns()
        .map(Transaction::from)
        .filter(|tx| filter.matches(tx))
        .collect();

    let mut receipts = Vec::with_capacity(relevant.len());
    for tx in &relevant {
        let hash = tx.hash;
        let receipt = await_receipt(hash, RECEIPT_ATTEMPTS, RECEIPT_RETRY_DELAY, move || async move {
            provider
                .get_transaction_receipt(hash)
                .await
                .with_context(|| format!("Failed to fetch receipt {:?}", hash))
        })
        .await?;
        receipts.push(TransactionReceipt::from(&receipt));
    }

    let mut forwarded = Vec::with_capacity(relevant.len());
    for (tx, receipt) in relevant.into_iter().zip(receipts) {
        forwarded.push(tx.hash);
        if sender.send(ChainEvent::Transaction(tx)).await.is_err() {
            return Ok(BlockStep::Closed);
        }
        if sender.send(ChainEvent::Receipt(receipt)).await.is_err() {
            return Ok(BlockStep::Closed);
        }
    }

    if !forwarded.is_empty() {
        debug!("Block {} | forwarded {} transactions", number, forwarded.len());
    }
    window.record(number, block.header.hash, forwarded);
    Ok(BlockStep::Recorded)
}
