//! Log retrieval strategies.
//!
//! Chains with an Etherscan-compatible log search use [`PagedScanner`]:
//! fixed-size pages, block-cursor advancement, pacing, and bounded
//! rate-limit retries. Chains without one use [`FilterScanner`]: one
//! full-history RPC filter, topic-matched client side.

use std::time::Duration;

use alloy::primitives::{Address, B256};
use async_trait::async_trait;

use crate::chain::reader::ChainReader;
use crate::logs::{LogRecord, TopicScanner};

/// Provider page cap: a response shorter than this is the final page.
pub const PAGE_SIZE: usize = 1000;
/// Safety bound against runaway pagination.
pub const MAX_PAGES: usize = 500;
/// Pacing between successful pages (provider throughput limits).
pub const PAGE_DELAY: Duration = Duration::from_millis(350);
/// Backoff before retrying a rate-limited page.
pub const RATE_LIMIT_BACKOFF: Duration = Duration::from_millis(1500);
/// Consecutive rate-limit retries allowed for one page.
pub const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Outcome of fetching a single page from a log-search provider.
#[derive(Debug)]
pub enum PageOutcome {
    Logs(Vec<LogRecord>),
    RateLimited,
    Failed(String),
}

/// One page of a topic-filtered log search, starting at `from_block`.
#[async_trait]
pub trait LogPageSource: Send + Sync {
    async fn fetch_page(&self, address: Address, topic: B256, from_block: u64) -> PageOutcome;
}

/// Drive a [`LogPageSource`] through the full block range.
///
/// Never raises: a page that keeps rate-limiting past the retry budget
/// degrades to "fewer logs found" and whatever accumulated is returned.
/// `None` means zero records matched across the whole scan.
pub async fn fetch_paged_logs<S: LogPageSource>(
    source: &S,
    address: Address,
    topic: B256,
) -> Option<Vec<LogRecord>> {
    let mut all_logs: Vec<LogRecord> = Vec::new();
    let mut from_block = 0u64;
    let mut retries = 0u32;
    let mut pages_fetched = 0usize;

    while pages_fetched < MAX_PAGES {
        if pages_fetched > 0 {
            tokio::time::sleep(PAGE_DELAY).await;
        }

        match source.fetch_page(address, topic, from_block).await {
            PageOutcome::RateLimited => {
                if retries >= MAX_RATE_LIMIT_RETRIES {
                    tracing::warn!(
                        %address,
                        pages = pages_fetched,
                        accumulated = all_logs.len(),
                        "Rate limit retries exhausted, returning partial log set"
                    );
                    break;
                }
                retries += 1;
                tokio::time::sleep(RATE_LIMIT_BACKOFF).await;
                // Retry the same page: neither cursor nor page count advance.
                continue;
            }
            PageOutcome::Failed(msg) => {
                tracing::debug!(%address, error = %msg, "Log page fetch failed, stopping scan");
                break;
            }
            PageOutcome::Logs(page) => {
                retries = 0;
                if page.is_empty() {
                    break;
                }
                let page_len = page.len();
                let last_block = page.last().map(|l| l.block_number).unwrap_or(from_block);
                all_logs.extend(page);

                if page_len < PAGE_SIZE {
                    break;
                }
                from_block = last_block + 1;
                pages_fetched += 1;
            }
        }
    }

    if all_logs.is_empty() {
        None
    } else {
        Some(all_logs)
    }
}

/// Explorer-backed scanner (paged HTTP log search).
pub struct PagedScanner<S: LogPageSource> {
    source: S,
}

impl<S: LogPageSource> PagedScanner<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

#[async_trait]
impl<S: LogPageSource> TopicScanner for PagedScanner<S> {
    async fn scan(&self, address: Address, topic: B256) -> Option<Vec<LogRecord>> {
        fetch_paged_logs(&self.source, address, topic).await
    }
}

/// Direct-RPC scanner for chains without a compatible explorer API.
///
/// A failure yields `None` rather than propagating — the caller iterates
/// multiple topic shapes and one shape's failure must not abort the rest.
pub struct FilterScanner<R: ChainReader> {
    reader: R,
}

impl<R: ChainReader> FilterScanner<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

#[async_trait]
impl<R: ChainReader> TopicScanner for FilterScanner<R> {
    async fn scan(&self, address: Address, topic: B256) -> Option<Vec<LogRecord>> {
        match self.reader.fetch_all_logs(address).await {
            Ok(logs) => {
                let matched: Vec<LogRecord> = logs
                    .into_iter()
                    .filter(|l| l.topics.first() == Some(&topic))
                    .collect();
                if matched.is_empty() {
                    None
                } else {
                    Some(matched)
                }
            }
            Err(e) => {
                tracing::debug!(%address, error = %e, "RPC log filter failed");
                None
            }
        }
    }
}
