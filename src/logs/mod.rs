pub mod fetcher;
pub mod schema;

use alloy::primitives::{Bytes, B256};
use async_trait::async_trait;

/// One event log as the decoder consumes it. Transient — produced by a
/// fetch strategy and summed immediately, never persisted.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub data: Bytes,
    pub topics: Vec<B256>,
    pub block_number: u64,
}

/// A strategy for retrieving every log a contract emitted under one topic.
///
/// Returns `None` when zero records matched (or the scan failed) — callers
/// iterate several topic shapes and use `None` to move on to the next one.
#[async_trait]
pub trait TopicScanner: Send + Sync {
    async fn scan(&self, address: alloy::primitives::Address, topic: B256)
        -> Option<Vec<LogRecord>>;
}
