use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::{BlockNumberOrTag, Filter, TransactionRequest};
use async_trait::async_trait;

use crate::error::{short_message, EngineError};
use crate::logs::LogRecord;

/// The read-only chain capability the engines are written against.
///
/// Production uses [`RpcReader`] over an alloy provider; tests substitute
/// in-memory mocks so stage ordering and call counts can be asserted.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Deployed bytecode at an address; empty bytes means no contract.
    async fn get_code(&self, address: Address) -> Result<Bytes, EngineError>;

    /// `eth_call` with raw calldata. A revert surfaces as [`EngineError::Revert`].
    async fn call(&self, address: Address, calldata: Bytes) -> Result<Bytes, EngineError>;

    /// Raw 32-byte storage word at a fixed slot.
    async fn get_storage_at(&self, address: Address, slot: B256) -> Result<B256, EngineError>;

    /// Every log the address ever emitted, via a full-history filter.
    /// Only used on chains without a compatible explorer log API.
    async fn fetch_all_logs(&self, address: Address) -> Result<Vec<LogRecord>, EngineError>;
}

/// Alloy-backed implementation of [`ChainReader`].
#[derive(Clone)]
pub struct RpcReader {
    provider: DynProvider,
}

impl RpcReader {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ChainReader for RpcReader {
    async fn get_code(&self, address: Address) -> Result<Bytes, EngineError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| EngineError::Rpc(short_message(e)))
    }

    async fn call(&self, address: Address, calldata: Bytes) -> Result<Bytes, EngineError> {
        let tx = TransactionRequest::default()
            .with_to(address)
            .with_input(calldata);

        // Reverts and transport failures both land here; the probing call
        // sites only care that the call did not produce a value.
        self.provider
            .call(tx)
            .await
            .map_err(|e| EngineError::Revert(short_message(e)))
    }

    async fn get_storage_at(&self, address: Address, slot: B256) -> Result<B256, EngineError> {
        let word: U256 = self
            .provider
            .get_storage_at(address, slot.into())
            .await
            .map_err(|e| EngineError::Rpc(short_message(e)))?;
        Ok(B256::from(word))
    }

    async fn fetch_all_logs(&self, address: Address) -> Result<Vec<LogRecord>, EngineError> {
        let filter = Filter::new()
            .address(address)
            .from_block(BlockNumberOrTag::Earliest)
            .to_block(BlockNumberOrTag::Latest);

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| EngineError::Rpc(short_message(e)))?;

        Ok(logs
            .iter()
            .map(|log| LogRecord {
                data: log.inner.data.data.clone(),
                topics: log.inner.data.topics().to_vec(),
                block_number: log.block_number.unwrap_or(0),
            })
            .collect())
    }
}
