use std::collections::HashMap;
use std::sync::RwLock;

use alloy::providers::{DynProvider, Provider, ProviderBuilder};

use crate::chain::chains::{chain_spec, ChainSpec};
use crate::error::EngineError;

/// Process-wide cache of read-only RPC providers, one per chain.
///
/// The first call for a chain id establishes the connection; later calls
/// are pure lookups. Entries are never evicted — the chain set is static
/// and small. Two tasks racing on the first call may both construct a
/// provider; last writer wins, which is fine because both are equivalent.
pub struct ChainRegistry {
    clients: RwLock<HashMap<u64, DynProvider>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    pub fn spec(&self, chain_id: u64) -> Result<&'static ChainSpec, EngineError> {
        chain_spec(chain_id).ok_or(EngineError::UnsupportedChain(chain_id))
    }

    pub fn get_client(&self, chain_id: u64) -> Result<DynProvider, EngineError> {
        let spec = self.spec(chain_id)?;

        if let Some(client) = self
            .clients
            .read()
            .expect("client cache lock poisoned")
            .get(&chain_id)
        {
            return Ok(client.clone());
        }

        let url = spec
            .rpc_http
            .parse()
            .map_err(|e| EngineError::Rpc(format!("Invalid RPC URL for {}: {}", spec.name, e)))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        self.clients
            .write()
            .expect("client cache lock poisoned")
            .insert(chain_id, provider.clone());

        tracing::debug!(chain = spec.name, chain_id, "RPC client connected");
        Ok(provider)
    }

    #[cfg(test)]
    pub fn cached_count(&self) -> usize {
        self.clients.read().expect("client cache lock poisoned").len()
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_chain_is_error() {
        let registry = ChainRegistry::new();
        match registry.get_client(424242) {
            Err(EngineError::UnsupportedChain(424242)) => {}
            other => panic!("expected UnsupportedChain, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_repeated_calls_hit_cache() {
        let registry = ChainRegistry::new();
        registry.get_client(1).unwrap();
        registry.get_client(1).unwrap();
        registry.get_client(1).unwrap();
        assert_eq!(registry.cached_count(), 1);

        registry.get_client(8453).unwrap();
        assert_eq!(registry.cached_count(), 2);
    }
}
