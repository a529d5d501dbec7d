/// Static table of supported chains.
///
/// The set is closed at compile time: an unknown chain id is always an
/// error, never a default. Each entry carries the RPC endpoint plus the
/// strategy variants that tell the engines how to reach logs and ABIs
/// on that chain.

/// How event logs are retrieved for a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStrategy {
    /// Paginated explorer HTTP log search (Etherscan V2 unified API).
    ExplorerPaged,
    /// Address-scoped full-history RPC filter, topic-matched client side.
    RpcFilter,
}

/// Which explorer serves verified ABIs for a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiProvider {
    /// Keyless V1-style endpoint (SeiTrace).
    Keyless { base_url: &'static str },
    /// Etherscan V2 unified endpoint; requires an API key.
    EtherscanV2,
}

#[derive(Debug, Clone, Copy)]
pub struct ChainSpec {
    pub chain_id: u64,
    pub name: &'static str,
    pub rpc_http: &'static str,
    pub log_strategy: LogStrategy,
    pub abi_provider: AbiProvider,
}

pub const ETHERSCAN_V2_URL: &str = "https://api.etherscan.io/v2/api";

pub const SUPPORTED_CHAINS: &[ChainSpec] = &[
    ChainSpec {
        chain_id: 1,
        name: "Ethereum",
        rpc_http: "https://eth.llamarpc.com",
        log_strategy: LogStrategy::ExplorerPaged,
        abi_provider: AbiProvider::EtherscanV2,
    },
    ChainSpec {
        chain_id: 10,
        name: "Optimism",
        rpc_http: "https://mainnet.optimism.io",
        log_strategy: LogStrategy::ExplorerPaged,
        abi_provider: AbiProvider::EtherscanV2,
    },
    ChainSpec {
        chain_id: 56,
        name: "BSC",
        rpc_http: "https://bsc-dataseed.binance.org",
        log_strategy: LogStrategy::ExplorerPaged,
        abi_provider: AbiProvider::EtherscanV2,
    },
    ChainSpec {
        chain_id: 137,
        name: "Polygon",
        rpc_http: "https://polygon-rpc.com",
        log_strategy: LogStrategy::ExplorerPaged,
        abi_provider: AbiProvider::EtherscanV2,
    },
    ChainSpec {
        chain_id: 1329,
        name: "Sei",
        rpc_http: "https://evm-rpc.sei-apis.com",
        log_strategy: LogStrategy::RpcFilter,
        abi_provider: AbiProvider::Keyless {
            base_url: "https://seitrace.com/pacific-1/api",
        },
    },
    ChainSpec {
        chain_id: 8453,
        name: "Base",
        rpc_http: "https://mainnet.base.org",
        log_strategy: LogStrategy::ExplorerPaged,
        abi_provider: AbiProvider::EtherscanV2,
    },
    ChainSpec {
        chain_id: 42161,
        name: "Arbitrum",
        rpc_http: "https://arb1.arbitrum.io/rpc",
        log_strategy: LogStrategy::ExplorerPaged,
        abi_provider: AbiProvider::EtherscanV2,
    },
    ChainSpec {
        chain_id: 43114,
        name: "Avalanche",
        rpc_http: "https://api.avax.network/ext/bc/C/rpc",
        log_strategy: LogStrategy::ExplorerPaged,
        abi_provider: AbiProvider::EtherscanV2,
    },
];

pub fn chain_spec(chain_id: u64) -> Option<&'static ChainSpec> {
    SUPPORTED_CHAINS.iter().find(|c| c.chain_id == chain_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_supported() {
        let spec = chain_spec(1329).unwrap();
        assert_eq!(spec.name, "Sei");
        assert_eq!(spec.log_strategy, LogStrategy::RpcFilter);
        assert!(matches!(spec.abi_provider, AbiProvider::Keyless { .. }));
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        assert!(chain_spec(999_999).is_none());
    }

    #[test]
    fn test_chain_ids_are_unique() {
        for (i, a) in SUPPORTED_CHAINS.iter().enumerate() {
            for b in &SUPPORTED_CHAINS[i + 1..] {
                assert_ne!(a.chain_id, b.chain_id);
            }
        }
    }
}
