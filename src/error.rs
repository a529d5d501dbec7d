use thiserror::Error;

/// Error taxonomy for the discovery and claim-accounting engines.
///
/// Speculative calls (archetype probes, per-shape log scans, metadata reads)
/// recover locally and never surface these; only the terminal condition of
/// each stage does.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(u64),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("No contract found at this address on {chain}. Make sure you selected the correct chain.")]
    NoContractAtAddress { chain: &'static str },

    #[error("ABI not found: {0}")]
    AbiNotFound(String),

    #[error("No Claimed events found on this contract")]
    NoClaimEventsFound,

    #[error("Contract call reverted: {0}")]
    Revert(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Explorer request failed: {0}")]
    Explorer(String),

    #[error("Invalid call arguments: {0}")]
    InvalidArguments(String),
}

/// Normalize an upstream error message to a short single line.
/// Provider errors can be multi-line and verbose; the UI gets the gist only.
pub fn short_message(msg: impl ToString) -> String {
    let msg = msg.to_string();
    let first_line = msg.lines().next().unwrap_or("");
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(200).collect()
}
