use serde::{Deserialize, Serialize};

use crate::abi::types::AbiFunction;

// ============================================================
// Request types
// ============================================================

#[derive(Debug, Deserialize)]
pub struct ContractQuery {
    pub address: String,
    pub chain: u64,
}

#[derive(Debug, Deserialize)]
pub struct ClaimStatsRequest {
    pub address: String,
    pub chain: u64,
}

#[derive(Debug, Deserialize)]
pub struct ReadRequest {
    pub address: String,
    pub chain: u64,
    /// Full function descriptor as returned by the ABI endpoint.
    pub function: AbiFunction,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

// ============================================================
// Response types
// ============================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain_id: u64,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ChainsResponse {
    pub chains: Vec<ChainInfo>,
}

#[derive(Debug, Serialize)]
pub struct AbiResponse {
    pub functions: Vec<AbiFunction>,
}

#[derive(Debug, Serialize)]
pub struct ReadResponse {
    pub result: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
