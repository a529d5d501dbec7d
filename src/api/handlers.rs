use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use alloy::primitives::Address;

use super::types::*;
use super::AppState;
use crate::abi::discovery::discover_functions;
use crate::calls;
use crate::chain::chains::{LogStrategy, SUPPORTED_CHAINS};
use crate::chain::reader::RpcReader;
use crate::error::EngineError;
use crate::explorer::ExplorerLogSource;
use crate::logs::fetcher::{FilterScanner, PagedScanner};
use crate::logs::TopicScanner;
use crate::stats::{ClaimEngine, ClaimStats};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn api_error(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse { error: msg.into() }),
    )
}

fn error_status(e: &EngineError) -> StatusCode {
    match e {
        EngineError::UnsupportedChain(_)
        | EngineError::InvalidAddress(_)
        | EngineError::Revert(_)
        | EngineError::InvalidArguments(_) => StatusCode::BAD_REQUEST,
        EngineError::NoContractAtAddress { .. }
        | EngineError::AbiNotFound(_)
        | EngineError::NoClaimEventsFound => StatusCode::NOT_FOUND,
        EngineError::Rpc(_) | EngineError::Explorer(_) => StatusCode::BAD_GATEWAY,
    }
}

fn engine_error(e: EngineError) -> (StatusCode, Json<ErrorResponse>) {
    api_error(error_status(&e), e.to_string())
}

fn parse_address(raw: &str) -> Result<Address, (StatusCode, Json<ErrorResponse>)> {
    raw.parse()
        .map_err(|_| engine_error(EngineError::InvalidAddress(raw.to_string())))
}

// ============================================================
// Health & Chains
// ============================================================

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn list_chains() -> Json<ChainsResponse> {
    Json(ChainsResponse {
        chains: SUPPORTED_CHAINS
            .iter()
            .map(|c| ChainInfo {
                chain_id: c.chain_id,
                name: c.name,
            })
            .collect(),
    })
}

// ============================================================
// ABI discovery
// ============================================================

pub async fn contract_abi(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContractQuery>,
) -> ApiResult<AbiResponse> {
    let address = parse_address(&params.address)?;
    let chain = state.registry.spec(params.chain).map_err(engine_error)?;
    let provider = state
        .registry
        .get_client(params.chain)
        .map_err(engine_error)?;
    let reader = RpcReader::new(provider);

    discover_functions(chain, &reader, &state.explorer, address)
        .await
        .map(|functions| Json(AbiResponse { functions }))
        .map_err(engine_error)
}

// ============================================================
// Claim statistics
// ============================================================

pub async fn claim_stats(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClaimStatsRequest>,
) -> ApiResult<ClaimStats> {
    let address = parse_address(&req.address)?;
    let chain = state.registry.spec(req.chain).map_err(engine_error)?;
    let provider = state.registry.get_client(req.chain).map_err(engine_error)?;
    let reader = RpcReader::new(provider.clone());

    // Paged explorer search needs a key; everything else falls back to a
    // full-history RPC filter.
    let scanner: Box<dyn TopicScanner> = match chain.log_strategy {
        LogStrategy::ExplorerPaged if state.explorer.has_api_key() => Box::new(
            PagedScanner::new(ExplorerLogSource::new(state.explorer.clone(), chain.chain_id)),
        ),
        _ => Box::new(FilterScanner::new(RpcReader::new(provider))),
    };

    let engine = ClaimEngine::new(chain, &reader, &state.explorer, scanner.as_ref());
    engine.compute(address).await.map(Json).map_err(engine_error)
}

// ============================================================
// Generic contract reads
// ============================================================

pub async fn read_contract(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReadRequest>,
) -> ApiResult<ReadResponse> {
    let address = parse_address(&req.address)?;
    state.registry.spec(req.chain).map_err(engine_error)?;
    let provider = state.registry.get_client(req.chain).map_err(engine_error)?;
    let reader = RpcReader::new(provider);

    calls::read_function(&reader, address, &req.function, &req.args)
        .await
        .map(|result| Json(ReadResponse { result }))
        .map_err(engine_error)
}
