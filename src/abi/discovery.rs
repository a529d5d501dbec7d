//! Best-effort ABI discovery for addresses of unknown verification status.
//!
//! Ordered fallback stages, each tried only when the prior yielded nothing
//! usable:
//!
//! 1. existence check — no deployed code fails fast, nothing to probe
//! 2. verified-source lookup via the chain's explorer
//! 3. EIP-1967 implementation-slot resolution, then verified lookup
//!    against the implementation
//! 4. probing fixed archetype templates against the live contract
//!
//! Only stage 1 is fatal; stages 2–4 degrade and fall through.

use std::collections::HashSet;

use alloy::primitives::{b256, Address, Bytes, B256};
use async_trait::async_trait;

use crate::abi::templates::{unique_template_functions, FALLBACK_TEMPLATES};
use crate::abi::types::AbiFunction;
use crate::calls;
use crate::chain::chains::ChainSpec;
use crate::chain::reader::ChainReader;
use crate::error::EngineError;

/// EIP-1967 implementation storage slot:
/// `keccak256("eip1967.proxy.implementation") - 1`.
pub const EIP1967_IMPL_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// Verified-ABI lookup capability, implemented by the explorer client.
#[async_trait]
pub trait AbiSource: Send + Sync {
    /// Whether a lookup on this chain can actually be attempted.
    fn has_credentials(&self, chain: &ChainSpec) -> bool;

    /// View/pure functions from a verified ABI, trying every provider URL
    /// available for the chain. `Some(empty)` means a verified ABI was
    /// found but exposed no view functions (minimal proxy stub); `None`
    /// means no verified ABI was obtainable at all.
    async fn verified_functions(
        &self,
        chain: &ChainSpec,
        address: Address,
    ) -> Option<Vec<AbiFunction>>;
}

/// Produce a best-effort list of callable read-only functions.
pub async fn discover_functions<R: ChainReader, A: AbiSource>(
    chain: &'static ChainSpec,
    reader: &R,
    source: &A,
    address: Address,
) -> Result<Vec<AbiFunction>, EngineError> {
    let code = reader.get_code(address).await?;
    if code.is_empty() {
        return Err(EngineError::NoContractAtAddress { chain: chain.name });
    }

    if let Some(fns) = source.verified_functions(chain, address).await {
        // Zero view/pure functions is the proxy-stub signal: the explicit
        // non-empty check is what gates this early return.
        if !fns.is_empty() {
            tracing::debug!(chain = chain.name, %address, count = fns.len(), "Verified ABI found");
            return Ok(fns);
        }
    }

    if let Some(fns) = resolve_proxy_implementation(chain, reader, source, address).await {
        if !fns.is_empty() {
            tracing::debug!(chain = chain.name, %address, count = fns.len(), "Proxy implementation ABI found");
            return Ok(fns);
        }
    }

    let probed = probe_with_templates(reader, address).await;
    if !probed.is_empty() {
        tracing::debug!(chain = chain.name, %address, count = probed.len(), "Archetype probing matched");
        return Ok(probed);
    }

    Err(EngineError::AbiNotFound(abi_not_found_hint(chain, source)))
}

/// Stage 3: read the EIP-1967 slot and retry the verified lookup against
/// the implementation address. Any failure falls through to probing.
async fn resolve_proxy_implementation<R: ChainReader, A: AbiSource>(
    chain: &'static ChainSpec,
    reader: &R,
    source: &A,
    address: Address,
) -> Option<Vec<AbiFunction>> {
    let slot = match reader.get_storage_at(address, EIP1967_IMPL_SLOT).await {
        Ok(slot) => slot,
        Err(e) => {
            tracing::debug!(%address, error = %e, "EIP-1967 slot read failed");
            return None;
        }
    };

    let implementation = Address::from_word(slot);
    if implementation.is_zero() {
        return None;
    }

    match reader.get_code(implementation).await {
        Ok(code) if !code.is_empty() => {}
        _ => return None,
    }

    tracing::debug!(%address, %implementation, "EIP-1967 proxy detected");
    source.verified_functions(chain, implementation).await
}

/// Stage 4: probe every unique zero-input template function in parallel;
/// a template with at least one answering getter also lends its
/// input-taking functions to the working set.
async fn probe_with_templates<R: ChainReader>(reader: &R, address: Address) -> Vec<AbiFunction> {
    let no_input: Vec<&AbiFunction> = unique_template_functions()
        .into_iter()
        .filter(|f| f.inputs.is_empty())
        .collect();

    let probes = no_input.iter().map(|f| {
        let calldata: Bytes = calls::selector(f).to_vec().into();
        async move { reader.call(address, calldata).await.is_ok() }
    });
    let results = futures::future::join_all(probes).await;

    let mut working: Vec<AbiFunction> = no_input
        .iter()
        .zip(&results)
        .filter(|(_, ok)| **ok)
        .map(|(f, _)| (*f).clone())
        .collect();

    let matched: HashSet<&str> = FALLBACK_TEMPLATES
        .iter()
        .filter(|t| {
            t.functions
                .iter()
                .any(|tf| working.iter().any(|w| w.name == tf.name))
        })
        .map(|t| t.name)
        .collect();

    for template in FALLBACK_TEMPLATES.iter() {
        if !matched.contains(template.name) {
            continue;
        }
        // Input-taking functions are assumed callable once the template is
        // confirmed; they are not individually probed.
        for f in &template.functions {
            if !f.inputs.is_empty() && !working.iter().any(|w| w.name == f.name) {
                working.push(f.clone());
            }
        }
    }

    working
}

fn abi_not_found_hint<A: AbiSource>(chain: &ChainSpec, source: &A) -> String {
    if !source.has_credentials(chain) {
        "ETHERSCAN_API_KEY is not set. Get a free key at etherscan.io/apis and set explorer.etherscan_api_key".to_string()
    } else {
        format!(
            "the contract exists on {} but is not verified, and fallback probing found no known functions",
            chain.name
        )
    }
}
