//! HTTP client for explorer APIs (SeiTrace V1-style and the Etherscan V2
//! unified endpoint). Both speak the same `{status, message, result}` JSON
//! envelope; it is decoded once here into a tagged outcome and never
//! re-interpreted at call sites.

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::abi::discovery::AbiSource;
use crate::abi::types::{view_functions, AbiFunction};
use crate::chain::chains::{AbiProvider, ChainSpec, ETHERSCAN_V2_URL};
use crate::error::{short_message, EngineError};
use crate::logs::fetcher::{LogPageSource, PageOutcome};
use crate::logs::LogRecord;

/// Raw response envelope shared by the supported explorer APIs.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: serde_json::Value,
}

/// Envelope decoded into what the caller actually needs to branch on.
#[derive(Debug)]
pub enum ExplorerOutcome<T> {
    Success(T),
    Empty,
    RateLimited,
    Failed(String),
}

fn classify<T: DeserializeOwned>(envelope: Envelope) -> ExplorerOutcome<T> {
    if envelope.status == "1" {
        if envelope.result.as_array().is_some_and(|a| a.is_empty()) {
            return ExplorerOutcome::Empty;
        }
        return match serde_json::from_value(envelope.result) {
            Ok(v) => ExplorerOutcome::Success(v),
            Err(e) => ExplorerOutcome::Failed(format!("Malformed explorer result: {}", e)),
        };
    }

    let result_text = envelope.result.as_str().unwrap_or("");
    let lowered = format!("{} {}", envelope.message, result_text).to_ascii_lowercase();
    if lowered.contains("rate limit") {
        return ExplorerOutcome::RateLimited;
    }
    if envelope.message.starts_with("No records found")
        || envelope.message.starts_with("No logs found")
        || envelope.result.as_array().is_some_and(|a| a.is_empty())
    {
        return ExplorerOutcome::Empty;
    }

    let detail = if result_text.is_empty() {
        &envelope.message
    } else {
        result_text
    };
    ExplorerOutcome::Failed(short_message(detail))
}

/// One log record as the explorer log-search API returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExplorerLog {
    data: String,
    topics: Vec<String>,
    block_number: String,
}

fn parse_block_number(raw: &str) -> u64 {
    if let Some(hex) = raw.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).unwrap_or(0)
    } else {
        raw.parse().unwrap_or(0)
    }
}

fn parse_topic(raw: &str) -> Option<B256> {
    let bytes = hex::decode(raw.strip_prefix("0x").unwrap_or(raw)).ok()?;
    if bytes.len() != 32 {
        return None;
    }
    Some(B256::from_slice(&bytes))
}

impl ExplorerLog {
    fn into_record(self) -> LogRecord {
        let data = hex::decode(self.data.strip_prefix("0x").unwrap_or(&self.data))
            .unwrap_or_default();
        LogRecord {
            data: data.into(),
            topics: self.topics.iter().filter_map(|t| parse_topic(t)).collect(),
            block_number: parse_block_number(&self.block_number),
        }
    }
}

#[derive(Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl ExplorerClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Provider URLs to try for a verified-ABI lookup, in order.
    /// Empty when the chain needs a credential we do not have.
    fn abi_urls(&self, chain: &ChainSpec, address: Address) -> Vec<String> {
        match chain.abi_provider {
            AbiProvider::Keyless { base_url } => {
                let mut urls = vec![format!(
                    "{}?module=contract&action=getabi&address={}",
                    base_url, address
                )];
                // The keyless explorer may lag; Etherscan V2 sometimes has
                // the contract even for these chains.
                if let Some(key) = &self.api_key {
                    urls.push(format!(
                        "{}?chainid={}&module=contract&action=getabi&address={}&apikey={}",
                        ETHERSCAN_V2_URL, chain.chain_id, address, key
                    ));
                }
                urls
            }
            AbiProvider::EtherscanV2 => match &self.api_key {
                Some(key) => vec![format!(
                    "{}?chainid={}&module=contract&action=getabi&address={}&apikey={}",
                    ETHERSCAN_V2_URL, chain.chain_id, address, key
                )],
                None => Vec::new(),
            },
        }
    }

    async fn get_envelope(&self, url: &str) -> Result<Envelope, EngineError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| EngineError::Explorer(short_message(e)))?;
        response
            .json::<Envelope>()
            .await
            .map_err(|e| EngineError::Explorer(short_message(e)))
    }

    /// Fetch one page of topic-filtered logs via the Etherscan V2 log search.
    pub async fn fetch_log_page(
        &self,
        chain_id: u64,
        address: Address,
        topic: B256,
        from_block: u64,
    ) -> PageOutcome {
        let api_key = self.api_key.as_deref().unwrap_or("");
        let url = format!(
            "{}?chainid={}&module=logs&action=getLogs&address={}&fromBlock={}&toBlock=latest&topic0={}&apikey={}",
            ETHERSCAN_V2_URL, chain_id, address, from_block, topic, api_key
        );

        let envelope = match self.get_envelope(&url).await {
            Ok(env) => env,
            Err(e) => return PageOutcome::Failed(e.to_string()),
        };

        match classify::<Vec<ExplorerLog>>(envelope) {
            ExplorerOutcome::Success(logs) => {
                PageOutcome::Logs(logs.into_iter().map(|l| l.into_record()).collect())
            }
            ExplorerOutcome::Empty => PageOutcome::Logs(Vec::new()),
            ExplorerOutcome::RateLimited => PageOutcome::RateLimited,
            ExplorerOutcome::Failed(msg) => PageOutcome::Failed(msg),
        }
    }
}

#[async_trait]
impl AbiSource for ExplorerClient {
    fn has_credentials(&self, chain: &ChainSpec) -> bool {
        matches!(chain.abi_provider, AbiProvider::Keyless { .. }) || self.api_key.is_some()
    }

    async fn verified_functions(
        &self,
        chain: &ChainSpec,
        address: Address,
    ) -> Option<Vec<AbiFunction>> {
        let mut saw_verified_abi = false;

        for url in self.abi_urls(chain, address) {
            let envelope = match self.get_envelope(&url).await {
                Ok(env) => env,
                Err(e) => {
                    tracing::debug!(chain = chain.name, %address, error = %e, "ABI lookup failed, trying next provider");
                    continue;
                }
            };

            // The ABI arrives as a JSON string inside the envelope.
            let raw_abi = match classify::<String>(envelope) {
                ExplorerOutcome::Success(s) => s,
                other => {
                    let outcome = match &other {
                        ExplorerOutcome::Empty => "empty",
                        ExplorerOutcome::RateLimited => "rate-limited",
                        ExplorerOutcome::Failed(_) => "failed",
                        ExplorerOutcome::Success(_) => "success",
                    };
                    tracing::debug!(chain = chain.name, %address, outcome, "No verified ABI from provider");
                    continue;
                }
            };

            let abi: JsonAbi = match serde_json::from_str(&raw_abi) {
                Ok(abi) => abi,
                Err(e) => {
                    tracing::debug!(chain = chain.name, %address, error = %e, "Unparseable verified ABI");
                    continue;
                }
            };

            saw_verified_abi = true;
            let fns = view_functions(&abi);
            if !fns.is_empty() {
                return Some(fns);
            }
            // Zero view/pure functions: likely a minimal proxy stub ABI.
            // Keep trying other providers; the caller falls through to
            // proxy resolution if nothing richer turns up.
        }

        if saw_verified_abi {
            Some(Vec::new())
        } else {
            None
        }
    }
}

/// Adapter binding an [`ExplorerClient`] to one chain for paged log scans.
pub struct ExplorerLogSource {
    client: ExplorerClient,
    chain_id: u64,
}

impl ExplorerLogSource {
    pub fn new(client: ExplorerClient, chain_id: u64) -> Self {
        Self { client, chain_id }
    }
}

#[async_trait]
impl LogPageSource for ExplorerLogSource {
    async fn fetch_page(&self, address: Address, topic: B256, from_block: u64) -> PageOutcome {
        self.client
            .fetch_log_page(self.chain_id, address, topic, from_block)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> Envelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_classify_success_payload() {
        let env = envelope(r#"{"status":"1","message":"OK","result":"[]"}"#);
        match classify::<String>(env) {
            ExplorerOutcome::Success(s) => assert_eq!(s, "[]"),
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_rate_limited() {
        let env = envelope(
            r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached, please use API Key"}"#,
        );
        assert!(matches!(
            classify::<String>(env),
            ExplorerOutcome::RateLimited
        ));
    }

    #[test]
    fn test_classify_no_records() {
        let env = envelope(r#"{"status":"0","message":"No records found","result":[]}"#);
        assert!(matches!(
            classify::<Vec<ExplorerLog>>(env),
            ExplorerOutcome::Empty
        ));
    }

    #[test]
    fn test_classify_error_is_single_line() {
        let env = envelope(
            r#"{"status":"0","message":"NOTOK","result":"Invalid API Key\nsee docs for details"}"#,
        );
        match classify::<String>(env) {
            ExplorerOutcome::Failed(msg) => assert_eq!(msg, "Invalid API Key"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_explorer_log_conversion() {
        let log = ExplorerLog {
            data: "0x0000000000000000000000000000000000000000000000000000000000000064"
                .to_string(),
            topics: vec![
                "0x4ec90e965519d92681267467f775ada5bd214aa92c0dc93d90a5e880ce9ed026".to_string(),
            ],
            block_number: "0x10".to_string(),
        };
        let record = log.into_record();
        assert_eq!(record.block_number, 16);
        assert_eq!(record.data.len(), 32);
        assert_eq!(record.topics.len(), 1);
    }

    #[test]
    fn test_block_number_decimal_or_hex() {
        assert_eq!(parse_block_number("0x10d4f"), 68943);
        assert_eq!(parse_block_number("68943"), 68943);
        assert_eq!(parse_block_number("junk"), 0);
    }

    #[test]
    fn test_abi_urls_require_key_for_etherscan_chains() {
        let keyless = ExplorerClient::new(None);
        let chain = crate::chain::chains::chain_spec(1).unwrap();
        assert!(keyless.abi_urls(chain, Address::ZERO).is_empty());

        let keyed = ExplorerClient::new(Some("KEY".into()));
        assert_eq!(keyed.abi_urls(chain, Address::ZERO).len(), 1);
    }

    #[test]
    fn test_abi_urls_keyless_chain_tries_both_with_key() {
        let sei = crate::chain::chains::chain_spec(1329).unwrap();
        let keyless = ExplorerClient::new(None);
        assert_eq!(keyless.abi_urls(sei, Address::ZERO).len(), 1);

        let keyed = ExplorerClient::new(Some("KEY".into()));
        assert_eq!(keyed.abi_urls(sei, Address::ZERO).len(), 2);
    }
}
