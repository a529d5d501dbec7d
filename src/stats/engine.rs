//! Claim accounting over a distributor contract's event history.
//!
//! The engine scans known claim-event shapes in priority order, sums the
//! decoded amounts with arbitrary precision, resolves the distributed token,
//! and derives the remaining/allocation/percent figures from the token's
//! live balance. Token metadata lookups degrade independently: a distributor
//! whose token cannot be identified still gets an accurate claimed total.

use std::str::FromStr;

use alloy::primitives::Address;
use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive, Zero};
use serde::Serialize;

use crate::abi::discovery::{discover_functions, AbiSource};
use crate::abi::types::{AbiFunction, AbiParam, Mutability};
use crate::calls;
use crate::chain::chains::ChainSpec;
use crate::chain::reader::ChainReader;
use crate::error::EngineError;
use crate::logs::schema::{decode_amount, EventTopicSchema, CLAIM_EVENT_SCHEMAS};
use crate::logs::{LogRecord, TopicScanner};

/// Getter names that conventionally point at the distributed token.
const TOKEN_GETTER_NAMES: [&str; 4] = ["token", "rewardToken", "claimToken", "distributionToken"];

/// Address getters that never point at a token, excluded from the
/// verified-ABI fallback sweep.
const NON_TOKEN_GETTER_NAMES: [&str; 5] =
    ["owner", "pendingOwner", "implementation", "admin", "beacon"];

/// Aggregate claim figures for one distributor contract.
///
/// Amounts are raw token units (not decimals-adjusted) and serialize as
/// decimal strings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStats {
    pub total_claimed: BigDecimal,
    pub remaining: BigDecimal,
    pub total_allocation: BigDecimal,
    /// Two-decimal percentage of the allocation already claimed.
    /// `None` when the allocation is zero and the ratio is undefined.
    pub claimed_percent: Option<f64>,
    pub claim_count: usize,
    pub decimals: u8,
    pub token_address: Option<Address>,
    pub token_symbol: Option<String>,
    pub token_name: Option<String>,
}

fn view_getter(name: &str, output_ty: &str) -> AbiFunction {
    AbiFunction {
        name: name.to_string(),
        inputs: vec![],
        outputs: vec![AbiParam {
            name: String::new(),
            ty: output_ty.to_string(),
        }],
        state_mutability: Mutability::View,
    }
}

fn balance_of_fn() -> AbiFunction {
    AbiFunction {
        name: "balanceOf".to_string(),
        inputs: vec![AbiParam {
            name: "account".to_string(),
            ty: "address".to_string(),
        }],
        outputs: vec![AbiParam {
            name: String::new(),
            ty: "uint256".to_string(),
        }],
        state_mutability: Mutability::View,
    }
}

fn big(value: alloy::primitives::U256) -> BigDecimal {
    BigDecimal::from_str(&value.to_string()).unwrap_or_default()
}

fn claimed_percent(claimed: &BigDecimal, allocation: &BigDecimal) -> Option<f64> {
    if allocation.is_zero() {
        return None;
    }
    // Basis points first, then floor, so 99.999% never rounds up to 100%.
    let basis_points = (claimed * BigDecimal::from(10_000u32) / allocation)
        .with_scale_round(0, RoundingMode::Down);
    basis_points.to_f64().map(|bp| bp / 100.0)
}

pub struct ClaimEngine<'a, R: ChainReader, A: AbiSource> {
    chain: &'static ChainSpec,
    reader: &'a R,
    abi_source: &'a A,
    scanner: &'a dyn TopicScanner,
}

impl<'a, R: ChainReader, A: AbiSource> ClaimEngine<'a, R, A> {
    pub fn new(
        chain: &'static ChainSpec,
        reader: &'a R,
        abi_source: &'a A,
        scanner: &'a dyn TopicScanner,
    ) -> Self {
        Self {
            chain,
            reader,
            abi_source,
            scanner,
        }
    }

    /// Compute claim statistics for a distributor contract.
    pub async fn compute(&self, distributor: Address) -> Result<ClaimStats, EngineError> {
        let (schema, logs) = self.scan_claim_events(distributor).await?;

        let claim_count = logs.len();
        let mut total_claimed = BigDecimal::zero();
        let mut skipped = 0usize;
        for log in &logs {
            match decode_amount(schema, &log.data) {
                Some(amount) => total_claimed += big(amount),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::warn!(
                %distributor,
                skipped,
                signature = schema.signature,
                "Skipped logs with undecodable payloads"
            );
        }

        let token = self.resolve_token(distributor).await;

        let (remaining, decimals, token_symbol, token_name) = match token {
            Some(token) => {
                tokio::join!(
                    self.token_balance(token, distributor),
                    self.token_decimals(token),
                    self.token_string(token, "symbol"),
                    self.token_string(token, "name"),
                )
            }
            None => (BigDecimal::zero(), 18, None, None),
        };

        let total_allocation = &total_claimed + &remaining;
        let percent = claimed_percent(&total_claimed, &total_allocation);

        Ok(ClaimStats {
            total_claimed,
            remaining,
            total_allocation,
            claimed_percent: percent,
            claim_count,
            decimals,
            token_address: token,
            token_symbol,
            token_name,
        })
    }

    /// Try each known claim-event shape until one yields logs. The first
    /// shape with any matches wins; later shapes are never fetched.
    async fn scan_claim_events(
        &self,
        distributor: Address,
    ) -> Result<(&'static EventTopicSchema, Vec<LogRecord>), EngineError> {
        for schema in CLAIM_EVENT_SCHEMAS.iter() {
            if let Some(logs) = self.scanner.scan(distributor, schema.topic).await {
                tracing::debug!(
                    %distributor,
                    signature = schema.signature,
                    count = logs.len(),
                    "Claim events found"
                );
                return Ok((schema, logs));
            }
        }
        Err(EngineError::NoClaimEventsFound)
    }

    /// Identify the token a distributor pays out.
    ///
    /// Conventional getter names are tried directly first; failing those,
    /// the verified ABI (if discoverable) is swept for any other zero-input
    /// address getter, with each candidate vetted as an actual token.
    async fn resolve_token(&self, distributor: Address) -> Option<Address> {
        for name in TOKEN_GETTER_NAMES {
            let getter = view_getter(name, "address");
            if let Some(candidate) = self.call_address_getter(distributor, &getter).await {
                if self.has_code(candidate).await {
                    tracing::debug!(%distributor, token = %candidate, getter = name, "Token resolved");
                    return Some(candidate);
                }
            }
        }

        let fns = match discover_functions(self.chain, self.reader, self.abi_source, distributor)
            .await
        {
            Ok(fns) => fns,
            Err(e) => {
                tracing::debug!(%distributor, error = %e, "No ABI for token fallback sweep");
                return None;
            }
        };

        for f in fns.iter().filter(|f| f.is_address_getter()) {
            if TOKEN_GETTER_NAMES.contains(&f.name.as_str())
                || NON_TOKEN_GETTER_NAMES.contains(&f.name.as_str())
            {
                continue;
            }
            if let Some(candidate) = self.call_address_getter(distributor, f).await {
                // Unconventional getter names need stronger vetting: the
                // candidate must answer decimals() like a token would.
                if self.has_code(candidate).await
                    && calls::read_function(
                        self.reader,
                        candidate,
                        &view_getter("decimals", "uint8"),
                        &[],
                    )
                    .await
                    .is_ok()
                {
                    tracing::debug!(%distributor, token = %candidate, getter = %f.name, "Token resolved via ABI sweep");
                    return Some(candidate);
                }
            }
        }

        tracing::debug!(%distributor, "Token could not be identified");
        None
    }

    async fn call_address_getter(&self, target: Address, getter: &AbiFunction) -> Option<Address> {
        match calls::read_function(self.reader, target, getter, &[]).await {
            Ok(serde_json::Value::String(s)) => {
                let candidate = s.parse::<Address>().ok()?;
                (!candidate.is_zero()).then_some(candidate)
            }
            _ => None,
        }
    }

    async fn has_code(&self, address: Address) -> bool {
        matches!(self.reader.get_code(address).await, Ok(code) if !code.is_empty())
    }

    async fn token_balance(&self, token: Address, holder: Address) -> BigDecimal {
        let args = vec![serde_json::Value::String(holder.to_string())];
        match calls::read_function(self.reader, token, &balance_of_fn(), &args).await {
            Ok(serde_json::Value::String(s)) => BigDecimal::from_str(&s).unwrap_or_default(),
            _ => BigDecimal::zero(),
        }
    }

    async fn token_decimals(&self, token: Address) -> u8 {
        match calls::read_function(self.reader, token, &view_getter("decimals", "uint8"), &[])
            .await
        {
            Ok(serde_json::Value::String(s)) => s.parse().unwrap_or(18),
            _ => 18,
        }
    }

    async fn token_string(&self, token: Address, getter: &str) -> Option<String> {
        match calls::read_function(self.reader, token, &view_getter(getter, "string"), &[]).await {
            Ok(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Bytes, B256, U256};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn distributor() -> Address {
        Address::repeat_byte(0xd1)
    }

    fn token() -> Address {
        Address::repeat_byte(0x70)
    }

    fn claim_log(schema: &EventTopicSchema, amount: U256) -> LogRecord {
        let mut data = Vec::new();
        for (i, _) in schema.data_params.iter().enumerate() {
            let word = if i == schema.amount_index {
                amount
            } else {
                U256::ZERO
            };
            data.extend_from_slice(&word.to_be_bytes::<32>());
        }
        LogRecord {
            data: data.into(),
            topics: vec![schema.topic],
            block_number: 1,
        }
    }

    fn encode_string(s: &str) -> Vec<u8> {
        let mut out = vec![0u8; 32];
        out[31] = 32;
        let mut len_word = [0u8; 32];
        len_word[31] = s.len() as u8;
        out.extend_from_slice(&len_word);
        let mut padded = s.as_bytes().to_vec();
        padded.resize(s.len().div_ceil(32) * 32, 0);
        out.extend_from_slice(&padded);
        out
    }

    fn word(value: U256) -> Vec<u8> {
        value.to_be_bytes::<32>().to_vec()
    }

    fn address_word(address: Address) -> Vec<u8> {
        word(U256::from_be_slice(address.into_word().as_slice()))
    }

    /// Call responses keyed by (target, selector).
    struct MockReader {
        responses: HashMap<(Address, [u8; 4]), Vec<u8>>,
        code: Vec<Address>,
    }

    impl MockReader {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                code: Vec::new(),
            }
        }

        fn respond(mut self, target: Address, fn_name: &str, output_ty: &str, data: Vec<u8>) -> Self {
            let f = if fn_name == "balanceOf" {
                balance_of_fn()
            } else {
                view_getter(fn_name, output_ty)
            };
            self.responses.insert((target, calls::selector(&f)), data);
            self
        }

        fn with_code(mut self, address: Address) -> Self {
            self.code.push(address);
            self
        }
    }

    #[async_trait]
    impl ChainReader for MockReader {
        async fn get_code(&self, address: Address) -> Result<Bytes, EngineError> {
            if self.code.contains(&address) {
                Ok(vec![0x60].into())
            } else {
                Ok(Bytes::new())
            }
        }

        async fn call(&self, address: Address, calldata: Bytes) -> Result<Bytes, EngineError> {
            let selector: [u8; 4] = calldata[..4].try_into().unwrap();
            self.responses
                .get(&(address, selector))
                .map(|d| Ok(d.clone().into()))
                .unwrap_or_else(|| Err(EngineError::Revert("execution reverted".into())))
        }

        async fn get_storage_at(&self, _address: Address, _slot: B256) -> Result<B256, EngineError> {
            Ok(B256::ZERO)
        }

        async fn fetch_all_logs(&self, _address: Address) -> Result<Vec<LogRecord>, EngineError> {
            Ok(Vec::new())
        }
    }

    struct NullSource;

    #[async_trait]
    impl AbiSource for NullSource {
        fn has_credentials(&self, _chain: &ChainSpec) -> bool {
            true
        }
        async fn verified_functions(
            &self,
            _chain: &ChainSpec,
            _address: Address,
        ) -> Option<Vec<AbiFunction>> {
            None
        }
    }

    /// Returns logs only for one configured topic, recording every scan.
    struct MockScanner {
        topic: B256,
        logs: Vec<LogRecord>,
        scans: Mutex<Vec<B256>>,
    }

    impl MockScanner {
        fn new(topic: B256, logs: Vec<LogRecord>) -> Self {
            Self {
                topic,
                logs,
                scans: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TopicScanner for MockScanner {
        async fn scan(&self, _address: Address, topic: B256) -> Option<Vec<LogRecord>> {
            self.scans.lock().unwrap().push(topic);
            if topic == self.topic && !self.logs.is_empty() {
                Some(self.logs.clone())
            } else {
                None
            }
        }
    }

    fn chain() -> &'static ChainSpec {
        crate::chain::chains::chain_spec(1).unwrap()
    }

    fn token_reader() -> MockReader {
        MockReader::new()
            .with_code(token())
            .respond(distributor(), "token", "address", address_word(token()))
            .respond(token(), "balanceOf", "uint256", word(U256::from(750u64)))
            .respond(token(), "decimals", "uint8", word(U256::from(6u64)))
            .respond(token(), "symbol", "string", encode_string("USDC"))
            .respond(token(), "name", "string", encode_string("USD Coin"))
    }

    #[tokio::test]
    async fn test_compute_full_stats() {
        let schema = &CLAIM_EVENT_SCHEMAS[0];
        let logs = vec![
            claim_log(schema, U256::from(100u64)),
            claim_log(schema, U256::from(150u64)),
        ];
        let scanner = MockScanner::new(schema.topic, logs);
        let reader = token_reader();
        let source = NullSource;

        let engine = ClaimEngine::new(chain(), &reader, &source, &scanner);
        let stats = engine.compute(distributor()).await.unwrap();

        assert_eq!(stats.total_claimed.to_string(), "250");
        assert_eq!(stats.remaining.to_string(), "750");
        assert_eq!(stats.total_allocation.to_string(), "1000");
        assert_eq!(stats.claimed_percent, Some(25.0));
        assert_eq!(stats.claim_count, 2);
        assert_eq!(stats.decimals, 6);
        assert_eq!(stats.token_address, Some(token()));
        assert_eq!(stats.token_symbol.as_deref(), Some("USDC"));
        assert_eq!(stats.token_name.as_deref(), Some("USD Coin"));
    }

    #[tokio::test]
    async fn test_sum_is_exact_beyond_f64_precision() {
        let schema = &CLAIM_EVENT_SCHEMAS[2];
        let logs = vec![claim_log(schema, U256::MAX), claim_log(schema, U256::MAX)];
        let scanner = MockScanner::new(schema.topic, logs);
        // No token getter answers, so remaining stays zero.
        let reader = MockReader::new();
        let source = NullSource;

        let engine = ClaimEngine::new(chain(), &reader, &source, &scanner);
        let stats = engine.compute(distributor()).await.unwrap();

        // 2 * (2^256 - 1), digit-exact
        assert_eq!(
            stats.total_claimed.to_string(),
            "231584178474632390847141970017375815706539969331281128078915168015826259279870"
        );
        assert_eq!(stats.total_allocation, stats.total_claimed);
        assert_eq!(stats.claimed_percent, Some(100.0));
    }

    #[tokio::test]
    async fn test_shape_priority_short_circuits() {
        let first = &CLAIM_EVENT_SCHEMAS[0];
        let scanner = MockScanner::new(first.topic, vec![claim_log(first, U256::from(1u64))]);
        let reader = MockReader::new();
        let source = NullSource;

        let engine = ClaimEngine::new(chain(), &reader, &source, &scanner);
        engine.compute(distributor()).await.unwrap();

        // Only the winning shape was ever scanned
        assert_eq!(scanner.scans.lock().unwrap().as_slice(), &[first.topic]);
    }

    #[tokio::test]
    async fn test_later_shape_used_when_earlier_ones_empty() {
        let third = &CLAIM_EVENT_SCHEMAS[2];
        let scanner = MockScanner::new(third.topic, vec![claim_log(third, U256::from(5u64))]);
        let reader = MockReader::new();
        let source = NullSource;

        let engine = ClaimEngine::new(chain(), &reader, &source, &scanner);
        let stats = engine.compute(distributor()).await.unwrap();

        assert_eq!(stats.total_claimed.to_string(), "5");
        assert_eq!(scanner.scans.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_no_events_is_an_error() {
        let scanner = MockScanner::new(B256::ZERO, vec![]);
        let reader = MockReader::new();
        let source = NullSource;

        let engine = ClaimEngine::new(chain(), &reader, &source, &scanner);
        let err = engine.compute(distributor()).await.unwrap_err();
        assert!(matches!(err, EngineError::NoClaimEventsFound));
    }

    #[tokio::test]
    async fn test_malformed_log_skipped_but_counted() {
        let schema = &CLAIM_EVENT_SCHEMAS[0];
        let mut logs = vec![claim_log(schema, U256::from(40u64))];
        logs.push(LogRecord {
            data: vec![0u8; 16].into(), // too short for the shape
            topics: vec![schema.topic],
            block_number: 2,
        });
        let scanner = MockScanner::new(schema.topic, logs);
        let reader = MockReader::new();
        let source = NullSource;

        let engine = ClaimEngine::new(chain(), &reader, &source, &scanner);
        let stats = engine.compute(distributor()).await.unwrap();

        assert_eq!(stats.total_claimed.to_string(), "40");
        assert_eq!(stats.claim_count, 2);
    }

    #[tokio::test]
    async fn test_zero_allocation_percent_is_null() {
        let schema = &CLAIM_EVENT_SCHEMAS[0];
        let scanner = MockScanner::new(schema.topic, vec![claim_log(schema, U256::ZERO)]);
        let reader = MockReader::new();
        let source = NullSource;

        let engine = ClaimEngine::new(chain(), &reader, &source, &scanner);
        let stats = engine.compute(distributor()).await.unwrap();

        assert!(stats.total_allocation.is_zero());
        assert_eq!(stats.claimed_percent, None);
        assert_eq!(stats.decimals, 18);
        assert!(stats.token_address.is_none());
    }

    #[tokio::test]
    async fn test_percent_floors_at_basis_points() {
        let schema = &CLAIM_EVENT_SCHEMAS[0];
        let scanner = MockScanner::new(schema.topic, vec![claim_log(schema, U256::from(1u64))]);
        let reader = MockReader::new()
            .with_code(token())
            .respond(distributor(), "token", "address", address_word(token()))
            .respond(token(), "balanceOf", "uint256", word(U256::from(2u64)));
        let source = NullSource;

        let engine = ClaimEngine::new(chain(), &reader, &source, &scanner);
        let stats = engine.compute(distributor()).await.unwrap();

        // 1/3 claimed: 3333 basis points floored, never 33.34
        assert_eq!(stats.claimed_percent, Some(33.33));
        // Unanswered metadata degrades to defaults
        assert_eq!(stats.decimals, 18);
        assert!(stats.token_symbol.is_none());
    }

    #[tokio::test]
    async fn test_alternate_token_getter_name() {
        let schema = &CLAIM_EVENT_SCHEMAS[1];
        let scanner = MockScanner::new(schema.topic, vec![claim_log(schema, U256::from(9u64))]);
        let reader = MockReader::new()
            .with_code(token())
            .respond(distributor(), "rewardToken", "address", address_word(token()))
            .respond(token(), "balanceOf", "uint256", word(U256::from(1u64)));
        let source = NullSource;

        let engine = ClaimEngine::new(chain(), &reader, &source, &scanner);
        let stats = engine.compute(distributor()).await.unwrap();
        assert_eq!(stats.token_address, Some(token()));
        assert_eq!(stats.total_allocation.to_string(), "10");
    }

    #[tokio::test]
    async fn test_zero_address_getter_result_rejected() {
        let schema = &CLAIM_EVENT_SCHEMAS[0];
        let scanner = MockScanner::new(schema.topic, vec![claim_log(schema, U256::from(1u64))]);
        // token() getter answers with the zero address; no fallback available
        let reader = MockReader::new().respond(
            distributor(),
            "token",
            "address",
            word(U256::ZERO),
        );
        let source = NullSource;

        let engine = ClaimEngine::new(chain(), &reader, &source, &scanner);
        let stats = engine.compute(distributor()).await.unwrap();
        assert!(stats.token_address.is_none());
    }
}
