//! Generic read-call executor: turns an [`AbiFunction`] descriptor plus
//! JSON arguments into calldata, and decoded return data back into JSON.
//!
//! All integers cross the JSON boundary as decimal strings — token amounts
//! routinely exceed the 53-bit safe range of native JSON numbers.

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{keccak256, Address, Bytes};

use crate::abi::types::AbiFunction;
use crate::chain::reader::ChainReader;
use crate::error::EngineError;

/// 4-byte function selector from the canonical signature.
pub fn selector(function: &AbiFunction) -> [u8; 4] {
    let hash = keccak256(function.signature().as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn parse_type(ty: &str) -> Result<DynSolType, EngineError> {
    ty.parse::<DynSolType>()
        .map_err(|e| EngineError::InvalidArguments(format!("Unsupported type '{}': {}", ty, e)))
}

fn coerce_arg(ty: &DynSolType, arg: &serde_json::Value) -> Result<DynSolValue, EngineError> {
    let text = match arg {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        other => {
            return Err(EngineError::InvalidArguments(format!(
                "Cannot coerce argument {} to {}",
                other, ty
            )))
        }
    };
    ty.coerce_str(&text)
        .map_err(|e| EngineError::InvalidArguments(format!("Bad argument '{}': {}", text, e)))
}

/// Build full calldata (selector + ABI-encoded arguments).
pub fn encode_call(function: &AbiFunction, args: &[serde_json::Value]) -> Result<Bytes, EngineError> {
    if args.len() != function.inputs.len() {
        return Err(EngineError::InvalidArguments(format!(
            "{} expects {} argument(s), got {}",
            function.name,
            function.inputs.len(),
            args.len()
        )));
    }

    let mut calldata = selector(function).to_vec();
    if !function.inputs.is_empty() {
        let mut values = Vec::with_capacity(args.len());
        for (param, arg) in function.inputs.iter().zip(args) {
            let ty = parse_type(&param.ty)?;
            values.push(coerce_arg(&ty, arg)?);
        }
        calldata.extend_from_slice(&DynSolValue::Tuple(values).abi_encode_params());
    }
    Ok(calldata.into())
}

/// Decode return data against the descriptor's output types.
/// A single output is unwrapped; multiple outputs come back as a JSON array.
pub fn decode_output(function: &AbiFunction, data: &[u8]) -> Result<serde_json::Value, EngineError> {
    if function.outputs.is_empty() {
        return Ok(serde_json::Value::Null);
    }

    let types = function
        .outputs
        .iter()
        .map(|p| parse_type(&p.ty))
        .collect::<Result<Vec<_>, _>>()?;

    let decoded = DynSolType::Tuple(types)
        .abi_decode_params(data)
        .map_err(|e| EngineError::Revert(format!("Cannot decode return data: {}", e)))?;

    let mut values = match decoded {
        DynSolValue::Tuple(vals) => vals.into_iter().map(|v| to_json(&v)).collect::<Vec<_>>(),
        other => vec![to_json(&other)],
    };

    if values.len() == 1 {
        Ok(values.remove(0))
    } else {
        Ok(serde_json::Value::Array(values))
    }
}

/// JSON rendering of a decoded value. Integers become decimal strings,
/// byte blobs become 0x-prefixed hex.
pub fn to_json(value: &DynSolValue) -> serde_json::Value {
    use serde_json::Value;
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Int(v, _) => Value::String(v.to_string()),
        DynSolValue::Uint(v, _) => Value::String(v.to_string()),
        DynSolValue::Address(a) => Value::String(a.to_string()),
        DynSolValue::FixedBytes(b, size) => {
            Value::String(format!("0x{}", hex::encode(&b.as_slice()[..*size])))
        }
        DynSolValue::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Function(f) => Value::String(format!("0x{}", hex::encode(f.as_slice()))),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            Value::Array(items.iter().map(to_json).collect())
        }
        DynSolValue::Tuple(items) => Value::Array(items.iter().map(to_json).collect()),
    }
}

/// Execute a read-only function against a live contract.
pub async fn read_function<R: ChainReader>(
    reader: &R,
    address: Address,
    function: &AbiFunction,
    args: &[serde_json::Value],
) -> Result<serde_json::Value, EngineError> {
    let calldata = encode_call(function, args)?;
    let output = reader.call(address, calldata).await?;
    decode_output(function, &output)
}
