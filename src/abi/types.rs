use alloy::json_abi::{JsonAbi, StateMutability};
use serde::{Deserialize, Serialize};

/// A single named parameter of a contract function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutability {
    View,
    Pure,
}

/// A callable read-only function surfaced by ABI discovery.
///
/// Equality and dedup are by `name` only; overloads with different
/// argument lists collapse to whichever was seen first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiFunction {
    pub name: String,
    pub inputs: Vec<AbiParam>,
    pub outputs: Vec<AbiParam>,
    pub state_mutability: Mutability,
}

impl AbiFunction {
    /// Canonical signature string, e.g. `balanceOf(address)`.
    pub fn signature(&self) -> String {
        let types: Vec<&str> = self.inputs.iter().map(|p| p.ty.as_str()).collect();
        format!("{}({})", self.name, types.join(","))
    }

    /// True when the function takes no arguments and returns a single address.
    pub fn is_address_getter(&self) -> bool {
        self.inputs.is_empty() && self.outputs.len() == 1 && self.outputs[0].ty == "address"
    }
}

/// Filter a full verified ABI down to its view/pure functions.
pub fn view_functions(abi: &JsonAbi) -> Vec<AbiFunction> {
    abi.functions()
        .filter_map(|f| {
            let mutability = match f.state_mutability {
                StateMutability::View => Mutability::View,
                StateMutability::Pure => Mutability::Pure,
                _ => return None,
            };
            Some(AbiFunction {
                name: f.name.clone(),
                inputs: f
                    .inputs
                    .iter()
                    .map(|p| AbiParam {
                        name: p.name.clone(),
                        ty: p.ty.clone(),
                    })
                    .collect(),
                outputs: f
                    .outputs
                    .iter()
                    .map(|p| AbiParam {
                        name: p.name.clone(),
                        ty: p.ty.clone(),
                    })
                    .collect(),
                state_mutability: mutability,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ABI: &str = r#"[
        {"type":"function","name":"claim","stateMutability":"nonpayable","inputs":[],"outputs":[]},
        {"type":"function","name":"merkleRoot","stateMutability":"view","inputs":[],"outputs":[{"name":"","type":"bytes32"}]},
        {"type":"function","name":"isClaimed","stateMutability":"view","inputs":[{"name":"index","type":"uint256"}],"outputs":[{"name":"","type":"bool"}]},
        {"type":"function","name":"hash","stateMutability":"pure","inputs":[{"name":"data","type":"bytes"}],"outputs":[{"name":"","type":"bytes32"}]}
    ]"#;

    #[test]
    fn test_view_functions_filters_mutability() {
        let abi: JsonAbi = serde_json::from_str(SAMPLE_ABI).unwrap();
        let fns = view_functions(&abi);
        let names: Vec<&str> = fns.iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&"merkleRoot"));
        assert!(names.contains(&"isClaimed"));
        assert!(names.contains(&"hash"));
        assert!(!names.contains(&"claim"));
    }

    #[test]
    fn test_signature() {
        let abi: JsonAbi = serde_json::from_str(SAMPLE_ABI).unwrap();
        let fns = view_functions(&abi);
        let is_claimed = fns.iter().find(|f| f.name == "isClaimed").unwrap();
        assert_eq!(is_claimed.signature(), "isClaimed(uint256)");
        let root = fns.iter().find(|f| f.name == "merkleRoot").unwrap();
        assert_eq!(root.signature(), "merkleRoot()");
    }

    #[test]
    fn test_serialized_shape_matches_explorer_json() {
        let f = AbiFunction {
            name: "balanceOf".into(),
            inputs: vec![AbiParam {
                name: "account".into(),
                ty: "address".into(),
            }],
            outputs: vec![AbiParam {
                name: "".into(),
                ty: "uint256".into(),
            }],
            state_mutability: Mutability::View,
        };
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["stateMutability"], "view");
        assert_eq!(json["inputs"][0]["type"], "address");
    }
}
