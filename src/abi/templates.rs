use std::sync::LazyLock;

use crate::abi::types::{AbiFunction, AbiParam, Mutability};

/// A named ABI template for a common contract archetype.
///
/// Templates back the last discovery stage: their zero-input view functions
/// are probed against the live contract, and a template whose getters answer
/// also lends its input-taking functions to the working set.
pub struct AbiTemplate {
    pub name: &'static str,
    pub functions: Vec<AbiFunction>,
}

fn view_fn(name: &str, inputs: &[(&str, &str)], outputs: &[(&str, &str)]) -> AbiFunction {
    AbiFunction {
        name: name.to_string(),
        inputs: inputs
            .iter()
            .map(|(n, t)| AbiParam {
                name: n.to_string(),
                ty: t.to_string(),
            })
            .collect(),
        outputs: outputs
            .iter()
            .map(|(n, t)| AbiParam {
                name: n.to_string(),
                ty: t.to_string(),
            })
            .collect(),
        state_mutability: Mutability::View,
    }
}

fn getter(name: &str, out_ty: &str) -> AbiFunction {
    view_fn(name, &[], &[("", out_ty)])
}

pub static FALLBACK_TEMPLATES: LazyLock<Vec<AbiTemplate>> = LazyLock::new(|| {
    vec![
        AbiTemplate {
            name: "ERC20",
            functions: vec![
                getter("name", "string"),
                getter("symbol", "string"),
                getter("decimals", "uint8"),
                getter("totalSupply", "uint256"),
                view_fn("balanceOf", &[("account", "address")], &[("", "uint256")]),
                view_fn(
                    "allowance",
                    &[("owner", "address"), ("spender", "address")],
                    &[("", "uint256")],
                ),
            ],
        },
        AbiTemplate {
            name: "Merkle Distributor",
            functions: vec![
                getter("token", "address"),
                getter("rewardToken", "address"),
                getter("claimToken", "address"),
                getter("distributionToken", "address"),
                getter("merkleRoot", "bytes32"),
                view_fn("isClaimed", &[("index", "uint256")], &[("", "bool")]),
            ],
        },
        AbiTemplate {
            name: "Airdrop / Vesting",
            functions: vec![
                getter("totalClaimed", "uint256"),
                getter("totalDistributed", "uint256"),
                getter("totalReleased", "uint256"),
                getter("totalVested", "uint256"),
                view_fn("claimed", &[("account", "address")], &[("", "uint256")]),
                getter("token", "address"),
                getter("rewardToken", "address"),
                getter("claimToken", "address"),
                getter("distributionToken", "address"),
                getter("owner", "address"),
                getter("paused", "bool"),
            ],
        },
        AbiTemplate {
            name: "Ownable / Access",
            functions: vec![
                getter("owner", "address"),
                getter("pendingOwner", "address"),
            ],
        },
    ]
});

/// All template functions, deduplicated by name (first template wins).
pub fn unique_template_functions() -> Vec<&'static AbiFunction> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for template in FALLBACK_TEMPLATES.iter() {
        for f in &template.functions {
            if seen.insert(f.name.as_str()) {
                out.push(f);
            }
        }
    }
    out
}
