//! Static table of known claim-event shapes.
//!
//! Each entry maps a topic hash to the layout of the event's *non-indexed*
//! data payload and the position of the amount field inside it. All known
//! shapes carry only static 32-byte words in their data, so decoding is a
//! word read at a fixed offset.

use std::sync::LazyLock;

use alloy::primitives::{keccak256, B256, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Uint256,
    Address,
}

#[derive(Debug)]
pub struct EventTopicSchema {
    pub signature: &'static str,
    pub topic: B256,
    /// Layout of the data payload (non-indexed params only).
    pub data_params: &'static [DataKind],
    /// Index of the claim amount within `data_params`.
    pub amount_index: usize,
}

/// Known claim-event shapes, in scan priority order.
pub static CLAIM_EVENT_SCHEMAS: LazyLock<Vec<EventTopicSchema>> = LazyLock::new(|| {
    vec![
        // Claimed(uint256 index, address account, uint256 amount)
        EventTopicSchema {
            signature: "Claimed(uint256,address,uint256)",
            topic: keccak256(b"Claimed(uint256,address,uint256)"),
            data_params: &[DataKind::Uint256, DataKind::Address, DataKind::Uint256],
            amount_index: 2,
        },
        // Claimed(address account, uint256 amount)
        EventTopicSchema {
            signature: "Claimed(address,uint256)",
            topic: keccak256(b"Claimed(address,uint256)"),
            data_params: &[DataKind::Address, DataKind::Uint256],
            amount_index: 1,
        },
        // TokensClaimed(address indexed claimant, uint256 amount)
        // claimant lives in topics[1], only the amount is in data
        EventTopicSchema {
            signature: "TokensClaimed(address,uint256)",
            topic: keccak256(b"TokensClaimed(address,uint256)"),
            data_params: &[DataKind::Uint256],
            amount_index: 0,
        },
    ]
});

pub fn schema_for_topic(topic: &B256) -> Option<&'static EventTopicSchema> {
    CLAIM_EVENT_SCHEMAS.iter().find(|s| s.topic == *topic)
}

/// Read the amount field out of a log's data payload.
/// Returns `None` for a payload too short for the schema — the caller
/// skips the record and keeps accumulating.
pub fn decode_amount(schema: &EventTopicSchema, data: &[u8]) -> Option<U256> {
    if data.len() < 32 * schema.data_params.len() {
        return None;
    }
    let start = schema.amount_index * 32;
    Some(U256::from_be_slice(&data[start..start + 32]))
}
