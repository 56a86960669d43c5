//! Shared test helpers for `suibatch-core` unit tests.
//!
//! Builders for deterministic ids and for node-shaped JSON fixtures, so tests
//! across modules agree on what a node reply looks like.

use serde_json::{json, Value};

use crate::types::{Coin, ObjectId, ObjectRef, SuiAddress, ID_LENGTH, SUI_COIN_TYPE};

// ==============================================================================
// Id Helpers
// ==============================================================================

/// Create a deterministic `ObjectId` from a single distinguishing byte.
pub fn object_id_from_byte(b: u8) -> ObjectId {
    let mut bytes = [0u8; ID_LENGTH];
    bytes[ID_LENGTH - 1] = b;
    ObjectId::from_bytes(bytes)
}

pub fn address_from_byte(b: u8) -> SuiAddress {
    let mut bytes = [0u8; ID_LENGTH];
    bytes[0] = b;
    SuiAddress::from_bytes(bytes)
}

pub fn make_coin(b: u8, balance: u64) -> Coin {
    Coin {
        reference: ObjectRef {
            object_id: object_id_from_byte(b),
            version: 1,
            digest: format!("digest-{b}"),
        },
        balance,
        coin_type: SUI_COIN_TYPE.to_owned(),
    }
}

// ==============================================================================
// Node JSON Fixtures
// ==============================================================================

/// `sui_getObject` result for an existing Move object.
pub fn object_json(id: ObjectId, type_: Option<&str>, fields: Value) -> Value {
    json!({
        "status": "Exists",
        "details": {
            "data": {
                "dataType": "moveObject",
                "type": type_,
                "fields": fields,
            },
            "owner": {"AddressOwner": address_from_byte(1).to_string()},
            "previousTransaction": "4WzGKnvGzC4ndpsVsvFz2qBjZMwMnhG9mbX5yHJNNDDL",
            "storageRebate": 14,
            "reference": {"objectId": id.to_string(), "version": 1, "digest": "obj-digest"},
        }
    })
}

pub fn coin_object_json(id: ObjectId, balance: u64) -> Value {
    object_json(
        id,
        Some(SUI_COIN_TYPE),
        json!({"balance": balance, "id": {"id": id.to_string()}}),
    )
}

/// One entry of a `sui_getObjectsOwnedByAddress` result.
pub fn owned_info_json(id: ObjectId, type_: &str) -> Value {
    json!({
        "objectId": id.to_string(),
        "version": 1,
        "digest": "obj-digest",
        "type": type_,
        "owner": {"AddressOwner": address_from_byte(1).to_string()},
        "previousTransaction": "4WzGKnvGzC4ndpsVsvFz2qBjZMwMnhG9mbX5yHJNNDDL",
    })
}

/// `sui_getTransaction` result with successful effects.
pub fn transaction_json(digest: &str) -> Value {
    json!({
        "certificate": {"transactionDigest": digest},
        "effects": effects_json(digest),
        "timestamp_ms": 1_668_000_000_000u64,
    })
}

pub fn effects_json(digest: &str) -> Value {
    json!({
        "status": {"status": "success"},
        "gasUsed": {"computationCost": 100, "storageCost": 40, "storageRebate": 10},
        "transactionDigest": digest,
    })
}
