use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CallError;
use crate::rpc::Method;
use crate::types::{
    Coin, ObjectData, ObjectId, ObjectInfo, ObjectRead, ObjectRef, TransactionBytes,
    TransactionDigest, TransactionEffects, TransactionResponse,
};

/// Prefix shared by every coin struct tag, whatever the currency.
const COIN_TYPE_PREFIX: &str = "0x2::coin::Coin<";

fn from_result<T: DeserializeOwned>(method: Method, raw: Value) -> Result<T, CallError> {
    serde_json::from_value(raw).map_err(|e| CallError::decode(method.name(), e))
}

pub(super) fn parse_u64(method: Method, raw: Value) -> Result<u64, CallError> {
    raw.as_u64()
        .ok_or_else(|| CallError::decode(method.name(), format!("expected integer, got {raw}")))
}

pub(super) fn parse_transaction(raw: Value) -> Result<TransactionResponse, CallError> {
    from_result(Method::GetTransaction, raw)
}

pub(super) fn parse_effects(raw: Value) -> Result<TransactionEffects, CallError> {
    from_result(Method::DryRunTransaction, raw)
}

pub(super) fn parse_transaction_bytes(raw: Value) -> Result<TransactionBytes, CallError> {
    from_result(Method::MoveCall, raw)
}

pub(super) fn parse_object_infos(raw: Value) -> Result<Vec<ObjectInfo>, CallError> {
    from_result(Method::GetObjectsOwnedByAddress, raw)
}

/// Decode the single digest returned for a one-wide range `[i, i+1)`.
///
/// Older nodes return `[[seq, digest]]`, newer ones `[digest]`.
pub(super) fn parse_range_digest(seq: u64, raw: Value) -> Result<TransactionDigest, CallError> {
    let method = Method::GetTransactionsInRange.name();
    let entries = raw
        .as_array()
        .ok_or_else(|| CallError::decode(method, format!("expected array, got {raw}")))?;
    let entry = entries
        .first()
        .ok_or_else(|| CallError::decode(method, format!("no transaction at sequence {seq}")))?;

    let digest = match entry {
        Value::String(digest) => digest.as_str(),
        Value::Array(pair) => pair
            .get(1)
            .and_then(Value::as_str)
            .ok_or_else(|| CallError::decode(method, format!("invalid range entry: {entry}")))?,
        other => {
            return Err(CallError::decode(
                method,
                format!("invalid range entry: {other}"),
            ))
        }
    };
    Ok(TransactionDigest::from(digest))
}

pub(super) fn parse_object_read(raw: Value) -> Result<ObjectRead, CallError> {
    #[derive(serde::Deserialize)]
    #[serde(tag = "status", content = "details")]
    enum RawObjectRead {
        Exists(RawObject),
        NotExists(ObjectId),
        Deleted(ObjectRef),
    }

    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct RawObject {
        data: RawObjectData,
        owner: Value,
        previous_transaction: Option<TransactionDigest>,
        reference: ObjectRef,
    }

    #[derive(serde::Deserialize)]
    struct RawObjectData {
        #[serde(rename = "type")]
        type_: Option<String>,
        #[serde(default)]
        fields: Value,
    }

    let read = match from_result::<RawObjectRead>(Method::GetObject, raw)? {
        RawObjectRead::Exists(object) => ObjectRead::Exists(ObjectData {
            reference: object.reference,
            type_: object.data.type_,
            owner: object.owner,
            previous_transaction: object.previous_transaction,
            fields: object.data.fields,
        }),
        RawObjectRead::NotExists(id) => ObjectRead::NotExists(id),
        RawObjectRead::Deleted(reference) => ObjectRead::Deleted(reference),
    };
    Ok(read)
}

/// Interpret an object as a coin. Returns `Ok(None)` for non-coin objects.
pub(super) fn parse_coin(data: &ObjectData) -> Result<Option<Coin>, CallError> {
    let Some(coin_type) = data.type_.as_deref() else {
        return Ok(None);
    };
    if !coin_type.starts_with(COIN_TYPE_PREFIX) {
        return Ok(None);
    }

    let method = Method::GetObject.name();
    let balance = match data.fields.get("balance") {
        Some(Value::Number(n)) => n.as_u64(),
        // Balances above 2^53 may be sent as strings.
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        CallError::decode(
            method,
            format!("coin {} has no valid balance", data.reference.object_id),
        )
    })?;

    Ok(Some(Coin {
        reference: data.reference.clone(),
        balance,
        coin_type: coin_type.to_owned(),
    }))
}
