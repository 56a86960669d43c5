//! JSON-RPC 2.0 envelope encoding and decoding.
//!
//! Encoding is a structural transform: every [`CallSpec`] becomes one request
//! object with its id, method and params copied verbatim. Decoding accepts a
//! bare reply object or an array of them (possibly shorter than the request)
//! and only fails the whole batch when the reply cannot be trusted at all.

use serde_json::Value;

use crate::error::{CallError, RpcError};

use super::request_id::RequestId;

/// Longest body excerpt quoted in error messages.
const BODY_PREVIEW_CHARS: usize = 512;

/// One logical call with its allocated id.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSpec {
    pub id: RequestId,
    pub method: String,
    pub params: Vec<Value>,
}

/// Outcome of one logical call.
pub type Outcome = Result<Value, CallError>;

/// One decoded entry of a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyEntry {
    pub id: RequestId,
    pub outcome: Outcome,
}

#[derive(serde::Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: RequestId,
    method: &'a str,
    params: &'a [Value],
}

impl<'a> From<&'a CallSpec> for JsonRpcRequest<'a> {
    fn from(spec: &'a CallSpec) -> Self {
        Self {
            jsonrpc: "2.0",
            id: spec.id,
            method: &spec.method,
            params: &spec.params,
        }
    }
}

/// Serialize `specs` into one wire payload. A single call is sent as a bare
/// request object, anything else as a batch array.
pub fn encode(specs: &[CallSpec]) -> Result<Vec<u8>, RpcError> {
    let encoded = match specs {
        [single] => serde_json::to_vec(&JsonRpcRequest::from(single)),
        many => serde_json::to_vec(&many.iter().map(JsonRpcRequest::from).collect::<Vec<_>>()),
    };
    encoded.map_err(RpcError::Encode)
}

/// Parse a reply payload into its entries, in wire order.
pub fn decode(body: &[u8]) -> Result<Vec<ReplyEntry>, RpcError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        RpcError::MalformedResponse(format!(
            "decode JSON-RPC response: {e}; body={}",
            body_preview(body)
        ))
    })?;

    match value {
        Value::Array(items) => items.into_iter().map(decode_entry).collect(),
        Value::Object(_) => Ok(vec![decode_entry(value)?]),
        other => Err(RpcError::MalformedResponse(format!(
            "expected a reply object or array, got {other}"
        ))),
    }
}

fn decode_entry(item: Value) -> Result<ReplyEntry, RpcError> {
    let mut fields = match item {
        Value::Object(fields) => fields,
        other => {
            return Err(RpcError::MalformedResponse(format!(
                "reply entry is not an object: {other}"
            )))
        }
    };

    let id = parse_reply_id(fields.get("id"))?;
    let error = fields.remove("error").filter(|err| !err.is_null());
    let result = fields.remove("result");

    let outcome = match (error, result) {
        // An entry carrying both is contradictory; the error is authoritative.
        (Some(err), _) => Err(parse_jsonrpc_error(err)),
        (None, Some(result)) => Ok(result),
        (None, None) => {
            return Err(RpcError::MalformedResponse(format!(
                "reply id={id} carries neither result nor error"
            )))
        }
    };

    Ok(ReplyEntry { id, outcome })
}

/// Parse a JSON-RPC error value into a per-call error.
///
/// Errors shaped `{"code": <int>, "message": <string>}` become
/// [`CallError::Server`]; anything else is kept verbatim as
/// [`CallError::NonStandard`].
pub(crate) fn parse_jsonrpc_error(err: Value) -> CallError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
    }

    match serde_json::from_value::<JsonRpcError>(err.clone()) {
        Ok(parsed) => CallError::Server {
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) => CallError::NonStandard(err.to_string()),
    }
}

pub(crate) fn parse_reply_id(id: Option<&Value>) -> Result<RequestId, RpcError> {
    let Some(id) = id else {
        return Err(RpcError::MalformedResponse(
            "reply entry has no id".to_owned(),
        ));
    };

    if let Some(n) = id.as_u64() {
        return Ok(RequestId(n));
    }

    if let Some(s) = id.as_str() {
        return s.parse::<u64>().map(RequestId).map_err(|e| {
            RpcError::MalformedResponse(format!("invalid reply id string {s:?}: {e}"))
        });
    }

    Err(RpcError::MalformedResponse(format!(
        "invalid reply id: {id}"
    )))
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(BODY_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn spec(id: u64, method: &str, params: Vec<Value>) -> CallSpec {
        CallSpec {
            id: RequestId(id),
            method: method.to_owned(),
            params,
        }
    }

    #[test]
    fn encode_batch_copies_fields_verbatim() {
        let specs = vec![
            spec(1, "sui_getObject", vec![json!("0x2")]),
            spec(2, "sui_getTransaction", vec![json!("abc"), json!(true)]),
        ];
        let wire: Value = serde_json::from_slice(&encode(&specs).expect("encodes")).expect("valid JSON");
        assert_eq!(
            wire,
            json!([
                {"jsonrpc": "2.0", "id": 1, "method": "sui_getObject", "params": ["0x2"]},
                {"jsonrpc": "2.0", "id": 2, "method": "sui_getTransaction", "params": ["abc", true]},
            ])
        );
    }

    #[test]
    fn encode_single_call_is_bare_object() {
        let wire: Value =
            serde_json::from_slice(
                &encode(&[spec(9, "sui_getTotalTransactionNumber", vec![])]).expect("encodes"),
            )
                .expect("valid JSON");
        assert_eq!(
            wire,
            json!({"jsonrpc": "2.0", "id": 9, "method": "sui_getTotalTransactionNumber", "params": []})
        );
    }

    #[test]
    fn decode_accepts_bare_object() {
        let entries = decode(br#"{"jsonrpc":"2.0","id":5,"result":{"ok":true}}"#).expect("decode");
        assert_eq!(
            entries,
            vec![ReplyEntry {
                id: RequestId(5),
                outcome: Ok(json!({"ok": true})),
            }]
        );
    }

    #[test]
    fn decode_accepts_short_array_and_string_ids() {
        let entries = decode(br#"[{"id":"3","result":null}]"#).expect("decode");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, RequestId(3));
        assert_eq!(entries[0].outcome, Ok(Value::Null));
    }

    #[test]
    fn decode_turns_error_entries_into_per_call_outcomes() {
        let entries = decode(
            br#"[
                {"id":1,"error":{"code":-32602,"message":"invalid params"}},
                {"id":2,"error":"boom"},
                {"id":3,"error":null,"result":7},
                {"id":4,"error":{"code":1,"message":"wins"},"result":8}
            ]"#,
        )
        .expect("decode");
        assert_eq!(
            entries[0].outcome,
            Err(CallError::Server {
                code: -32602,
                message: "invalid params".into(),
            })
        );
        assert_eq!(
            entries[1].outcome,
            Err(CallError::NonStandard("\"boom\"".into()))
        );
        assert_eq!(entries[2].outcome, Ok(json!(7)));
        assert!(matches!(
            entries[3].outcome,
            Err(CallError::Server { code: 1, .. })
        ));
    }

    #[test]
    fn decode_rejects_entry_without_result_or_error() {
        let err = decode(br#"[{"id":1,"result":1},{"id":2}]"#).expect_err("must reject");
        assert!(matches!(err, RpcError::MalformedResponse(msg) if msg.contains("id=2")));
    }

    #[test]
    fn decode_rejects_unparseable_ids() {
        for body in [
            &br#"[{"id":true,"result":1}]"#[..],
            br#"[{"id":"seven","result":1}]"#,
            br#"[{"id":-4,"result":1}]"#,
            br#"{"result":1}"#,
        ] {
            let err = decode(body).expect_err("must reject");
            assert!(matches!(err, RpcError::MalformedResponse(_)), "{err}");
        }
    }

    #[test]
    fn decode_rejects_non_json_and_scalars() {
        assert!(matches!(
            decode(b"<html>bad gateway</html>"),
            Err(RpcError::MalformedResponse(_))
        ));
        assert!(matches!(decode(b"42"), Err(RpcError::MalformedResponse(_))));
        assert!(matches!(
            decode(b"[1, 2]"),
            Err(RpcError::MalformedResponse(_))
        ));
    }

    #[test]
    fn body_preview_truncates_long_bodies() {
        let long = "x".repeat(BODY_PREVIEW_CHARS + 10);
        let preview = body_preview(long.as_bytes());
        assert_eq!(preview.len(), BODY_PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
    }
}
