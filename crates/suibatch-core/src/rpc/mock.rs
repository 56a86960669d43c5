use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::error::RpcError;

use super::transport::{Transport, TransportReply};

/// What the node does with one call of a batch.
pub enum Canned {
    Result(Value),
    Error { code: i64, message: String },
    /// Drop the call from the reply.
    Omit,
}

/// What the node sends back for a whole payload.
pub enum MockReply {
    Json(Value),
    Raw { status: StatusCode, body: Vec<u8> },
    Fail(RpcError),
}

impl MockReply {
    /// Answer every request with its own id as the result.
    pub fn echo(request: &Value) -> Self {
        Self::Json(echo_value(request))
    }

    fn per_call(request: &Value, respond: &dyn Fn(&str, &[Value]) -> Canned) -> Self {
        match request {
            Value::Array(batch) => Self::Json(Value::Array(
                batch
                    .iter()
                    .filter_map(|req| answer(req, respond))
                    .collect(),
            )),
            single => Self::Json(answer(single, respond).unwrap_or_else(|| json!([]))),
        }
    }
}

fn echo_value(request: &Value) -> Value {
    let reply_to = |req: &Value| {
        json!({"jsonrpc": "2.0", "id": req["id"].clone(), "result": req["id"].clone()})
    };
    match request {
        Value::Array(batch) => Value::Array(batch.iter().map(reply_to).collect()),
        single => reply_to(single),
    }
}

fn answer(request: &Value, respond: &dyn Fn(&str, &[Value]) -> Canned) -> Option<Value> {
    let method = request["method"].as_str().unwrap_or_default();
    let params = request["params"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    let id = request["id"].clone();
    match respond(method, params) {
        Canned::Result(result) => Some(json!({"jsonrpc": "2.0", "id": id, "result": result})),
        Canned::Error { code, message } => Some(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": code, "message": message},
        })),
        Canned::Omit => None,
    }
}

type Responder = Box<dyn Fn(&Value) -> MockReply + Send + Sync>;

/// A scripted node for tests. Records every payload it receives and answers
/// through a responder closure, optionally reversed or delayed.
pub struct MockTransport {
    responder: Responder,
    reversed: bool,
    delay: Option<Duration>,
    requests: Mutex<Vec<Value>>,
}

impl MockTransport {
    pub fn with_reply(responder: impl Fn(&Value) -> MockReply + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            reversed: false,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::with_reply(MockReply::echo)
    }

    /// Answer call by call from `(method, params)`.
    pub fn per_call(
        respond: impl Fn(&str, &[Value]) -> Canned + Send + Sync + 'static,
    ) -> Self {
        Self::with_reply(move |request| MockReply::per_call(request, &respond))
    }

    /// Reverse the order of batch reply entries.
    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().expect("mock mutex poisoned").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("mock mutex poisoned").len()
    }

    /// Individual calls received so far, flattened across payloads.
    pub fn calls(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .flat_map(|payload| match payload {
                Value::Array(batch) => batch,
                single => vec![single],
            })
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        payload: Vec<u8>,
        _deadline: Option<Duration>,
    ) -> Result<TransportReply, RpcError> {
        let request: Value =
            serde_json::from_slice(&payload).expect("dispatcher always sends valid JSON");
        self.requests
            .lock()
            .expect("mock mutex poisoned")
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match (self.responder)(&request) {
            MockReply::Json(mut value) => {
                if self.reversed {
                    if let Value::Array(entries) = &mut value {
                        entries.reverse();
                    }
                }
                Ok(TransportReply {
                    status: StatusCode::OK,
                    body: serde_json::to_vec(&value).expect("JSON value serializes"),
                })
            }
            MockReply::Raw { status, body } => Ok(TransportReply { status, body }),
            MockReply::Fail(err) => Err(err),
        }
    }
}
