use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::RpcError;

/// Raw answer of one network exchange.
#[derive(Debug, Clone)]
pub struct TransportReply {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Moves one encoded payload to the node and returns its raw answer.
///
/// Implementations must not resend a payload on their own: the ids inside it
/// are already spent, and a silent resend could make the node execute a call
/// twice under the same id.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        payload: Vec<u8>,
        deadline: Option<Duration>,
    ) -> Result<TransportReply, RpcError>;
}
