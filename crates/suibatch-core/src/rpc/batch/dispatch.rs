use std::num::NonZeroU32;
use std::ops::Range;
use std::time::Duration;

use futures::future::try_join_all;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{CoreError, RpcError};

use super::super::options::ClientOptions;
use super::super::transport::{Transport, TransportReply};
use super::correlate::{correlate, BatchResult};
use super::protocol::{body_preview, decode, encode, CallSpec};
use super::request_id::{RequestId, RequestIdAllocator};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Caller-side controls for one round trip.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Duration>,
    cancel: Option<CancellationToken>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the client's default deadline for this call.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Abort the in-flight exchange as soon as `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Packs logical calls into wire batches and demultiplexes the replies.
///
/// Owns the client's id allocator; the transport is shared by all batches.
pub struct BatchDispatcher<T> {
    transport: T,
    ids: RequestIdAllocator,
    limiter: Option<DirectRateLimiter>,
    batch_chunk_size: usize,
    default_deadline: Duration,
    log_anomalies: bool,
}

impl<T: Transport> BatchDispatcher<T> {
    pub fn new(transport: T, options: &ClientOptions) -> Result<Self, CoreError> {
        options.validate()?;

        let limiter = options
            .requests_per_second
            .and_then(NonZeroU32::new)
            .map(|limit| RateLimiter::direct(Quota::per_second(limit)));
        let ids = match options.id_seed {
            Some(seed) => RequestIdAllocator::new(seed),
            None => RequestIdAllocator::from_clock(),
        };

        Ok(Self {
            transport,
            ids,
            limiter,
            batch_chunk_size: options.batch_chunk_size,
            default_deadline: options.request_timeout,
            log_anomalies: options.log_anomalies,
        })
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue one call and return its result, flattening a per-call failure
    /// into the error.
    pub async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, CoreError> {
        let result = self
            .call_batch(ctx, vec![(method.to_owned(), params)])
            .await?;
        match result.into_outcomes().pop() {
            Some(outcome) => Ok(outcome?),
            None => Err(RpcError::MalformedResponse(format!("no outcome for {method}")).into()),
        }
    }

    /// Issue `calls` as one logical batch.
    ///
    /// Outcomes come back in the order of `calls`. Any batch-level failure
    /// aborts the whole call, including chunks that already succeeded.
    pub async fn call_batch(
        &self,
        ctx: &CallContext,
        calls: Vec<(String, Vec<Value>)>,
    ) -> Result<BatchResult, RpcError> {
        if calls.is_empty() {
            return Ok(BatchResult::default());
        }
        if calls.len() <= self.batch_chunk_size {
            return self.round_trip(ctx, calls).await;
        }

        // Keep each payload small enough for node/proxy limits while still
        // issuing chunks concurrently to avoid serial round-trip latency.
        let mut remaining = calls.into_iter().peekable();
        let mut chunks = Vec::new();
        while remaining.peek().is_some() {
            chunks.push(
                remaining
                    .by_ref()
                    .take(self.batch_chunk_size)
                    .collect::<Vec<_>>(),
            );
        }

        let parts = try_join_all(chunks.into_iter().map(|chunk| self.round_trip(ctx, chunk))).await?;
        let mut merged = BatchResult::default();
        for part in parts {
            merged.append(part);
        }
        Ok(merged)
    }

    /// One call of `method` per identifier in `range`, outcomes in ascending
    /// identifier order.
    pub async fn call_range<F>(
        &self,
        ctx: &CallContext,
        method: &str,
        range: Range<u64>,
        params_for: F,
    ) -> Result<BatchResult, RpcError>
    where
        F: Fn(u64) -> Vec<Value>,
    {
        let calls = range.map(|i| (method.to_owned(), params_for(i))).collect();
        self.call_batch(ctx, calls).await
    }

    async fn round_trip(
        &self,
        ctx: &CallContext,
        calls: Vec<(String, Vec<Value>)>,
    ) -> Result<BatchResult, RpcError> {
        let count = calls.len() as u64;
        let start_id = self
            .ids
            .reserve(count)
            .ok_or(RpcError::IdsExhausted { count })?;
        // `reserve` only succeeds when `start + count` fits in a u64.
        let specs: Vec<CallSpec> = (start_id.0..start_id.0 + count)
            .zip(calls)
            .map(|(id, (method, params))| CallSpec {
                id: RequestId(id),
                method,
                params,
            })
            .collect();
        debug!(
            rpc.batch_start_id = start_id.0,
            rpc.batch_size = specs.len(),
            rpc.method = specs[0].method.as_str(),
            "rpc batch call"
        );

        let payload = encode(&specs)?;
        let reply = self.exchange(ctx, payload).await?;
        debug!(
            rpc.batch_start_id = start_id.0,
            rpc.batch_size = specs.len(),
            status = %reply.status,
            body_len = reply.body.len(),
            "rpc batch response"
        );
        trace!(
            rpc.batch_start_id = start_id.0,
            body = %String::from_utf8_lossy(&reply.body),
            "rpc batch response body"
        );

        if !reply.status.is_success() {
            return Err(RpcError::Status {
                status: reply.status,
                body: body_preview(&reply.body),
            });
        }

        let result = correlate(&specs, decode(&reply.body)?);
        if self.log_anomalies {
            for anomaly in result.anomalies() {
                warn!(
                    rpc.batch_start_id = start_id.0,
                    rpc.batch_size = specs.len(),
                    %anomaly,
                    "protocol anomaly in batch reply"
                );
            }
        }
        Ok(result)
    }

    /// Rate limit, send, and enforce the deadline and cancellation. The
    /// deadline covers the wait for a rate-limit permit as well.
    async fn exchange(
        &self,
        ctx: &CallContext,
        payload: Vec<u8>,
    ) -> Result<TransportReply, RpcError> {
        let deadline = ctx.deadline.unwrap_or(self.default_deadline);
        let bounded = async {
            let send = async {
                self.wait_for_rate_limit().await;
                self.transport.send(payload, Some(deadline)).await
            };
            tokio::time::timeout(deadline, send)
                .await
                .unwrap_or_else(|_| Err(RpcError::Timeout(deadline)))
        };

        match &ctx.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(RpcError::Cancelled),
                reply = bounded => reply,
            },
            None => bounded.await,
        }
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}
