use std::num::NonZeroUsize;

use async_trait::async_trait;
use lru::LruCache;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::coin::CoinSet;
use crate::error::{CallError, CoreError, RpcError};
use crate::types::{
    MoveCallRequest, ObjectId, ObjectInfo, ObjectRead, SuiAddress, TransactionBytes,
    TransactionDigest, TransactionEffects, TransactionResponse, SUI_COIN_TYPE,
};

use super::super::batch::{BatchDispatcher, BatchResult, CallContext};
use super::super::options::ClientOptions;
use super::super::transport::Transport;
use super::super::{BatchOutcomes, Method, SuiRpc};
use super::connection::HttpTransport;
use super::parsing::{
    parse_coin, parse_effects, parse_object_infos, parse_object_read, parse_range_digest,
    parse_transaction, parse_transaction_bytes, parse_u64,
};

/// Sui full-node JSON-RPC client.
///
/// Every typed operation goes through one [`BatchDispatcher`], so ids are
/// unique across all concurrent callers of the same client. Decoded
/// transactions are kept in a bounded LRU cache: a transaction never changes
/// once it has a digest, so entries only need eviction.
pub struct SuiClient<T = HttpTransport> {
    dispatcher: BatchDispatcher<T>,
    tx_cache: RwLock<LruCache<TransactionDigest, TransactionResponse>>,
}

impl SuiClient<HttpTransport> {
    /// Create a client for an `http://` or `https://` node URL.
    ///
    /// `user` and `pass` must be given together or not at all.
    pub fn new(
        connection: &str,
        user: Option<&str>,
        pass: Option<&str>,
        options: ClientOptions,
    ) -> Result<Self, CoreError> {
        Self::with_transport(HttpTransport::new(connection, user, pass)?, options)
    }
}

impl<T: Transport> SuiClient<T> {
    pub fn with_transport(transport: T, options: ClientOptions) -> Result<Self, CoreError> {
        let dispatcher = BatchDispatcher::new(transport, &options)?;
        let capacity = NonZeroUsize::new(options.tx_cache_capacity).ok_or_else(|| {
            CoreError::InvalidConfig("tx_cache_capacity must be at least 1".to_owned())
        })?;
        Ok(Self {
            dispatcher,
            tx_cache: RwLock::new(LruCache::new(capacity)),
        })
    }

    /// The underlying dispatcher, for raw calls the typed API does not cover.
    pub fn dispatcher(&self) -> &BatchDispatcher<T> {
        &self.dispatcher
    }

    async fn call(
        &self,
        ctx: &CallContext,
        method: Method,
        params: Vec<Value>,
    ) -> Result<Value, CoreError> {
        method.validate(&params)?;
        self.dispatcher.call(ctx, method.name(), params).await
    }

    async fn cached_transaction(&self, digest: &TransactionDigest) -> Option<TransactionResponse> {
        // `LruCache::get` bumps recency, hence the write lock.
        self.tx_cache.write().await.get(digest).cloned()
    }
}

fn parse_all<U>(
    result: BatchResult,
    parse: impl Fn(Value) -> Result<U, CallError>,
) -> BatchOutcomes<U> {
    result
        .into_iter()
        .map(|outcome| outcome.and_then(&parse))
        .collect()
}

/// Keep the gas coins among `reads`, in node order.
fn collect_sui_coins(owner: &SuiAddress, reads: BatchOutcomes<ObjectRead>) -> CoinSet {
    let mut coins = Vec::with_capacity(reads.len());
    for read in reads {
        let data = match read {
            Ok(ObjectRead::Exists(data)) => data,
            // Spent between the listing and the fetch.
            Ok(ObjectRead::NotExists(_) | ObjectRead::Deleted(_)) => continue,
            Err(err) => {
                warn!(%owner, error = %err, "skipping coin that could not be fetched");
                continue;
            }
        };
        match parse_coin(&data) {
            Ok(Some(coin)) if coin.coin_type == SUI_COIN_TYPE => coins.push(coin),
            Ok(_) => {}
            Err(err) => warn!(%owner, error = %err, "skipping coin with invalid balance"),
        }
    }
    CoinSet::new(coins)
}

#[async_trait]
impl<T: Transport> SuiRpc for SuiClient<T> {
    async fn get_total_transaction_number(&self, ctx: &CallContext) -> Result<u64, CoreError> {
        let raw = self
            .call(ctx, Method::GetTotalTransactionNumber, Vec::new())
            .await?;
        Ok(parse_u64(Method::GetTotalTransactionNumber, raw)?)
    }

    async fn get_transactions_in_range(
        &self,
        ctx: &CallContext,
        start: u64,
        end: u64,
    ) -> Result<BatchOutcomes<TransactionDigest>, CoreError> {
        if start > end {
            return Err(CoreError::InvalidCall {
                method: Method::GetTransactionsInRange.name().to_owned(),
                message: format!("range start {start} is after end {end}"),
            });
        }

        // One single-width call per sequence number, so a gap in the node's
        // history only fails its own slot.
        let result = self
            .dispatcher
            .call_range(ctx, Method::GetTransactionsInRange.name(), start..end, |seq| {
                vec![json!(seq), json!(seq + 1)]
            })
            .await?;
        Ok((start..end)
            .zip(result)
            .map(|(seq, outcome)| outcome.and_then(|raw| parse_range_digest(seq, raw)))
            .collect())
    }

    async fn get_transaction(
        &self,
        ctx: &CallContext,
        digest: &TransactionDigest,
    ) -> Result<TransactionResponse, CoreError> {
        if let Some(tx) = self.cached_transaction(digest).await {
            return Ok(tx);
        }

        let raw = self
            .call(ctx, Method::GetTransaction, vec![json!(digest)])
            .await?;
        let tx = parse_transaction(raw)?;
        self.tx_cache.write().await.put(digest.clone(), tx.clone());
        Ok(tx)
    }

    async fn batch_get_transactions(
        &self,
        ctx: &CallContext,
        digests: &[TransactionDigest],
    ) -> Result<BatchOutcomes<TransactionResponse>, CoreError> {
        let cached: Vec<Option<TransactionResponse>> = {
            let mut cache = self.tx_cache.write().await;
            digests
                .iter()
                .map(|digest| cache.get(digest).cloned())
                .collect()
        };

        let calls = digests
            .iter()
            .zip(&cached)
            .filter(|(_, hit)| hit.is_none())
            .map(|(digest, _)| Method::GetTransaction.call(vec![json!(digest)]))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            requested = digests.len(),
            cache_hits = digests.len() - calls.len(),
            "batch get transactions"
        );

        let mut fetched = self.dispatcher.call_batch(ctx, calls).await?.into_iter();
        let mut cache = self.tx_cache.write().await;
        let mut results = Vec::with_capacity(digests.len());
        for (digest, hit) in digests.iter().zip(cached) {
            if let Some(tx) = hit {
                results.push(Ok(tx));
                continue;
            }
            let outcome = fetched
                .next()
                .ok_or_else(|| {
                    RpcError::MalformedResponse(format!(
                        "fewer outcomes than calls for {}",
                        Method::GetTransaction.name()
                    ))
                })?
                .and_then(parse_transaction);
            if let Ok(tx) = &outcome {
                cache.put(digest.clone(), tx.clone());
            }
            results.push(outcome);
        }
        Ok(results)
    }

    async fn get_object(&self, ctx: &CallContext, id: &ObjectId) -> Result<ObjectRead, CoreError> {
        let raw = self.call(ctx, Method::GetObject, vec![json!(id)]).await?;
        Ok(parse_object_read(raw)?)
    }

    async fn batch_get_objects(
        &self,
        ctx: &CallContext,
        ids: &[ObjectId],
    ) -> Result<BatchOutcomes<ObjectRead>, CoreError> {
        let calls = ids
            .iter()
            .map(|id| Method::GetObject.call(vec![json!(id)]))
            .collect::<Result<Vec<_>, _>>()?;
        let result = self.dispatcher.call_batch(ctx, calls).await?;
        Ok(parse_all(result, parse_object_read))
    }

    async fn get_objects_owned_by_address(
        &self,
        ctx: &CallContext,
        owner: &SuiAddress,
    ) -> Result<Vec<ObjectInfo>, CoreError> {
        let raw = self
            .call(ctx, Method::GetObjectsOwnedByAddress, vec![json!(owner)])
            .await?;
        Ok(parse_object_infos(raw)?)
    }

    async fn get_sui_coins_owned_by_address(
        &self,
        ctx: &CallContext,
        owner: &SuiAddress,
    ) -> Result<CoinSet, CoreError> {
        let reads = self
            .batch_get_objects_owned_by_address(ctx, owner, SUI_COIN_TYPE)
            .await?;
        let coins = collect_sui_coins(owner, reads);
        debug!(%owner, coins = coins.len(), total = coins.total_balance(), "loaded gas coins");
        Ok(coins)
    }

    async fn move_call(
        &self,
        ctx: &CallContext,
        request: &MoveCallRequest,
    ) -> Result<TransactionBytes, CoreError> {
        let raw = self
            .call(ctx, Method::MoveCall, request.to_params())
            .await?;
        Ok(parse_transaction_bytes(raw)?)
    }

    async fn dry_run_transaction(
        &self,
        ctx: &CallContext,
        tx: &TransactionBytes,
    ) -> Result<TransactionEffects, CoreError> {
        let raw = self
            .call(ctx, Method::DryRunTransaction, vec![json!(tx.tx_bytes)])
            .await?;
        Ok(parse_effects(raw)?)
    }
}
