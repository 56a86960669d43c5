//! Sui node RPC abstraction layer.
//!
//! Defines the [`SuiRpc`] trait, the batch correlation engine it is built
//! on, the [`Transport`] seam, and the HTTP implementation ([`SuiClient`]).
//! A scripted transport for tests lives in `mock::MockTransport`.

pub mod batch;
mod http_adapter;
mod methods;
#[cfg(test)]
pub mod mock;
mod options;
pub mod transport;

pub use batch::{Anomaly, BatchDispatcher, BatchResult, CallContext, Outcome, RequestId};
pub use http_adapter::{HttpTransport, SuiClient};
pub use methods::Method;
pub use options::ClientOptions;
pub use transport::{Transport, TransportReply};

use async_trait::async_trait;

use crate::coin::CoinSet;
use crate::error::{CallError, CoreError};
use crate::types::{
    MoveCallRequest, ObjectId, ObjectInfo, ObjectRead, SuiAddress, TransactionBytes,
    TransactionDigest, TransactionEffects, TransactionResponse,
};

/// Positional per-call results of a typed batch operation.
pub type BatchOutcomes<T> = Vec<Result<T, CallError>>;

/// The Sui node RPC methods the client needs.
///
/// Single-item methods fail with the per-call error of their one call.
/// Batch methods fail as a whole only on batch-level errors; otherwise they
/// return one result per input, in input order.
#[async_trait]
pub trait SuiRpc: Send + Sync {
    async fn get_total_transaction_number(&self, ctx: &CallContext) -> Result<u64, CoreError>;

    /// Digests of the transactions with sequence numbers in `start..end`,
    /// one slot per sequence number in ascending order.
    async fn get_transactions_in_range(
        &self,
        ctx: &CallContext,
        start: u64,
        end: u64,
    ) -> Result<BatchOutcomes<TransactionDigest>, CoreError>;

    async fn get_transaction(
        &self,
        ctx: &CallContext,
        digest: &TransactionDigest,
    ) -> Result<TransactionResponse, CoreError>;

    /// Fetch many transactions. Implementations may batch these requests
    /// into one or more RPC calls.
    async fn batch_get_transactions(
        &self,
        ctx: &CallContext,
        digests: &[TransactionDigest],
    ) -> Result<BatchOutcomes<TransactionResponse>, CoreError> {
        let mut results = Vec::with_capacity(digests.len());
        for digest in digests {
            results.push(match self.get_transaction(ctx, digest).await {
                Ok(tx) => Ok(tx),
                Err(CoreError::Call(err)) => Err(err),
                Err(other) => return Err(other),
            });
        }
        Ok(results)
    }

    async fn get_object(&self, ctx: &CallContext, id: &ObjectId) -> Result<ObjectRead, CoreError>;

    async fn batch_get_objects(
        &self,
        ctx: &CallContext,
        ids: &[ObjectId],
    ) -> Result<BatchOutcomes<ObjectRead>, CoreError>;

    async fn get_objects_owned_by_address(
        &self,
        ctx: &CallContext,
        owner: &SuiAddress,
    ) -> Result<Vec<ObjectInfo>, CoreError>;

    /// Fetch every object of `owner` whose struct tag equals `struct_type`.
    async fn batch_get_objects_owned_by_address(
        &self,
        ctx: &CallContext,
        owner: &SuiAddress,
        struct_type: &str,
    ) -> Result<BatchOutcomes<ObjectRead>, CoreError> {
        let ids: Vec<ObjectId> = self
            .get_objects_owned_by_address(ctx, owner)
            .await?
            .into_iter()
            .filter(|info| info.type_ == struct_type)
            .map(|info| info.object_id)
            .collect();
        self.batch_get_objects(ctx, &ids).await
    }

    /// Snapshot of the gas coins owned by `owner`, in node order.
    ///
    /// Coins deleted between listing and fetching are skipped. A coin whose
    /// fetch failed is skipped with a warning rather than failing the set.
    async fn get_sui_coins_owned_by_address(
        &self,
        ctx: &CallContext,
        owner: &SuiAddress,
    ) -> Result<CoinSet, CoreError>;

    async fn move_call(
        &self,
        ctx: &CallContext,
        request: &MoveCallRequest,
    ) -> Result<TransactionBytes, CoreError>;

    async fn dry_run_transaction(
        &self,
        ctx: &CallContext,
        tx: &TransactionBytes,
    ) -> Result<TransactionEffects, CoreError>;
}
