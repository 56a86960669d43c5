//! Tunables for [`SuiClient`](super::SuiClient) and the batch dispatcher,
//! with validation so misconfiguration fails at construction time.

use std::time::Duration;

use crate::error::CoreError;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BATCH_CHUNK_SIZE: usize = 50;
const DEFAULT_TX_CACHE_CAPACITY: usize = 10_000;

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Deadline applied to a round trip when the caller does not set one.
    pub request_timeout: Duration,
    /// Outbound HTTP requests per second; a batch counts as one request.
    pub requests_per_second: Option<u32>,
    /// Largest number of calls packed into one wire batch. Larger logical
    /// batches are split and the chunks sent concurrently.
    pub batch_chunk_size: usize,
    /// First request id. `None` seeds from the wall clock.
    pub id_seed: Option<u64>,
    /// Number of decoded transactions kept in memory.
    pub tx_cache_capacity: usize,
    /// Emit a warning for every reply anomaly (unknown or repeated id).
    pub log_anomalies: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            requests_per_second: None,
            batch_chunk_size: DEFAULT_BATCH_CHUNK_SIZE,
            id_seed: None,
            tx_cache_capacity: DEFAULT_TX_CACHE_CAPACITY,
            log_anomalies: true,
        }
    }
}

impl ClientOptions {
    pub(crate) fn validate(&self) -> Result<(), CoreError> {
        if self.request_timeout.is_zero() {
            return Err(invalid("request_timeout must be greater than 0"));
        }
        if self.requests_per_second == Some(0) {
            return Err(invalid("requests_per_second must be at least 1"));
        }
        if self.batch_chunk_size == 0 {
            return Err(invalid("batch_chunk_size must be at least 1"));
        }
        if self.tx_cache_capacity == 0 {
            return Err(invalid("tx_cache_capacity must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> CoreError {
    CoreError::InvalidConfig(message.to_owned())
}
