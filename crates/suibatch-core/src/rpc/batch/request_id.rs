use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Identifier carried by one JSON-RPC request and echoed by its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-client source of request ids.
///
/// Ids are strictly increasing for the lifetime of the allocator and never
/// wrap: once a reservation would run past `u64::MAX` the allocator refuses
/// it. Each allocation is a single compare-and-swap loop, so concurrent
/// callers never observe the same id.
#[derive(Debug)]
pub struct RequestIdAllocator {
    next: AtomicU64,
}

impl RequestIdAllocator {
    pub fn new(seed: u64) -> Self {
        Self {
            next: AtomicU64::new(seed),
        }
    }

    /// Seed from wall-clock nanoseconds so a restarted client does not
    /// immediately reuse ids a proxy may still associate with old requests.
    pub fn from_clock() -> Self {
        Self::new(initial_request_id())
    }

    pub fn next(&self) -> Option<RequestId> {
        self.reserve(1)
    }

    /// Atomically reserve `count` consecutive ids and return the first.
    ///
    /// Returns `None`, reserving nothing, when `first + count` would
    /// overflow. Every id in `first..first + count` is therefore
    /// representable.
    pub fn reserve(&self, count: u64) -> Option<RequestId> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| {
                next.checked_add(count)
            })
            .ok()
            .map(RequestId)
    }
}

fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}
