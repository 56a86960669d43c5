//! Batched JSON-RPC correlation engine.
//!
//! Allocates request ids, packs logical calls into one wire batch, and maps
//! every reply entry back to the call that produced it, whatever order the
//! node answers in and whichever entries it leaves out.

mod correlate;
mod dispatch;
mod protocol;
mod request_id;

pub use correlate::{correlate, Anomaly, BatchResult};
pub use dispatch::{BatchDispatcher, CallContext};
pub use protocol::{decode, encode, CallSpec, Outcome, ReplyEntry};
pub use request_id::{RequestId, RequestIdAllocator};
