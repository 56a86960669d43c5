//! Native JSON-RPC client for Sui full nodes.
//!
//! Implements [`SuiRpc`](super::SuiRpc) on top of the batch dispatcher,
//! with an HTTP(S) transport, optional request rate limiting, concurrent
//! chunking of large batches, basic auth, and an LRU transaction cache.

mod client;
mod connection;
mod parsing;

pub use client::SuiClient;
pub use connection::HttpTransport;
