pub mod coin;
pub mod error;
pub mod rpc;
pub mod types;

#[cfg(test)]
mod test_util;

pub use coin::CoinSet;
pub use error::{CallError, CoreError, RpcError};
pub use rpc::{CallContext, ClientOptions, SuiClient, SuiRpc};
