use clap::{Parser, Subcommand};
use serde_json::Value;

use suibatch_core::types::{ObjectId, SuiAddress};

/// suibatch: batched JSON-RPC client for Sui full nodes.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Sui full-node RPC URL.
    #[arg(
        long,
        default_value = "https://fullnode.devnet.sui.io:443",
        env = "SUIBATCH_RPC_URL"
    )]
    pub rpc_url: String,

    /// RPC username for nodes behind basic auth.
    #[arg(long, env = "SUIBATCH_RPC_USER")]
    pub rpc_user: Option<String>,

    /// RPC password for nodes behind basic auth.
    #[arg(long, env = "SUIBATCH_RPC_PASS")]
    pub rpc_pass: Option<String>,

    /// Deadline for one round trip, in seconds.
    #[arg(long, default_value = "30", env = "SUIBATCH_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Outbound HTTP requests per second (a batch counts as one).
    #[arg(long, env = "SUIBATCH_RPS")]
    pub requests_per_second: Option<u32>,

    /// Largest number of calls packed into one wire batch.
    #[arg(long, default_value = "50", env = "SUIBATCH_BATCH_CHUNK_SIZE")]
    pub batch_chunk_size: usize,

    /// First request id. Seeded from the clock when omitted.
    #[arg(long)]
    pub id_seed: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the node's total transaction count.
    Info,

    /// List transaction digests for sequence numbers in `start..end`.
    TxRange { start: u64, end: u64 },

    /// Fetch transactions by digest in one batch.
    Txs {
        #[arg(required = true)]
        digests: Vec<String>,
    },

    /// Fetch objects by id in one batch.
    Objects {
        #[arg(required = true)]
        ids: Vec<ObjectId>,
    },

    /// List objects owned by an address. With `--type`, fetch every owned
    /// object of that struct type instead.
    Owned {
        address: SuiAddress,
        #[arg(long = "type")]
        struct_type: Option<String>,
    },

    /// List the gas coins owned by an address.
    Coins { address: SuiAddress },

    /// Pick the first gas coin whose balance covers `amount`.
    PickCoin { address: SuiAddress, amount: u64 },

    /// Build a Move call transaction and dry-run it.
    DryRunMoveCall {
        #[arg(long)]
        signer: SuiAddress,
        #[arg(long)]
        package: ObjectId,
        #[arg(long)]
        module: String,
        #[arg(long)]
        function: String,
        /// Type argument (repeatable).
        #[arg(long = "type-arg")]
        type_args: Vec<String>,
        /// Call argument as JSON; bare words are taken as strings (repeatable).
        #[arg(long = "arg", value_parser = parse_json_arg)]
        args: Vec<Value>,
        /// Gas coin. The node picks one when omitted.
        #[arg(long)]
        gas: Option<ObjectId>,
        #[arg(long, default_value = "10000")]
        gas_budget: u64,
    },
}

fn parse_json_arg(raw: &str) -> Result<Value, String> {
    Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned())))
}
