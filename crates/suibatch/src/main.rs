mod cli;

use std::time::Duration;

use clap::Parser;
use eyre::{eyre, WrapErr};
use serde::Serialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use suibatch_core::rpc::{CallContext, ClientOptions, SuiClient, SuiRpc};
use suibatch_core::types::{MoveCallRequest, TransactionDigest};
use suibatch_core::CallError;

use cli::Command;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let options = ClientOptions {
        request_timeout: Duration::from_secs(args.timeout_secs),
        requests_per_second: args.requests_per_second,
        batch_chunk_size: args.batch_chunk_size,
        id_seed: args.id_seed,
        ..ClientOptions::default()
    };
    let rpc = SuiClient::new(
        &args.rpc_url,
        args.rpc_user.as_deref(),
        args.rpc_pass.as_deref(),
        options,
    )
    .context("configure RPC client")?;

    // Ctrl-C abandons the in-flight batch instead of waiting for the deadline.
    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted; cancelling in-flight requests");
                cancel.cancel();
            }
        }
    });
    let ctx = CallContext::new().with_cancellation(cancel);

    let output = run(&rpc, &ctx, args.command)
        .await
        .wrap_err_with(|| format!("request to `{}` failed", args.rpc_url))?;
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("render output")?
    );
    Ok(())
}

async fn run(rpc: &dyn SuiRpc, ctx: &CallContext, command: Command) -> eyre::Result<Value> {
    let output = match command {
        Command::Info => {
            let total = rpc.get_total_transaction_number(ctx).await?;
            json!({ "total_transactions": total })
        }
        Command::TxRange { start, end } => {
            let digests = rpc.get_transactions_in_range(ctx, start, end).await?;
            Value::Array(
                (start..end)
                    .zip(digests)
                    .map(|(seq, digest)| json!({ "seq": seq, "digest": outcome_json(digest) }))
                    .collect(),
            )
        }
        Command::Txs { digests } => {
            let digests: Vec<TransactionDigest> =
                digests.iter().map(|d| TransactionDigest::from(d.as_str())).collect();
            outcomes_json(rpc.batch_get_transactions(ctx, &digests).await?)
        }
        Command::Objects { ids } => outcomes_json(rpc.batch_get_objects(ctx, &ids).await?),
        Command::Owned {
            address,
            struct_type: Some(struct_type),
        } => outcomes_json(
            rpc.batch_get_objects_owned_by_address(ctx, &address, &struct_type)
                .await?,
        ),
        Command::Owned {
            address,
            struct_type: None,
        } => serde_json::to_value(rpc.get_objects_owned_by_address(ctx, &address).await?)?,
        Command::Coins { address } => {
            let coins = rpc.get_sui_coins_owned_by_address(ctx, &address).await?;
            json!({ "total_balance": coins.total_balance(), "coins": coins })
        }
        Command::PickCoin { address, amount } => {
            let coins = rpc.get_sui_coins_owned_by_address(ctx, &address).await?;
            let coin = coins
                .pick_coin_no_less(amount)
                .map_err(|err| eyre!(err).wrap_err(format!("{address} cannot cover {amount}")))?;
            serde_json::to_value(coin)?
        }
        Command::DryRunMoveCall {
            signer,
            package,
            module,
            function,
            type_args,
            args,
            gas,
            gas_budget,
        } => {
            let request = MoveCallRequest {
                signer,
                package_object_id: package,
                module,
                function,
                type_arguments: type_args,
                arguments: args,
                gas,
                gas_budget,
            };
            let tx = rpc.move_call(ctx, &request).await?;
            let effects = rpc.dry_run_transaction(ctx, &tx).await?;
            json!({
                "gas": tx.gas,
                "status": effects.status,
                "gas_used": effects.gas_used,
                "net_gas_usage": effects.gas_used.net_gas_usage(),
            })
        }
    };
    Ok(output)
}

fn outcome_json<T: Serialize>(outcome: Result<T, CallError>) -> Value {
    match outcome {
        Ok(value) => json!({ "ok": value }),
        Err(err) => json!({ "error": err.to_string() }),
    }
}

fn outcomes_json<T: Serialize>(outcomes: Vec<Result<T, CallError>>) -> Value {
    Value::Array(outcomes.into_iter().map(outcome_json).collect())
}
