pub mod args;
mod price;
mod tokens;
mod watch;

use std::time::Duration;

use alloy::{
    providers::{Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::layers::{RetryBackoffLayer, ThrottleLayer},
};
use anyhow::Context;
use args::Cli;
use launchpad_sdk::{Chain, catalog::TokenCatalog, indexer::ExplorerClient};
use tokio_util::sync::CancellationToken;

use crate::args::Commands;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = if cli.rpc == args::DEFAULT_RPC_PROVIDER || cli.rpc_throttle.is_some() {
        // Apply throttling with default RPC
        RpcClient::builder()
            .layer(ThrottleLayer::new(cli.rpc_throttle.unwrap_or(args::DEFAULT_RPC_THROTTLING)))
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(&cli.rpc)
            .await
            .context("connecting to RPC")?
    } else {
        RpcClient::builder()
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(&cli.rpc)
            .await
            .context("connecting to RPC")?
    };
    client.set_poll_interval(Duration::from_millis(100));
    let provider = ProviderBuilder::new().connect_client(client);

    let testnet = Chain::testnet();
    let chain = Chain::custom(
        provider.get_chain_id().await?,
        cli.factory.unwrap_or(testnet.factory()),
        cli.curve.unwrap_or(testnet.curve()),
        cli.graduation_registry.unwrap_or(testnet.graduation_registry()),
        cli.access_registry.unwrap_or(testnet.access_registry()),
        testnet.deployed_at_block(),
    );

    let catalog = TokenCatalog::new(&chain, provider.clone(), ExplorerClient::new(&cli.explorer));

    let cancellation_signal = CancellationToken::new();
    let cancellation_token = cancellation_signal.child_token();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C signal handler");
        cancellation_signal.cancel();
    });

    match &cli.command {
        Commands::Tokens => tokens::render(&catalog).await?,
        Commands::Price { token } => price::render(&catalog, *token).await?,
        Commands::Watch { num_polls } => {
            watch::render(&catalog, *num_polls, cancellation_token).await?
        },
    }

    Ok(())
}
