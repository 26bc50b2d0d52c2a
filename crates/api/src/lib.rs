//! Read-only aggregation HTTP surface over the launchpad SDK.
//!
//! Four endpoint groups, all GET (anything else is a 405), all CORS-open,
//! all validating address-shaped path parameters strictly:
//!
//! * `/tokens` - full discovered catalog
//! * `/fees/{token}` - curve fee totals, zeroed when unreachable
//! * `/graduated-tokens/{tokenAddress}` - enriched record, 404 if not graduated
//! * `/users/{address}`, `/users/canCreateToken/{address}` - permission flags

pub mod args;
mod routes;

use std::{sync::Arc, time::Duration};

use alloy::{
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::RpcClient,
    transports::layers::{RetryBackoffLayer, ThrottleLayer},
};
use anyhow::Context;
use launchpad_sdk::{Chain, catalog::TokenCatalog, indexer::ExplorerClient, num::Converter};

use crate::args::Args;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) chain: Chain,
    pub(crate) provider: DynProvider,
    pub(crate) catalog: Arc<TokenCatalog<DynProvider>>,
    pub(crate) converter: Converter,
}

pub async fn run(args: Args) -> anyhow::Result<()> {
    let client = if args.rpc == args::DEFAULT_RPC_PROVIDER || args.rpc_throttle.is_some() {
        RpcClient::builder()
            .layer(ThrottleLayer::new(args.rpc_throttle.unwrap_or(args::DEFAULT_RPC_THROTTLING)))
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(&args.rpc)
            .await
            .context("connecting to RPC")?
    } else {
        RpcClient::builder()
            .layer(RetryBackoffLayer::new(10, 100, 200))
            .connect(&args.rpc)
            .await
            .context("connecting to RPC")?
    };
    client.set_poll_interval(Duration::from_millis(100));
    let provider = ProviderBuilder::new().connect_client(client).erased();

    let testnet = Chain::testnet();
    let chain = Chain::custom(
        provider.get_chain_id().await.context("reading chain id")?,
        args.factory.unwrap_or(testnet.factory()),
        args.curve.unwrap_or(testnet.curve()),
        args.graduation_registry.unwrap_or(testnet.graduation_registry()),
        args.access_registry.unwrap_or(testnet.access_registry()),
        testnet.deployed_at_block(),
    );

    let catalog =
        TokenCatalog::new(&chain, provider.clone(), ExplorerClient::new(&args.explorer));
    let state = AppState {
        chain,
        provider,
        catalog: Arc::new(catalog),
        converter: Converter::amounts(),
    };

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    tracing::info!(bind = %args.bind, "serving aggregation API");

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.expect("failed to install CTRL+C signal handler");
        })
        .await
        .context("serving")?;

    Ok(())
}
