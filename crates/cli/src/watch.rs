use std::pin::pin;

use alloy::providers::Provider;
use colored::Colorize;
use futures::StreamExt;
use launchpad_sdk::catalog::TokenCatalog;
use tokio_util::sync::CancellationToken;

pub(crate) async fn render<P: Provider + Clone>(
    catalog: &TokenCatalog<P>,
    num_polls: Option<u64>,
    cancellation_token: CancellationToken,
) -> anyhow::Result<()> {
    let stream = catalog.updates(tokio::time::sleep);
    let mut stream = pin!(stream);

    let mut polls_left = num_polls;

    while let Some(res) = stream.next().await {
        if cancellation_token.is_cancelled() || polls_left.is_some_and(|count| count == 0) {
            break;
        }

        println!("\n{}\n", format!("{:=^100}", " Catalog Refresh ").bold().purple());
        match res {
            Ok(snapshot) => println!("{snapshot}"),
            // A failed poll is not fatal; the next tick re-derives everything
            Err(err) => println!("{}", format!("refresh failed: {err}").red()),
        }

        if let Some(ref mut count) = polls_left {
            *count -= 1;
        }
    }

    Ok(())
}
