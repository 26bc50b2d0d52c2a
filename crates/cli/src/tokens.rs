use alloy::providers::Provider;
use colored::Colorize;
use launchpad_sdk::catalog::TokenCatalog;

pub(crate) async fn render<P: Provider + Clone>(catalog: &TokenCatalog<P>) -> anyhow::Result<()> {
    let snapshot = catalog.refresh().await?;
    println!("{}\n", format!("{:#^100}", " Launchpad Tokens ").bold().purple());
    println!("{snapshot}");
    Ok(())
}
