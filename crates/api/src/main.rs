use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "launchpad_api=info,launchpad_sdk=info".into()),
        )
        .init();

    if let Err(err) = launchpad_api::run(launchpad_api::args::Args::parse()).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
