use clap::Parser;

#[tokio::main]
async fn main() {
    if let Err(err) = launchpad_cli::run(launchpad_cli::args::Cli::parse()).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
