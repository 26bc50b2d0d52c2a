use alloy::primitives::Address;
use clap::{Parser, Subcommand};

pub(crate) const DEFAULT_RPC_PROVIDER: &str = "https://testnet-rpc.monad.xyz";
pub(crate) const DEFAULT_RPC_THROTTLING: u32 = 15;
pub(crate) const DEFAULT_EXPLORER_URL: &str = "https://testnet.monadexplorer.com/api/v2";

#[derive(Parser, Debug)]
#[command(name = "launchpad-cli", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// RPC endpoint to connect to
    #[arg(long, global = true, default_value_t = DEFAULT_RPC_PROVIDER.to_string())]
    pub rpc: String,

    /// RPC throttling (req/sec) [default: 15 for default RPC provider and
    /// none for custom]
    #[arg(long, global = true)]
    pub rpc_throttle: Option<u32>,

    /// Block-explorer API base URL
    #[arg(long, global = true, default_value_t = DEFAULT_EXPLORER_URL.to_string())]
    pub explorer: String,

    /// Token factory contract address [default: testnet factory]
    #[arg(long, global = true)]
    pub factory: Option<Address>,

    /// Bonding curve contract address [default: testnet curve]
    #[arg(long, global = true)]
    pub curve: Option<Address>,

    /// Graduation registry contract address [default: testnet registry]
    #[arg(long, global = true)]
    pub graduation_registry: Option<Address>,

    /// Access registry contract address [default: testnet registry]
    #[arg(long, global = true)]
    pub access_registry: Option<Address>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover and list all launched tokens with price and progress
    Tokens,
    /// Show price and graduation state of one token
    Price {
        /// Token address
        token: Address,
    },
    /// Poll the catalog and render every refresh, until terminated (Ctrl+C)
    Watch {
        /// Number of refreshes to render [default: unlimited]
        #[arg(long)]
        num_polls: Option<u64>,
    },
}
