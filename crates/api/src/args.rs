use alloy::primitives::Address;
use clap::Parser;

pub(crate) const DEFAULT_RPC_PROVIDER: &str = "https://testnet-rpc.monad.xyz";
pub(crate) const DEFAULT_RPC_THROTTLING: u32 = 15;
pub(crate) const DEFAULT_EXPLORER_URL: &str = "https://testnet.monadexplorer.com/api/v2";
pub(crate) const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Parser, Debug)]
#[command(name = "launchpad-api", version, about, long_about = None)]
pub struct Args {
    /// Address to serve the API on
    #[arg(long, default_value_t = DEFAULT_BIND_ADDR.to_string())]
    pub bind: String,

    /// RPC endpoint to connect to
    #[arg(long, default_value_t = DEFAULT_RPC_PROVIDER.to_string())]
    pub rpc: String,

    /// RPC throttling (req/sec) [default: 15 for default RPC provider and
    /// none for custom]
    #[arg(long)]
    pub rpc_throttle: Option<u32>,

    /// Block-explorer API base URL
    #[arg(long, default_value_t = DEFAULT_EXPLORER_URL.to_string())]
    pub explorer: String,

    /// Token factory contract address [default: testnet factory]
    #[arg(long)]
    pub factory: Option<Address>,

    /// Bonding curve contract address [default: testnet curve]
    #[arg(long)]
    pub curve: Option<Address>,

    /// Graduation registry contract address [default: testnet registry]
    #[arg(long)]
    pub graduation_registry: Option<Address>,

    /// Access registry contract address [default: testnet registry]
    #[arg(long)]
    pub access_registry: Option<Address>,
}
