//! Token launchpad client SDK.
//!
//! # Overview
//!
//! Client-side view of an on-chain token launchpad: tokens trade against a
//! bonding curve until enough of the quote asset is raised, then graduate to
//! an external DEX with locked liquidity. This crate reads and reconciles
//! that contract state; the financial logic itself lives on chain.
//!
//! Use [`catalog::TokenCatalog`] to discover and enrich the full token set
//! (factory enumeration merged with explorer-observed creations), and
//! [`catalog::TokenCatalog::updates`] to keep it refreshed on a fixed poll.
//!
//! Use [`price::CurvePricer`] and [`graduation::GraduationTracker`] for
//! per-token pricing and graduation progress, and [`lifecycle::Trader`] to
//! submit state-changing calls (buy/sell/approve/graduate) through a
//! [`lifecycle::WalletGateway`] and track them to confirmation.
//!
//! See `./tests` for examples.
//!
//! # Limitations/follow-ups
//!
//! * Discovery relies on factory enumeration plus explorer polling. Future
//!   versions could cut latency by decoding factory creation logs directly.
//!
//! * Read-after-write consistency is reconciled with scheduled refetches
//!   rather than receipt-anchored block reads.
//!
//! # Features
//!
//! | Feature | Default | Description |
//! | --- | --- | --- |
//! | `display` | yes | Enables [`std::fmt::Display`] implementation for catalog types. |
//! | `testing` | yes | Enables [`testing`] module. |

pub mod abi;
pub mod catalog;
pub mod error;
pub mod graduation;
pub mod indexer;
pub mod lifecycle;
pub mod num;
pub mod price;
pub mod state;
#[cfg(any(feature = "testing", test))]
pub mod testing;
pub mod types;

use alloy::primitives::{Address, address};

#[derive(Clone, Debug)]
/// Chain the launchpad is deployed on.
///
/// Explicitly constructed and passed to every component; there is no
/// process-global chain target.
pub struct Chain {
    chain_id: u64,
    factory: Address,
    curve: Address,
    graduation_registry: Address,
    access_registry: Address,
    deployed_at_block: u64,
}

impl Chain {
    pub fn testnet() -> Self {
        Self {
            chain_id: 10143,
            factory: address!("0x6f40a8bd832d0b824c24303cdc1ec42e2a1ac3b0"),
            curve: address!("0x92d7c62e4b2542a1b3d1e0c8fc6c36a395a0cf9e"),
            graduation_registry: address!("0x41c3f7f2241c11e4d594436b0b56c9e3a74260f1"),
            access_registry: address!("0xb04cc64fbbabd6f62e8f3e9cde3c6467785eac9d"),
            deployed_at_block: 18244901,
        }
    }

    pub fn custom(
        chain_id: u64,
        factory: Address,
        curve: Address,
        graduation_registry: Address,
        access_registry: Address,
        deployed_at_block: u64,
    ) -> Self {
        Self { chain_id, factory, curve, graduation_registry, access_registry, deployed_at_block }
    }

    pub fn chain_id(&self) -> u64 { self.chain_id }

    /// Token factory contract.
    pub fn factory(&self) -> Address { self.factory }

    /// Bonding curve contract all launched tokens trade against.
    pub fn curve(&self) -> Address { self.curve }

    /// Registry holding the graduation flag and DEX pair per token.
    pub fn graduation_registry(&self) -> Address { self.graduation_registry }

    /// Registry of per-user permissions.
    pub fn access_registry(&self) -> Address { self.access_registry }

    pub fn deployed_at_block(&self) -> u64 { self.deployed_at_block }
}
