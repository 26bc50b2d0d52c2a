use std::{fmt::Display, str::FromStr};

use alloy::primitives::TxHash;
use chrono::{DateTime, Utc};

use crate::error::LaunchpadError;

/// Instant in chain history the state/event is up to date with.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Eq, Ord, Hash, Default)]
pub struct StateInstant {
    block_number: u64,
    block_timestamp: u64,
}

impl StateInstant {
    pub fn new(block_number: u64, block_timestamp: u64) -> Self {
        Self { block_number, block_timestamp }
    }

    pub fn block_number(&self) -> u64 { self.block_number }

    pub fn block_timestamp(&self) -> u64 { self.block_timestamp }
}

impl Display for StateInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ts = DateTime::<Utc>::from_timestamp(self.block_timestamp as i64, 0)
            .unwrap_or_default()
            .format("%Y-%m-%d %H:%M:%S");
        if self.block_number > 0 {
            write!(f, "#{} @ {}", self.block_number, ts)
        } else {
            write!(f, "{}", ts)
        }
    }
}

/// Kind of a user-submitted state-changing call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxKind {
    Create,
    Buy,
    Sell,
    Approve,
    InitializeCurve,
    Graduate,
    ListOnDex,
}

impl Display for TxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TxKind::Create => write!(f, "create"),
            TxKind::Buy => write!(f, "buy"),
            TxKind::Sell => write!(f, "sell"),
            TxKind::Approve => write!(f, "approve"),
            TxKind::InitializeCurve => write!(f, "initialize curve"),
            TxKind::Graduate => write!(f, "graduate"),
            TxKind::ListOnDex => write!(f, "list on DEX"),
        }
    }
}

/// `0x` prefix plus 32 hex-encoded bytes.
pub const TX_HASH_LEN: usize = 66;

/// Parses a raw hash string returned by a write call.
///
/// A submission result that does not satisfy this predicate is never waited
/// on: a corrupt hash would have the client waiting for a confirmation that
/// cannot arrive.
pub fn parse_tx_hash(raw: &str) -> Result<TxHash, LaunchpadError> {
    let raw = raw.trim();
    if !raw.starts_with("0x") || raw.len() != TX_HASH_LEN {
        return Err(LaunchpadError::MalformedHash(raw.to_string()));
    }
    TxHash::from_str(raw).map_err(|_| LaunchpadError::MalformedHash(raw.to_string()))
}
