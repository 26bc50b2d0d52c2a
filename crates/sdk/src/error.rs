use std::time::Duration;

use alloy::primitives::{Address, TxHash};
use thiserror::Error;

/// Errors surfaced across the SDK's public boundary.
///
/// Expected-degraded conditions (explorer unavailable, registry read failing,
/// price sources exhausted) are not errors: the affected component returns a
/// typed zero/empty result instead. Only conditions the caller has to act on
/// appear here.
#[derive(Error, Debug)]
pub enum LaunchpadError {
    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),

    #[error("transport error: {0}")]
    Transport(#[from] alloy::transports::TransportError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A write call returned something that is not a well-formed transaction
    /// hash. The submission is treated as failed rather than waited on.
    #[error("malformed transaction hash: {0:?}")]
    MalformedHash(String),

    /// Curve state for the token was never initialized.
    #[error("no curve data available for {0}")]
    NoCurveData(Address),

    /// The live allowance stayed below the requested sell amount even after
    /// the chained approval confirmed.
    #[error("insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: String, need: String },

    /// No terminal state within the confirmation window. The underlying
    /// transaction may still land later.
    #[error("no confirmation within {0:?}")]
    ConfirmationTimeout(Duration),

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    /// The signer declined the transaction. Low severity: this is a user
    /// decision, not a failure.
    #[error("rejected by signer")]
    Rejected,
}

impl LaunchpadError {
    /// Signals that should not be rendered as failures.
    pub fn is_user_rejection(&self) -> bool { matches!(self, LaunchpadError::Rejected) }
}
