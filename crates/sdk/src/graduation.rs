//! Graduation progress and state reconciliation.
//!
//! Two independent contracts carry a graduation signal: the curve's own
//! `graduated` flag and the graduation registry. Their commits are not
//! atomic, so the two can transiently disagree; either reporting `true` is
//! treated as authoritative, and a `true` observation is latched for the
//! session so the reported state never moves backwards.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
};
use dashmap::DashMap;

use crate::{Chain, abi::GraduationRegistry, state::CurveState};

/// Quote-asset amount that triggers graduation, in raw fixed-point units
/// (10,000 whole units).
pub fn graduation_threshold() -> U256 { U256::from(10u128.pow(22)) }

/// Progress toward the graduation threshold, clamped to 0..=100.
///
/// Derived from quote asset raised only; that is the contract's actual
/// graduation trigger. Never derived from supply.
pub fn progress_percent(reserves_in: U256) -> u8 {
    let percent = reserves_in.saturating_mul(U256::from(100u8)) / graduation_threshold();
    percent.min(U256::from(100u8)).to::<u8>()
}

/// Aggregated graduation view of a token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraduationStatus {
    can_graduate: bool,
    progress_percent: u8,
    is_graduated: bool,
}

impl GraduationStatus {
    /// Graduation is a one-time transition: a graduated token is never also
    /// awaiting graduation, whatever the registry read said.
    pub fn new(can_graduate: bool, progress_percent: u8, is_graduated: bool) -> Self {
        Self { can_graduate: can_graduate && !is_graduated, progress_percent, is_graduated }
    }

    /// Threshold met but graduation not yet executed.
    pub fn can_graduate(&self) -> bool { self.can_graduate }

    pub fn progress_percent(&self) -> u8 { self.progress_percent }

    pub fn is_graduated(&self) -> bool { self.is_graduated }
}

/// Session latch over per-token graduation observations.
#[derive(Debug, Default)]
pub(crate) struct GraduationLatch(DashMap<Address, ()>);

impl GraduationLatch {
    /// Merges the two signals and latches the result: once a token has been
    /// observed graduated it stays graduated for the rest of the session.
    pub(crate) fn observe(&self, token: Address, curve_flag: bool, registry_flag: bool) -> bool {
        if curve_flag || registry_flag {
            self.0.insert(token, ());
        }
        self.0.contains_key(&token)
    }
}

/// Tracks graduation state per token.
///
/// Registry reads degrade to `false` instead of erroring: a missing answer
/// is a stale negative at worst, and the curve flag still gates.
pub struct GraduationTracker<P> {
    chain: Chain,
    provider: P,
    latch: GraduationLatch,
}

impl<P: Provider> GraduationTracker<P> {
    pub fn new(chain: &Chain, provider: P) -> Self {
        Self { chain: chain.clone(), provider, latch: GraduationLatch::default() }
    }

    /// Current graduation status of `token`, reconciled with the given curve
    /// state (pass `None` when the curve was never initialized).
    pub async fn status(&self, token: Address, curve: Option<&CurveState>) -> GraduationStatus {
        let registry = GraduationRegistry::new(self.chain.graduation_registry(), &self.provider);
        let registry_flag = registry
            .isGraduated(token)
            .call()
            .await
            .inspect_err(|err| tracing::debug!(%token, %err, "graduation registry read failed"))
            .unwrap_or(false);
        let curve_flag = curve.is_some_and(|state| state.graduated());
        let is_graduated = self.latch.observe(token, curve_flag, registry_flag);

        let can_graduate = if is_graduated {
            false
        } else {
            registry
                .checkGraduation(token)
                .call()
                .await
                .inspect_err(|err| tracing::debug!(%token, %err, "graduation check failed"))
                .unwrap_or(false)
        };

        let progress_percent =
            curve.map(|state| progress_percent(state.reserves_in_raw())).unwrap_or(0);
        GraduationStatus::new(can_graduate, progress_percent, is_graduated)
    }
}
