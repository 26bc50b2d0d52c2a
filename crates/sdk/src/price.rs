//! Token unit pricing from curve reserve data.
//!
//! The resolution ladder is deterministic and evaluated fresh on every curve
//! read:
//!
//! 1. No curve state -> [`LaunchpadError::NoCurveData`].
//! 2. Graduated curve -> zero price, no error. Trading moved to the external
//!    DEX; a zero curve price is policy, not missing data.
//! 3. Direct unit-quote call, when it answers. Preferred: it reflects the
//!    curve's exact price function including non-linear terms.
//! 4. Reserve-ratio approximation from already-fetched reserves, in integer
//!    arithmetic. Derivable even when the quote call is guarded or behind.
//! 5. Nothing usable -> zero price, no error (not yet tradable).
//!
//! # Architecture
//!
//! [`resolve`] is pure and synchronous; [`CurvePricer`] wraps it with the
//! chain reads.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
};
use fastnum::UD256;

use crate::{
    Chain,
    abi::BondingCurve,
    error::LaunchpadError,
    num::{self, Converter},
    state::CurveState,
};

/// One whole token in fixed-point units.
pub const UNIT: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Which source a unit price was derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceSource {
    /// Direct quote call against the curve.
    UnitQuote,
    /// `virtualReserveQuote / (virtualReserveToken - soldSupply)` fallback.
    ReserveRatio,
    /// Curve graduated; price is zero by definition.
    PostGraduation,
    /// No source yielded a usable number.
    Unavailable,
}

/// Price of one whole token in the quote asset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitPrice {
    price: UD256,
    source: PriceSource,
}

impl UnitPrice {
    pub(crate) fn new(price: UD256, source: PriceSource) -> Self { Self { price, source } }

    pub fn zero(source: PriceSource) -> Self { Self { price: UD256::ZERO, source } }

    pub fn price(&self) -> UD256 { self.price }

    pub fn source(&self) -> PriceSource { self.source }

    pub fn is_zero(&self) -> bool { self.price == UD256::ZERO }

    /// Plain fixed-decimal rendering, never scientific notation.
    pub fn to_plain_string(&self) -> String { num::plain_string(self.price) }
}

impl Default for UnitPrice {
    fn default() -> Self { Self::zero(PriceSource::Unavailable) }
}

/// Reserve-ratio price of one whole token, in raw fixed-point units.
///
/// Zero when the remaining virtual token reserve is exhausted; never
/// negative, never a division by zero.
pub fn reserve_ratio_price(curve: &CurveState) -> U256 {
    let remaining = curve.virtual_reserve_token_raw().saturating_sub(curve.sold_supply_raw());
    if remaining.is_zero() {
        return U256::ZERO;
    }
    curve.virtual_reserve_quote_raw().saturating_mul(UNIT) / remaining
}

/// Pure price resolution over already-fetched inputs.
pub fn resolve(
    token: Address,
    curve: Option<&CurveState>,
    unit_quote: Option<U256>,
    converter: Converter,
) -> Result<UnitPrice, LaunchpadError> {
    let Some(curve) = curve else {
        return Err(LaunchpadError::NoCurveData(token));
    };
    if curve.graduated() {
        return Ok(UnitPrice::zero(PriceSource::PostGraduation));
    }
    if let Some(quote) = unit_quote {
        return Ok(UnitPrice::new(converter.from_unsigned(quote), PriceSource::UnitQuote));
    }
    if curve.virtual_reserve_token_raw() <= curve.sold_supply_raw() {
        return Ok(UnitPrice::zero(PriceSource::Unavailable));
    }
    Ok(UnitPrice::new(
        converter.from_unsigned(reserve_ratio_price(curve)),
        PriceSource::ReserveRatio,
    ))
}

/// Derives token unit prices from curve state with the deterministic
/// fallback order documented at the module level.
pub struct CurvePricer<P> {
    chain: Chain,
    provider: P,
    converter: Converter,
}

impl<P: Provider> CurvePricer<P> {
    pub fn new(chain: &Chain, provider: P) -> Self {
        Self { chain: chain.clone(), provider, converter: Converter::amounts() }
    }

    pub fn converter(&self) -> Converter { self.converter }

    /// Current curve state of `token`; `None` when never initialized.
    pub async fn curve_state(&self, token: Address) -> Result<Option<CurveState>, LaunchpadError> {
        let curve = BondingCurve::new(self.chain.curve(), &self.provider);
        let info = curve.curveInfo(token).call().await?;
        Ok(CurveState::from_info(&info, self.converter))
    }

    /// Price resolution over an already-fetched curve state.
    ///
    /// The unit-quote call is only attempted on a live curve; a failing call
    /// degrades to the reserve-ratio fallback rather than erroring.
    pub async fn price_from_state(
        &self,
        token: Address,
        curve: Option<&CurveState>,
    ) -> Result<UnitPrice, LaunchpadError> {
        let unit_quote = match curve {
            Some(state) if !state.graduated() => {
                let instance = BondingCurve::new(self.chain.curve(), &self.provider);
                instance.buyQuote(token, UNIT).call().await.ok()
            },
            _ => None,
        };
        resolve(token, curve, unit_quote, self.converter)
    }

    /// Fresh curve read followed by price resolution.
    pub async fn unit_price(&self, token: Address) -> Result<UnitPrice, LaunchpadError> {
        let state = self.curve_state(token).await?;
        self.price_from_state(token, state.as_ref()).await
    }
}
