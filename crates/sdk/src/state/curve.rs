use alloy::primitives::U256;
use fastnum::UD256;

use super::*;
use crate::abi::BondingCurve::CurveInfo;

/// Bonding curve state of a single token.
///
/// Reserve fields are kept in raw fixed-point units; all price math runs on
/// them directly. Decimal getters are for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurveState {
    sold_supply: U256,
    reserves_in: U256,
    virtual_reserve_quote: U256,
    virtual_reserve_token: U256,
    graduated: bool,
    active: bool,
    converter: num::Converter,
}

impl CurveState {
    /// State from a raw contract read; `None` when the curve was never
    /// initialized (the contract returns a zeroed struct).
    pub(crate) fn from_info(info: &CurveInfo, converter: num::Converter) -> Option<Self> {
        if info.virtualReserveToken.is_zero() && !info.graduated {
            return None;
        }
        Some(Self {
            sold_supply: info.soldSupply,
            reserves_in: info.reservesIn,
            virtual_reserve_quote: info.virtualReserveQuote,
            virtual_reserve_token: info.virtualReserveToken,
            graduated: info.graduated,
            active: info.active,
            converter,
        })
    }

    /// Tokens sold by the curve so far. Non-decreasing while the curve is
    /// active.
    pub fn sold_supply(&self) -> UD256 { self.converter.from_unsigned(self.sold_supply) }

    /// Quote asset collected by the curve so far.
    pub fn reserves_in(&self) -> UD256 { self.converter.from_unsigned(self.reserves_in) }

    pub fn virtual_reserve_quote(&self) -> UD256 {
        self.converter.from_unsigned(self.virtual_reserve_quote)
    }

    pub fn virtual_reserve_token(&self) -> UD256 {
        self.converter.from_unsigned(self.virtual_reserve_token)
    }

    /// Terminal: transitions false -> true exactly once, never back.
    pub fn graduated(&self) -> bool { self.graduated }

    pub fn active(&self) -> bool { self.active }

    pub fn sold_supply_raw(&self) -> U256 { self.sold_supply }

    pub fn reserves_in_raw(&self) -> U256 { self.reserves_in }

    pub fn virtual_reserve_quote_raw(&self) -> U256 { self.virtual_reserve_quote }

    pub fn virtual_reserve_token_raw(&self) -> U256 { self.virtual_reserve_token }

    /// A live curve never sells past its virtual token reserve.
    pub fn is_consistent(&self) -> bool { self.sold_supply <= self.virtual_reserve_token }

    #[cfg(any(feature = "test-utils", test))]
    pub fn for_test(
        sold_supply: u128,
        reserves_in: u128,
        virtual_reserve_quote: u128,
        virtual_reserve_token: u128,
        graduated: bool,
    ) -> Self {
        Self {
            sold_supply: U256::from(sold_supply),
            reserves_in: U256::from(reserves_in),
            virtual_reserve_quote: U256::from(virtual_reserve_quote),
            virtual_reserve_token: U256::from(virtual_reserve_token),
            graduated,
            active: !graduated,
            converter: num::Converter::amounts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use fastnum::udec256;

    use super::*;

    const WAD: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn uninitialized_read_yields_none() {
        let info = CurveInfo {
            soldSupply: U256::ZERO,
            reservesIn: U256::ZERO,
            virtualReserveQuote: U256::ZERO,
            virtualReserveToken: U256::ZERO,
            graduated: false,
            active: false,
        };
        assert!(CurveState::from_info(&info, num::Converter::amounts()).is_none());
    }

    #[test]
    fn graduated_read_is_kept_even_when_zeroed() {
        let info = CurveInfo {
            soldSupply: U256::ZERO,
            reservesIn: U256::ZERO,
            virtualReserveQuote: U256::ZERO,
            virtualReserveToken: U256::ZERO,
            graduated: true,
            active: false,
        };
        let state = CurveState::from_info(&info, num::Converter::amounts()).unwrap();
        assert!(state.graduated());
    }

    #[test]
    fn decimal_getters_scale_amounts() {
        let state = CurveState::for_test(WAD / 2, 5_000 * WAD, 1_000 * WAD, 1_000_000 * WAD, false);
        assert_eq!(state.sold_supply(), udec256!(0.5));
        assert_eq!(state.reserves_in(), udec256!(5000));
        assert_eq!(state.virtual_reserve_quote(), udec256!(1000));
        assert_eq!(state.virtual_reserve_token(), udec256!(1000000));
        assert!(state.is_consistent());
    }
}
