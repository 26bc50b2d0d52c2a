//! Fixed-point <-> decimal number conversion.
//!
//! On-chain amounts are unsigned integers scaled by a fixed number of
//! decimal places. All curve math stays in [`U256`]; decimals exist for
//! presentation and request construction only.

use alloy::primitives::U256;
use fastnum::UD256;

/// Decimal places of the quote asset and of every launched token.
pub const AMOUNT_DECIMALS: u8 = 18;

/// Converter of fixed-point <-> decimal numbers for a given number of
/// decimal places.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Converter {
    decimals: u8,
}

impl Converter {
    pub fn new(decimals: u8) -> Self { Self { decimals } }

    /// Converter for quote-asset and token amounts.
    pub fn amounts() -> Self { Self::new(AMOUNT_DECIMALS) }

    pub fn decimals(&self) -> u8 { self.decimals }

    /// Decimal value of a raw fixed-point integer.
    pub fn from_unsigned<T: Into<U256>>(&self, value: T) -> UD256 {
        let digits: UD256 = value
            .into()
            .to_string()
            .parse()
            .expect("unsigned integer is a valid decimal");
        digits / pow10(self.decimals)
    }

    /// Raw fixed-point integer of a decimal value.
    /// Precision beyond the configured decimal places is truncated.
    pub fn to_unsigned(&self, value: UD256) -> U256 {
        let repr = plain_string(value * pow10(self.decimals));
        let integral = repr.split('.').next().unwrap_or("0");
        U256::from_str_radix(integral, 10).unwrap_or(U256::ZERO)
    }
}

fn pow10(decimals: u8) -> UD256 {
    let mut literal = String::with_capacity(decimals as usize + 1);
    literal.push('1');
    for _ in 0..decimals {
        literal.push('0');
    }
    literal.parse().expect("valid decimal literal")
}

/// Plain fixed-point rendering of a decimal, expanding any exponent notation
/// the inner representation would otherwise produce.
pub fn plain_string(value: UD256) -> String {
    let repr = value.to_string();
    match repr.split_once(['e', 'E']) {
        None => repr,
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            expand(mantissa, exponent)
        },
    }
}

fn expand(mantissa: &str, exponent: i32) -> String {
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{int_part}{frac_part}");
    // Decimal point position within `digits` after applying the exponent
    let point = int_part.len() as i32 + exponent;
    if point <= 0 {
        format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), digits)
    } else if point as usize >= digits.len() {
        format!("{}{}", digits, "0".repeat(point as usize - digits.len()))
    } else {
        format!("{}.{}", &digits[..point as usize], &digits[point as usize..])
    }
}
