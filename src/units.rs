//! Exact conversions between human-readable decimal quantities and the
//! integer units the contracts consume. Conversions that would lose
//! precision are rejected rather than rounded.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

pub const FEE_SCALE_BPS: u32 = 10_000;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UnitsError {
    #[error("value {0} is negative")]
    Negative(Decimal),
    #[error("value {value} has more than {decimals} fractional digits")]
    PrecisionLoss { value: Decimal, decimals: u32 },
    #[error("percentage {0} is outside 0..=100")]
    PercentageOutOfRange(Decimal),
    #[error("percentage {0} is not a whole number of basis points")]
    SubBasisPoint(Decimal),
}

/// Converts a decimal token quantity to base units (`value * 10^decimals`),
/// failing if the value carries more fractional digits than the token does.
pub fn to_base_units(value: Decimal, decimals: u32) -> Result<U256, UnitsError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(UnitsError::Negative(value));
    }
    let value = value.normalize();
    if value.scale() > decimals {
        return Err(UnitsError::PrecisionLoss { value, decimals });
    }
    let mantissa = value
        .mantissa()
        .to_u128()
        .ok_or(UnitsError::Negative(value))?;
    let factor = U256::from(10u8).pow(U256::from(decimals - value.scale()));
    Ok(U256::from(mantissa) * factor)
}

/// Renders a base-unit quantity back as a decimal string, trimming
/// trailing zeros. Used when mirroring amounts into the metadata store.
pub fn from_base_units(value: U256, decimals: u32) -> String {
    let raw = value.to_string();
    let decimals = decimals as usize;
    let padded = if raw.len() <= decimals {
        format!("0{}{raw}", "0".repeat(decimals - raw.len()))
    } else {
        raw
    };
    let (int, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        int.to_string()
    } else {
        format!("{int}.{frac}")
    }
}

/// Converts a fee or withdrawal percentage to basis points. The contracts
/// cannot represent fractions of a basis point, so anything finer than
/// 0.01% is rejected.
pub fn percentage_to_bps(percentage: Decimal) -> Result<u32, UnitsError> {
    if percentage.is_sign_negative() || percentage > Decimal::from(100) {
        return Err(UnitsError::PercentageOutOfRange(percentage));
    }
    let scaled = (percentage * Decimal::from(100)).normalize();
    if scaled.scale() != 0 {
        return Err(UnitsError::SubBasisPoint(percentage));
    }
    scaled
        .to_u32()
        .ok_or(UnitsError::PercentageOutOfRange(percentage))
}

/// Inverse of [`percentage_to_bps`], used when writing fees back to the
/// metadata store in the same shape the protocol frontend records them.
pub fn bps_to_percentage(bps: u32) -> Decimal {
    (Decimal::from(bps) / Decimal::from(100)).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn whole_ether_to_base_units() {
        assert_eq!(
            to_base_units(dec!(1), 18).unwrap(),
            U256::from(10u8).pow(U256::from(18u8))
        );
    }

    #[test]
    fn fractional_amount_is_exact() {
        assert_eq!(
            to_base_units(dec!(0.1), 18).unwrap(),
            U256::from(100_000_000_000_000_000u64)
        );
    }

    #[test]
    fn rejects_negative_amount() {
        assert!(matches!(
            to_base_units(dec!(-1), 18),
            Err(UnitsError::Negative(_))
        ));
    }

    #[test]
    fn rejects_precision_beyond_token_decimals() {
        assert!(matches!(
            to_base_units(dec!(0.123), 2),
            Err(UnitsError::PrecisionLoss { .. })
        ));
    }

    #[test]
    fn base_units_render_round_trips() {
        let wei = to_base_units(dec!(0.25), 18).unwrap();
        assert_eq!(from_base_units(wei, 18), "0.25");
        assert_eq!(from_base_units(U256::ZERO, 18), "0");
        assert_eq!(from_base_units(U256::from(1u8), 18), "0.000000000000000001");
    }

    #[test]
    fn percentage_round_trips_through_bps() {
        for pct in [dec!(0), dec!(0.01), dec!(2), dec!(2.5), dec!(100)] {
            let bps = percentage_to_bps(pct).unwrap();
            assert_eq!(bps_to_percentage(bps), pct.normalize());
        }
    }

    #[test]
    fn two_percent_is_200_bps() {
        assert_eq!(percentage_to_bps(dec!(2)).unwrap(), 200);
        assert_eq!(percentage_to_bps(dec!(100)).unwrap(), FEE_SCALE_BPS);
    }

    #[test]
    fn rejects_sub_basis_point_percentage() {
        assert_eq!(
            percentage_to_bps(dec!(0.005)),
            Err(UnitsError::SubBasisPoint(dec!(0.005)))
        );
    }

    #[test]
    fn rejects_percentage_above_hundred() {
        assert!(matches!(
            percentage_to_bps(dec!(100.01)),
            Err(UnitsError::PercentageOutOfRange(_))
        ));
    }
}
