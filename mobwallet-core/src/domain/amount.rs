//! Conversion between picoMOB (ledger integer unit) and MOB (display unit)

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::result::{Error, Result};

/// Number of decimal places between MOB and picoMOB (1 MOB = 10^12 picoMOB)
pub const PMOB_SCALE: u32 = 12;

/// Convert an integer picoMOB amount to MOB
pub fn pmob_to_mob(pmob: u64) -> Decimal {
    Decimal::from_i128_with_scale(pmob as i128, PMOB_SCALE).normalize()
}

/// Convert a MOB amount to integer picoMOB
///
/// Fails for negative amounts, amounts finer than one picoMOB, and
/// amounts that do not fit in a `u64`.
pub fn mob_to_pmob(mob: Decimal) -> Result<u64> {
    if mob.is_sign_negative() && !mob.is_zero() {
        return Err(Error::validation(format!("Amount cannot be negative: {}", mob)));
    }

    let mob = mob.normalize();
    if mob.scale() > PMOB_SCALE {
        return Err(Error::validation(format!(
            "Amount {} has more than {} decimal places",
            mob, PMOB_SCALE
        )));
    }

    let mantissa = mob.mantissa();
    let pmob = mantissa
        .checked_mul(10i128.pow(PMOB_SCALE - mob.scale()))
        .ok_or_else(|| Error::validation(format!("Amount is too large: {}", mob)))?;

    pmob.to_u64()
        .ok_or_else(|| Error::validation(format!("Amount is too large: {}", mob)))
}

/// Parse a user-entered MOB amount ("0.1", "12", "1.000000000001")
pub fn parse_mob(input: &str) -> Result<Decimal> {
    input
        .trim()
        .parse::<Decimal>()
        .map_err(|_| Error::validation(format!("Invalid amount: {}", input)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_pmob_to_mob() {
        assert_eq!(pmob_to_mob(100_000_000_000), Decimal::from_str("0.1").unwrap());
        assert_eq!(pmob_to_mob(1_000_000_000_000), Decimal::ONE);
        assert_eq!(pmob_to_mob(1), Decimal::from_str("0.000000000001").unwrap());
        assert_eq!(pmob_to_mob(0), Decimal::ZERO);
    }

    #[test]
    fn test_mob_to_pmob() {
        assert_eq!(mob_to_pmob(Decimal::from_str("0.1").unwrap()).unwrap(), 100_000_000_000);
        assert_eq!(mob_to_pmob(Decimal::from_str("0.09").unwrap()).unwrap(), 90_000_000_000);
        assert_eq!(mob_to_pmob(Decimal::from(3)).unwrap(), 3_000_000_000_000);
        assert_eq!(mob_to_pmob(Decimal::from_str("0.100000000000").unwrap()).unwrap(), 100_000_000_000);
    }

    #[test]
    fn test_round_trip_from_pmob() {
        for n in [0u64, 1, 7, 999_999_999_999, 1_000_000_000_001, 123_456_789_012_345, u64::MAX] {
            assert_eq!(mob_to_pmob(pmob_to_mob(n)).unwrap(), n);
        }
    }

    #[test]
    fn test_round_trip_from_mob() {
        for s in ["0", "0.1", "12.5", "0.000000000001", "1000000.123456789012"] {
            let mob = Decimal::from_str(s).unwrap();
            assert_eq!(pmob_to_mob(mob_to_pmob(mob).unwrap()), mob.normalize());
        }
    }

    #[test]
    fn test_rejects_sub_pmob_precision() {
        let result = mob_to_pmob(Decimal::from_str("0.0000000000001").unwrap());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_negative() {
        let result = mob_to_pmob(Decimal::from_str("-1").unwrap());
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_overflow() {
        let result = mob_to_pmob(Decimal::from(20_000_000u64));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_parse_mob() {
        assert_eq!(parse_mob(" 0.25 ").unwrap(), Decimal::from_str("0.25").unwrap());
        assert!(parse_mob("abc").is_err());
    }
}
