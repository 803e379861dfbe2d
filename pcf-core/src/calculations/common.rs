//! Rounding helpers shared by result presentation.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use pcf_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(2.454)), dec!(2.45));
/// assert_eq!(round_half_up(dec!(2.455)), dec!(2.46));
/// assert_eq!(round_half_up(dec!(-2.455)), dec!(-2.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Share of `part` in `total` as a percentage rounded to two places.
///
/// Returns zero when `total` is zero or negative.
///
/// ```
/// use rust_decimal_macros::dec;
/// use pcf_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(1), dec!(3)), dec!(33.33));
/// assert_eq!(percent_of(dec!(5), dec!(0)), dec!(0));
/// ```
pub fn percent_of(
    part: Decimal,
    total: Decimal,
) -> Decimal {
    if total <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_half_up(part * Decimal::ONE_HUNDRED / total)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(12.344)), dec!(12.34));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(12.345)), dec!(12.35));
    }

    #[test]
    fn round_half_up_preserves_already_rounded_values() {
        assert_eq!(round_half_up(dec!(0.50)), dec!(0.50));
    }

    // =========================================================================
    // percent_of tests
    // =========================================================================

    #[test]
    fn percent_of_whole_is_one_hundred() {
        assert_eq!(percent_of(dec!(2.5), dec!(2.5)), dec!(100));
    }

    #[test]
    fn percent_of_rounds_to_two_places() {
        assert_eq!(percent_of(dec!(2), dec!(3)), dec!(66.67));
    }

    #[test]
    fn percent_of_zero_total_is_zero() {
        assert_eq!(percent_of(dec!(1), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn percent_of_negative_total_is_zero() {
        assert_eq!(percent_of(dec!(1), dec!(-4)), Decimal::ZERO);
    }
}
