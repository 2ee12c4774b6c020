//! Shared helpers for the cash-flow calculations.

use rust_decimal::Decimal;

/// Rounds a decimal value to `dp` decimal places using half-up rounding.
///
/// Values at exactly the midpoint are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use solar_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.455), 2), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-0.5), 0), dec!(-1));
/// ```
pub fn round_half_up(
    value: Decimal,
    dp: u32,
) -> Decimal {
    value.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Running totals of `flows`: element `i` is the sum of `flows[0..=i]`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use solar_core::calculations::common::cumulative_sums;
///
/// assert_eq!(
///     cumulative_sums(&[dec!(-100), dec!(-20), dec!(150)]),
///     vec![dec!(-100), dec!(-120), dec!(30)]
/// );
/// ```
pub fn cumulative_sums(flows: &[Decimal]) -> Vec<Decimal> {
    flows
        .iter()
        .scan(Decimal::ZERO, |total, flow| {
            *total += *flow;
            Some(*total)
        })
        .collect()
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
        assert_eq!(round_half_up(dec!(123.454), 2), dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455), 2), dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        assert_eq!(round_half_up(dec!(-123.455), 2), dec!(-123.46)); // Away from zero
    }

    #[test]
    fn round_half_up_to_whole_pesos() {
        assert_eq!(round_half_up(dec!(1999999.5), 0), dec!(2000000));
    }

    // =========================================================================
    // cumulative_sums tests
    // =========================================================================

    #[test]
    fn cumulative_sums_of_empty_is_empty() {
        assert!(cumulative_sums(&[]).is_empty());
    }

    #[test]
    fn cumulative_sums_first_element_is_first_flow() {
        let sums = cumulative_sums(&[dec!(100), dec!(-50), dec!(30)]);

        assert_eq!(sums, vec![dec!(100), dec!(50), dec!(80)]);
    }
}
