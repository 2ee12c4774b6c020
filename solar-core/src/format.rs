//! Colombian-peso and es-CO number formatting shared by every renderer.
//!
//! Grouping follows the es-CO locale: `.` separates thousands, `,` is the
//! decimal mark, and numbers with four or fewer integer digits are left
//! ungrouped. At most two fraction digits are shown and trailing zeros are
//! dropped.

use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;

/// Placeholder for a value that does not exist, such as a missing payback year.
pub const MISSING: &str = "—";

const MAX_FRACTION_DIGITS: u32 = 2;
const MIN_GROUPING_DIGITS: usize = 5;

/// Formats an amount of pesos, e.g. `$ 83.000.000` or `-$ 1.500.000,25`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use solar_core::format::format_cop;
///
/// assert_eq!(format_cop(dec!(83000000)), "$ 83.000.000");
/// assert_eq!(format_cop(dec!(-1500000.254)), "-$ 1.500.000,25");
/// ```
pub fn format_cop(value: Decimal) -> String {
    let (negative, body) = localized(value);
    if negative { format!("-$ {body}") } else { format!("$ {body}") }
}

/// Formats a plain number in the es-CO style with up to two decimals.
pub fn format_number(value: Decimal) -> String {
    let (negative, body) = localized(value);
    if negative { format!("-{body}") } else { body }
}

/// Internal rate of return, already a percentage: `12,1%`.
pub fn format_percent(value: Option<Decimal>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{}%", format_number(v)))
}

/// Payback year count: `7 años`.
pub fn format_years(value: Option<Decimal>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{} años", v.normalize()))
}

/// Like [`format_cop`] but renders `None` as [`MISSING`].
pub fn format_optional_cop(value: Option<Decimal>) -> String {
    value.map_or_else(|| MISSING.to_string(), format_cop)
}

/// Unformatted value as the backend sent it (years and energy columns).
pub fn format_plain(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Returns the sign and the grouped absolute value.
fn localized(value: Decimal) -> (bool, String) {
    let rounded = round_half_up(value, MAX_FRACTION_DIGITS).normalize();
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut body = group_thousands(int_part);
    if let Some(frac) = frac_part {
        body.push(',');
        body.push_str(frac);
    }
    (negative, body)
}

fn group_thousands(digits: &str) -> String {
    if digits.len() < MIN_GROUPING_DIGITS {
        return digits.to_string();
    }

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn cop_groups_thousands_with_dots() {
        assert_eq!(format_cop(dec!(83000000)), "$ 83.000.000");
        assert_eq!(format_cop(dec!(12345)), "$ 12.345");
        assert_eq!(format_cop(dec!(123456789012)), "$ 123.456.789.012");
    }

    #[test]
    fn four_digit_amounts_are_not_grouped() {
        assert_eq!(format_cop(dec!(1045)), "$ 1045");
        assert_eq!(format_cop(dec!(830)), "$ 830");
    }

    #[test]
    fn cop_keeps_at_most_two_decimals_without_trailing_zeros() {
        assert_eq!(format_cop(dec!(1045.50)), "$ 1045,5");
        assert_eq!(format_cop(dec!(2185454.456)), "$ 2.185.454,46");
        assert_eq!(format_cop(dec!(10000.001)), "$ 10.000");
    }

    #[test]
    fn negative_amounts_put_sign_before_symbol() {
        assert_eq!(format_cop(dec!(-83000000)), "-$ 83.000.000");
        assert_eq!(format_cop(dec!(-0.001)), "$ 0");
    }

    #[test]
    fn zero_is_plain_zero() {
        assert_eq!(format_cop(Decimal::ZERO), "$ 0");
    }

    #[test]
    fn indicator_formatting() {
        assert_eq!(format_percent(Some(dec!(12.1))), "12,1%");
        assert_eq!(format_percent(None), MISSING);
        assert_eq!(format_years(Some(dec!(7))), "7 años");
        assert_eq!(format_years(None), MISSING);
        assert_eq!(format_optional_cop(Some(dec!(-1500000.25))), "-$ 1.500.000,25");
    }

    #[test]
    fn plain_values_are_untouched() {
        assert_eq!(format_plain(dec!(35460.00)), "35460");
        assert_eq!(format_plain(dec!(3)), "3");
        assert_eq!(format_plain(dec!(35460.5)), "35460.5");
    }
}
