//! Break-even (payback) year detection.
//!
//! The break-even year is the first year in which the cumulative net flow
//! moves from non-positive to strictly positive. Only the first crossing
//! counts: a project that dips back below zero later keeps its first
//! break-even year.

use rust_decimal::Decimal;
use tracing::warn;

use super::common::cumulative_sums;

/// Returns the index of the first year whose cumulative flow crosses from
/// `<= 0` to `> 0`, or `None` if that never happens within the horizon.
///
/// The cumulative total starts at zero, so a positive first flow makes year 0
/// the break-even year.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use solar_core::calculations::break_even::locate;
///
/// assert_eq!(locate(&[dec!(-100), dec!(-20), dec!(150), dec!(10)]), Some(2));
/// assert_eq!(locate(&[dec!(-50), dec!(-50), dec!(-50)]), None);
/// ```
pub fn locate(flows: &[Decimal]) -> Option<usize> {
    // Totals before the first positive one are all <= 0, so that year is the
    // first crossing.
    cumulative_sums(flows)
        .iter()
        .position(|total| *total > Decimal::ZERO)
}

/// Outcome of comparing the locally located break-even year with the
/// payback year the backend reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agreement {
    Match,
    Mismatch {
        local: Option<usize>,
        backend: Option<Decimal>,
    },
}

/// Cross-checks the backend's payback year against the flows it sent.
///
/// The client cannot verify how the backend composed a scenario, but it can
/// verify that the payback it reports is consistent with the flows of that
/// same scenario. Disagreements are logged and returned; they never alter
/// what is displayed.
pub fn reconcile(
    flows: &[Decimal],
    backend_payback: Option<Decimal>,
) -> Agreement {
    let local = locate(flows);
    let agrees = match (local, backend_payback) {
        (None, None) => true,
        (Some(year), Some(payback)) => Decimal::from(year) == payback,
        _ => false,
    };

    if agrees {
        Agreement::Match
    } else {
        warn!(?local, ?backend_payback, "backend payback disagrees with its own flows");
        Agreement::Mismatch {
            local,
            backend: backend_payback,
        }
    }
}
