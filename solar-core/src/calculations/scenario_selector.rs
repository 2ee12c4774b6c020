//! Picks exactly one precomputed scenario out of a [`ScenarioSet`].

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{Indicators, Scenario, ScenarioFlags, ScenarioSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The response carries no flows or no indicators for the scenario.
    #[error("result set has no data for scenario '{}'", .0.label())]
    MissingScenario(Scenario),
}

/// A borrowed view of one scenario's flows and indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedScenario<'a> {
    pub scenario: Scenario,
    pub flows: &'a [Decimal],
    pub indicators: &'a Indicators,
}

/// Selects the scenario the two toggles point at.
///
/// Never falls back to another scenario: a response missing the requested
/// one is an error, since mixing scenarios would corrupt the figures shown.
pub fn select(
    set: &ScenarioSet,
    flags: ScenarioFlags,
) -> Result<SelectedScenario<'_>, SelectionError> {
    let scenario = flags.scenario();
    let missing = || SelectionError::MissingScenario(scenario);

    Ok(SelectedScenario {
        scenario,
        flows: set.flows(scenario).ok_or_else(missing)?,
        indicators: set.indicators(scenario).ok_or_else(missing)?,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn set() -> ScenarioSet {
        ScenarioSet {
            rows: Vec::new(),
            flows_base: Some(vec![dec!(-10), dec!(20)]),
            flows_tax_benefit: Some(vec![dec!(-10), dec!(25)]),
            flows_leasing: Some(vec![dec!(0), dec!(5)]),
            flows_leasing_tax_benefit: None,
            indicators_base: Some(Indicators::default()),
            indicators_tax_benefit: Some(Indicators {
                payback: Some(dec!(1)),
                ..Indicators::default()
            }),
            indicators_leasing: None,
            indicators_leasing_tax_benefit: Some(Indicators::default()),
        }
    }

    #[test]
    fn selects_flows_and_indicators_of_the_same_scenario() {
        let set = set();
        let selected = select(&set, ScenarioFlags::new(true, false)).unwrap();

        assert_eq!(selected.scenario, Scenario::WithTaxBenefit);
        assert_eq!(selected.flows, &[dec!(-10), dec!(25)]);
        assert_eq!(selected.indicators.payback, Some(dec!(1)));
    }

    #[test]
    fn missing_flows_fail_loudly() {
        assert_eq!(
            select(&set(), ScenarioFlags::new(true, true)),
            Err(SelectionError::MissingScenario(Scenario::WithLeasingAndTaxBenefit))
        );
    }

    #[test]
    fn missing_indicators_fail_loudly() {
        assert_eq!(
            select(&set(), ScenarioFlags::new(false, true)),
            Err(SelectionError::MissingScenario(Scenario::WithLeasing))
        );
    }
}
