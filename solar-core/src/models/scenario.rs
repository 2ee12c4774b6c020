use serde::{Deserialize, Serialize};

/// One of the four financing variants the calculation backend projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scenario {
    Base,
    WithTaxBenefit,
    WithLeasing,
    WithLeasingAndTaxBenefit,
}

impl Scenario {
    pub fn all() -> &'static [Scenario] {
        &[
            Scenario::Base,
            Scenario::WithTaxBenefit,
            Scenario::WithLeasing,
            Scenario::WithLeasingAndTaxBenefit,
        ]
    }

    /// Key of the flow array in the backend response.
    pub fn flows_key(&self) -> &'static str {
        match self {
            Scenario::Base => "flujos_sin_bt",
            Scenario::WithTaxBenefit => "flujos_con_bt",
            Scenario::WithLeasing => "flujos_leasing_sin_bt",
            Scenario::WithLeasingAndTaxBenefit => "flujos_leasing_con_bt",
        }
    }

    /// Key of the indicator object in the backend response.
    pub fn indicators_key(&self) -> &'static str {
        match self {
            Scenario::Base => "sin_bt",
            Scenario::WithTaxBenefit => "con_bt",
            Scenario::WithLeasing => "leasing_sin_bt",
            Scenario::WithLeasingAndTaxBenefit => "leasing_con_bt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Base => "Sin beneficios / sin leasing",
            Scenario::WithTaxBenefit => "Con beneficios",
            Scenario::WithLeasing => "Con leasing",
            Scenario::WithLeasingAndTaxBenefit => "Leasing + beneficios",
        }
    }

    pub fn flags(&self) -> ScenarioFlags {
        match self {
            Scenario::Base => ScenarioFlags::default(),
            Scenario::WithTaxBenefit => ScenarioFlags {
                include_tax_benefit: true,
                include_leasing: false,
            },
            Scenario::WithLeasing => ScenarioFlags {
                include_tax_benefit: false,
                include_leasing: true,
            },
            Scenario::WithLeasingAndTaxBenefit => ScenarioFlags {
                include_tax_benefit: true,
                include_leasing: true,
            },
        }
    }
}

/// The two independent toggles shown next to the results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScenarioFlags {
    pub include_tax_benefit: bool,
    pub include_leasing: bool,
}

impl ScenarioFlags {
    pub fn new(
        include_tax_benefit: bool,
        include_leasing: bool,
    ) -> Self {
        Self {
            include_tax_benefit,
            include_leasing,
        }
    }

    pub fn scenario(&self) -> Scenario {
        match (self.include_leasing, self.include_tax_benefit) {
            (true, true) => Scenario::WithLeasingAndTaxBenefit,
            (true, false) => Scenario::WithLeasing,
            (false, true) => Scenario::WithTaxBenefit,
            (false, false) => Scenario::Base,
        }
    }
}

impl From<ScenarioFlags> for Scenario {
    fn from(flags: ScenarioFlags) -> Self {
        flags.scenario()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn flags_select_each_scenario_exactly_once() {
        assert_eq!(ScenarioFlags::new(false, false).scenario(), Scenario::Base);
        assert_eq!(ScenarioFlags::new(true, false).scenario(), Scenario::WithTaxBenefit);
        assert_eq!(ScenarioFlags::new(false, true).scenario(), Scenario::WithLeasing);
        assert_eq!(
            ScenarioFlags::new(true, true).scenario(),
            Scenario::WithLeasingAndTaxBenefit
        );
    }

    #[test]
    fn scenario_flags_round_trip() {
        for scenario in Scenario::all() {
            assert_eq!(scenario.flags().scenario(), *scenario);
        }
    }

    #[test]
    fn wire_keys_are_distinct() {
        let mut keys: Vec<_> = Scenario::all().iter().map(|s| s.flows_key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 4);
    }
}
