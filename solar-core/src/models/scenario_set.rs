use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Scenario;

/// Scalar indicators the backend computes for one scenario.
///
/// Every field is nullable: a project that never turns a profit has no
/// payback year, and the IRR may be undefined for some flow shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicators {
    #[serde(rename = "vpn", default)]
    pub npv: Option<Decimal>,

    /// Internal rate of return, already expressed as a percentage.
    #[serde(rename = "tir", default)]
    pub irr: Option<Decimal>,

    #[serde(rename = "payback", default)]
    pub payback: Option<Decimal>,
}

/// One evaluation year of the backend's result table.
///
/// The optional fields are only meaningful for the scenarios that include
/// leasing or tax benefits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyRow {
    #[serde(rename = "Año")]
    pub year: u32,

    #[serde(rename = "Generación (kWh)")]
    pub generated_kwh: Decimal,

    #[serde(rename = "Tarifa Energía (COP/kWh)")]
    pub energy_tariff: Decimal,

    #[serde(rename = "Ingreso Autoconsumo")]
    pub self_consumption_income: Decimal,

    #[serde(rename = "Ingreso Excedente1")]
    pub surplus1_income: Decimal,

    #[serde(rename = "Ingreso Excedente2")]
    pub surplus2_income: Decimal,

    #[serde(rename = "OPEX")]
    pub opex: Decimal,

    #[serde(rename = "Costo Leasing", default)]
    pub leasing_cost: Option<Decimal>,

    #[serde(rename = "Flujo Base")]
    pub base_flow: Decimal,

    #[serde(rename = "Beneficio Depreciación", default)]
    pub depreciation_benefit: Option<Decimal>,

    #[serde(rename = "Beneficio Renta", default)]
    pub income_tax_benefit: Option<Decimal>,

    /// Net flow as printed in the template row. Display code never reads
    /// this: the selected scenario's flow array is authoritative.
    #[serde(rename = "Flujo Neto", default)]
    pub net_flow: Option<Decimal>,
}

/// Full response of the financial calculation endpoint.
///
/// All four scenarios arrive in one response so that toggling between them
/// never needs another request. The set is read-only once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSet {
    #[serde(rename = "tabla_resultados")]
    pub rows: Vec<YearlyRow>,

    #[serde(rename = "flujos_sin_bt", default)]
    pub flows_base: Option<Vec<Decimal>>,
    #[serde(rename = "flujos_con_bt", default)]
    pub flows_tax_benefit: Option<Vec<Decimal>>,
    #[serde(rename = "flujos_leasing_sin_bt", default)]
    pub flows_leasing: Option<Vec<Decimal>>,
    #[serde(rename = "flujos_leasing_con_bt", default)]
    pub flows_leasing_tax_benefit: Option<Vec<Decimal>>,

    #[serde(rename = "sin_bt", default)]
    pub indicators_base: Option<Indicators>,
    #[serde(rename = "con_bt", default)]
    pub indicators_tax_benefit: Option<Indicators>,
    #[serde(rename = "leasing_sin_bt", default)]
    pub indicators_leasing: Option<Indicators>,
    #[serde(rename = "leasing_con_bt", default)]
    pub indicators_leasing_tax_benefit: Option<Indicators>,
}

impl ScenarioSet {
    /// Number of evaluation years in the result table.
    pub fn horizon(&self) -> usize {
        self.rows.len()
    }

    pub fn flows(
        &self,
        scenario: Scenario,
    ) -> Option<&[Decimal]> {
        match scenario {
            Scenario::Base => self.flows_base.as_deref(),
            Scenario::WithTaxBenefit => self.flows_tax_benefit.as_deref(),
            Scenario::WithLeasing => self.flows_leasing.as_deref(),
            Scenario::WithLeasingAndTaxBenefit => self.flows_leasing_tax_benefit.as_deref(),
        }
    }

    pub fn indicators(
        &self,
        scenario: Scenario,
    ) -> Option<&Indicators> {
        match scenario {
            Scenario::Base => self.indicators_base.as_ref(),
            Scenario::WithTaxBenefit => self.indicators_tax_benefit.as_ref(),
            Scenario::WithLeasing => self.indicators_leasing.as_ref(),
            Scenario::WithLeasingAndTaxBenefit => self.indicators_leasing_tax_benefit.as_ref(),
        }
    }
}
