use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input of the financial projection endpoint.
///
/// Rates and shares are fractions (`0.08` for 8 %), exactly as the backend
/// expects them; the user-facing side converts from percentages with
/// [`percent_to_fraction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialParameters {
    #[serde(rename = "generacion_anual_kwh", with = "rust_decimal::serde::float")]
    pub annual_generation_kwh: Decimal,

    #[serde(rename = "porcentaje_autoconsumo", with = "rust_decimal::serde::float")]
    pub self_consumption_share: Decimal,

    #[serde(rename = "consumo_anual_usuario", with = "rust_decimal::serde::float")]
    pub annual_consumption_kwh: Decimal,

    #[serde(rename = "precio_compra_kwh", with = "rust_decimal::serde::float")]
    pub purchase_tariff: Decimal,

    #[serde(rename = "crecimiento_energia", with = "rust_decimal::serde::float")]
    pub tariff_growth: Decimal,

    #[serde(rename = "precio_bolsa", with = "rust_decimal::serde::float")]
    pub market_price: Decimal,

    #[serde(rename = "crecimiento_bolsa", with = "rust_decimal::serde::float")]
    pub market_price_growth: Decimal,

    #[serde(rename = "componente_comercializacion", with = "rust_decimal::serde::float")]
    pub commercialization_component: Decimal,

    #[serde(rename = "capex", with = "rust_decimal::serde::float")]
    pub capex: Decimal,

    #[serde(rename = "opex_anual", with = "rust_decimal::serde::float")]
    pub annual_opex: Decimal,

    #[serde(rename = "horizonte_anios")]
    pub horizon_years: u32,

    #[serde(rename = "tasa_descuento", with = "rust_decimal::serde::float")]
    pub discount_rate: Decimal,

    #[serde(rename = "anios_deduccion_renta")]
    pub income_tax_deduction_years: u32,

    #[serde(rename = "anios_leasing")]
    pub leasing_years: u32,

    #[serde(rename = "tasa_leasing", with = "rust_decimal::serde::float")]
    pub leasing_rate: Decimal,
}

impl Default for FinancialParameters {
    fn default() -> Self {
        Self {
            annual_generation_kwh: Decimal::from(36_000),
            self_consumption_share: Decimal::new(25, 2),
            annual_consumption_kwh: Decimal::from(30_000),
            purchase_tariff: Decimal::from(830),
            tariff_growth: Decimal::new(8, 2),
            market_price: Decimal::from(400),
            market_price_growth: Decimal::new(8, 2),
            commercialization_component: Decimal::from(100),
            capex: Decimal::from(83_000_000),
            annual_opex: Decimal::from(2_000_000),
            horizon_years: 25,
            discount_rate: Decimal::new(10, 2),
            income_tax_deduction_years: 3,
            leasing_years: 10,
            leasing_rate: Decimal::new(8, 2),
        }
    }
}

/// A parameter outside the range the form accepts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} must be between {min} and {max} (got {value})")]
pub struct ParameterError {
    pub field: &'static str,
    pub value: Decimal,
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningTone {
    Warning,
    Neutral,
}

/// Advisory message about unusual but accepted inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterWarning {
    pub tone: WarningTone,
    pub text: &'static str,
}

const MAX_WARNINGS: usize = 5;

/// Converts a user-facing percentage (`8`) into the fraction the backend uses (`0.08`).
pub fn percent_to_fraction(percent: Decimal) -> Decimal {
    percent / Decimal::ONE_HUNDRED
}

/// Converts a backend fraction into a user-facing percentage.
pub fn fraction_to_percent(fraction: Decimal) -> Decimal {
    fraction * Decimal::ONE_HUNDRED
}

impl FinancialParameters {
    /// Checks every field against the bounds of the input form.
    ///
    /// Returns all violations at once so the caller can report them together.
    pub fn validate(&self) -> Result<(), Vec<ParameterError>> {
        let pct = |n: i64| Decimal::new(n, 2);
        let checks: [(&'static str, Decimal, Decimal, Decimal); 15] = [
            (
                "generacion_anual_kwh",
                self.annual_generation_kwh,
                Decimal::ZERO,
                Decimal::from(2_000_000),
            ),
            ("porcentaje_autoconsumo", self.self_consumption_share, Decimal::ZERO, Decimal::ONE),
            (
                "consumo_anual_usuario",
                self.annual_consumption_kwh,
                Decimal::ZERO,
                Decimal::from(2_000_000),
            ),
            ("precio_compra_kwh", self.purchase_tariff, Decimal::ZERO, Decimal::from(3_000)),
            ("crecimiento_energia", self.tariff_growth, Decimal::ZERO, pct(30)),
            ("precio_bolsa", self.market_price, Decimal::ZERO, Decimal::from(3_000)),
            ("crecimiento_bolsa", self.market_price_growth, Decimal::ZERO, pct(30)),
            (
                "componente_comercializacion",
                self.commercialization_component,
                Decimal::ZERO,
                Decimal::from(500),
            ),
            ("capex", self.capex, Decimal::ZERO, Decimal::from(100_000_000_000_i64)),
            ("opex_anual", self.annual_opex, Decimal::ZERO, Decimal::from(5_000_000_000_i64)),
            (
                "horizonte_anios",
                Decimal::from(self.horizon_years),
                Decimal::ONE,
                Decimal::from(35),
            ),
            ("tasa_descuento", self.discount_rate, Decimal::ZERO, pct(30)),
            (
                "anios_deduccion_renta",
                Decimal::from(self.income_tax_deduction_years),
                Decimal::ZERO,
                Decimal::from(15),
            ),
            (
                "anios_leasing",
                Decimal::from(self.leasing_years),
                Decimal::ZERO,
                Decimal::from(20),
            ),
            ("tasa_leasing", self.leasing_rate, Decimal::ZERO, pct(30)),
        ];

        let errors: Vec<_> = checks
            .into_iter()
            .filter(|(_, value, min, max)| value < min || value > max)
            .map(|(field, value, min, max)| ParameterError {
                field,
                value,
                min,
                max,
            })
            .collect();

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Soft warnings shown above the form; at most five.
    pub fn warnings(&self) -> Vec<ParameterWarning> {
        let mut warnings = Vec::new();
        let mut push = |tone, text| warnings.push(ParameterWarning { tone, text });

        let generation = self.annual_generation_kwh;
        let consumption = self.annual_consumption_kwh;
        let self_consumption_pct = fraction_to_percent(self.self_consumption_share);

        if generation.is_zero() {
            push(
                WarningTone::Warning,
                "La generación está en 0. ¿Seguro que el sistema produce energía?",
            );
        }
        if consumption.is_zero() {
            push(
                WarningTone::Warning,
                "El consumo anual está en 0. Si es un cliente real, revisa facturas.",
            );
        }
        if self_consumption_pct < Decimal::from(5) {
            push(
                WarningTone::Neutral,
                "Autoconsumo muy bajo (<5%). Usualmente sube si hay consumo diurno.",
            );
        }
        if self_consumption_pct > Decimal::from(90) {
            push(
                WarningTone::Neutral,
                "Autoconsumo muy alto (>90%). Solo si casi todo coincide con horas solares.",
            );
        }
        if self.purchase_tariff > Decimal::from(2_000) {
            push(
                WarningTone::Warning,
                "Tarifa > 2.000 COP/kWh: revisa que sea promedio real y no un pico.",
            );
        }
        if self.market_price > self.purchase_tariff && self.market_price > Decimal::ZERO {
            push(
                WarningTone::Warning,
                "Precio bolsa mayor que la tarifa. Usualmente bolsa es menor.",
            );
        }
        if self.capex > Decimal::ZERO && self.annual_opex > self.capex * Decimal::new(2, 1) {
            push(WarningTone::Warning, "OPEX anual parece alto vs CAPEX (más del 20%).");
        }
        if generation > Decimal::ZERO
            && consumption > Decimal::ZERO
            && generation > consumption * Decimal::new(15, 1)
        {
            push(
                WarningTone::Neutral,
                "Generación mucho mayor que consumo: podrías depender demasiado de excedentes.",
            );
        }

        warnings.truncate(MAX_WARNINGS);
        warnings
    }
}
