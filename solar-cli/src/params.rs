//! Financial simulator inputs from a parameter file and flags.
//!
//! The file uses the backend's field names with rates as fractions:
//!
//! ```toml
//! capex = 83000000
//! porcentaje_autoconsumo = 0.25
//! horizonte_anios = 25
//! ```
//!
//! Flags take percentages (`--discount-rate 10`) and override the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rust_decimal::Decimal;
use solar_core::FinancialParameters;

use crate::utils::{parse_decimal, parse_percent};

#[derive(Debug, Clone, Default, Args)]
pub struct ParamArgs {
    /// TOML file with the simulator inputs; missing fields use defaults.
    #[arg(long = "params", value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Annual generation (kWh).
    #[arg(long, value_parser = parse_decimal)]
    pub generation: Option<Decimal>,

    /// Self-consumed share of the generation (%).
    #[arg(long, value_parser = parse_percent)]
    pub self_consumption: Option<Decimal>,

    /// Annual consumption of the user (kWh).
    #[arg(long, value_parser = parse_decimal)]
    pub consumption: Option<Decimal>,

    /// Purchase tariff (COP/kWh).
    #[arg(long, value_parser = parse_decimal)]
    pub tariff: Option<Decimal>,

    /// Yearly tariff growth (%).
    #[arg(long, value_parser = parse_percent)]
    pub tariff_growth: Option<Decimal>,

    /// Spot market price (COP/kWh).
    #[arg(long, value_parser = parse_decimal)]
    pub market_price: Option<Decimal>,

    /// Yearly spot price growth (%).
    #[arg(long, value_parser = parse_percent)]
    pub market_growth: Option<Decimal>,

    /// Commercialisation component (COP/kWh).
    #[arg(long, value_parser = parse_decimal)]
    pub commercialization: Option<Decimal>,

    /// Installed cost (COP).
    #[arg(long, value_parser = parse_decimal)]
    pub capex: Option<Decimal>,

    /// Yearly operating cost (COP).
    #[arg(long, value_parser = parse_decimal)]
    pub opex: Option<Decimal>,

    /// Evaluation horizon (years).
    #[arg(long)]
    pub horizon: Option<u32>,

    /// Discount rate (%).
    #[arg(long, value_parser = parse_percent)]
    pub discount_rate: Option<Decimal>,

    /// Years over which the income-tax deduction is taken.
    #[arg(long)]
    pub deduction_years: Option<u32>,

    /// Leasing term (years).
    #[arg(long)]
    pub leasing_years: Option<u32>,

    /// Leasing rate (%).
    #[arg(long, value_parser = parse_percent)]
    pub leasing_rate: Option<Decimal>,
}

pub fn read_parameter_file(path: &Path) -> Result<FinancialParameters> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read parameter file '{}'", path.display()))?;
    toml::from_str(&text)
        .with_context(|| format!("invalid parameter file '{}'", path.display()))
}

impl ParamArgs {
    /// File values (or defaults) with the given flags applied on top.
    pub fn resolve(&self) -> Result<FinancialParameters> {
        let base = match &self.file {
            Some(path) => read_parameter_file(path)?,
            None => FinancialParameters::default(),
        };
        Ok(self.apply(base))
    }

    pub fn apply(
        &self,
        mut params: FinancialParameters,
    ) -> FinancialParameters {
        fn set<T: Copy>(
            target: &mut T,
            value: Option<T>,
        ) {
            if let Some(value) = value {
                *target = value;
            }
        }

        set(&mut params.annual_generation_kwh, self.generation);
        set(&mut params.self_consumption_share, self.self_consumption);
        set(&mut params.annual_consumption_kwh, self.consumption);
        set(&mut params.purchase_tariff, self.tariff);
        set(&mut params.tariff_growth, self.tariff_growth);
        set(&mut params.market_price, self.market_price);
        set(&mut params.market_price_growth, self.market_growth);
        set(&mut params.commercialization_component, self.commercialization);
        set(&mut params.capex, self.capex);
        set(&mut params.annual_opex, self.opex);
        set(&mut params.horizon_years, self.horizon);
        set(&mut params.discount_rate, self.discount_rate);
        set(&mut params.income_tax_deduction_years, self.deduction_years);
        set(&mut params.leasing_years, self.leasing_years);
        set(&mut params.leasing_rate, self.leasing_rate);
        params
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = ParamArgs {
            capex: Some(dec!(50000000)),
            discount_rate: Some(dec!(0.12)),
            horizon: Some(20),
            ..ParamArgs::default()
        };

        let params = args.resolve().unwrap();
        assert_eq!(params.capex, dec!(50000000));
        assert_eq!(params.discount_rate, dec!(0.12));
        assert_eq!(params.horizon_years, 20);
        assert_eq!(params.purchase_tariff, dec!(830));
    }

    #[test]
    fn file_values_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.toml");
        std::fs::write(
            &path,
            "capex = 60000000\nporcentaje_autoconsumo = 0.4\nhorizonte_anios = 15\n",
        )
        .unwrap();

        let args = ParamArgs {
            file: Some(path),
            horizon: Some(30),
            ..ParamArgs::default()
        };
        let params = args.resolve().unwrap();

        assert_eq!(params.capex, dec!(60000000));
        assert_eq!(params.self_consumption_share, dec!(0.4));
        assert_eq!(params.horizon_years, 30);
    }

    #[test]
    fn missing_file_is_reported() {
        let args = ParamArgs {
            file: Some(PathBuf::from("/nonexistent/params.toml")),
            ..ParamArgs::default()
        };
        let err = args.resolve().unwrap_err();
        assert!(err.to_string().contains("cannot read parameter file"));
    }
}
