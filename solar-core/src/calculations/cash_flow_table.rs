//! Builds the per-year display table for the selected scenario.
//!
//! The column set depends on the toggles, so a table is an ordered list of
//! [`Column`]s plus rows of cells in that same order. Every renderer (terminal,
//! PDF, CSV) consumes [`DisplayTable::formatted_rows`], which keeps the three
//! outputs identical for a given selection.

use rust_decimal::Decimal;
use thiserror::Error;

use super::scenario_selector::{SelectionError, select};
use crate::format::{format_cop, format_plain};
use crate::models::{Scenario, ScenarioFlags, ScenarioSet, YearlyRow};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("scenario '{}' has {flows} yearly flows but the table has {rows} rows", .scenario.label())]
    LengthMismatch {
        scenario: Scenario,
        rows: usize,
        flows: usize,
    },

    #[error("year {year} has no value for '{column}'")]
    MissingField { year: u32, column: &'static str },
}

/// How a cell is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Shown as the backend sent it (year index, generated energy).
    Plain,
    /// Shown as Colombian pesos.
    Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Year,
    Generation,
    EnergyTariff,
    SelfConsumptionIncome,
    Surplus1Income,
    Surplus2Income,
    Opex,
    LeasingCost,
    BaseFlow,
    DepreciationBenefit,
    IncomeTaxBenefit,
    NetFlow,
    CumulativeFlow,
}

impl Column {
    pub fn label(&self) -> &'static str {
        match self {
            Column::Year => "Año",
            Column::Generation => "Generación (kWh)",
            Column::EnergyTariff => "Tarifa Energía (COP/kWh)",
            Column::SelfConsumptionIncome => "Ingreso Autoconsumo",
            Column::Surplus1Income => "Ingreso Excedente1",
            Column::Surplus2Income => "Ingreso Excedente2",
            Column::Opex => "OPEX",
            Column::LeasingCost => "Costo Leasing",
            Column::BaseFlow => "Flujo Base",
            Column::DepreciationBenefit => "Beneficio Depreciación",
            Column::IncomeTaxBenefit => "Beneficio Renta",
            Column::NetFlow => "Flujo Neto",
            Column::CumulativeFlow => "Flujo Acumulado",
        }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Column::Year | Column::Generation => CellKind::Plain,
            _ => CellKind::Money,
        }
    }

    /// Ordered column set for the given toggles.
    pub fn for_flags(flags: ScenarioFlags) -> Vec<Column> {
        let mut columns = vec![
            Column::Year,
            Column::Generation,
            Column::EnergyTariff,
            Column::SelfConsumptionIncome,
            Column::Surplus1Income,
            Column::Surplus2Income,
            Column::Opex,
        ];
        if flags.include_leasing {
            columns.push(Column::LeasingCost);
        }
        columns.push(Column::BaseFlow);
        if flags.include_tax_benefit {
            columns.push(Column::DepreciationBenefit);
            columns.push(Column::IncomeTaxBenefit);
        }
        columns.push(Column::NetFlow);
        columns.push(Column::CumulativeFlow);
        columns
    }
}

/// One (label, value, kind) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub column: Column,
    pub value: Decimal,
}

impl Cell {
    pub fn label(&self) -> &'static str {
        self.column.label()
    }

    pub fn kind(&self) -> CellKind {
        self.column.kind()
    }

    pub fn formatted(&self) -> String {
        match self.kind() {
            CellKind::Plain => format_plain(self.value),
            CellKind::Money => format_cop(self.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub year: u32,
    pub cells: Vec<Cell>,
}

impl DisplayRow {
    pub fn value(
        &self,
        column: Column,
    ) -> Option<Decimal> {
        self.cells.iter().find(|c| c.column == column).map(|c| c.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTable {
    pub scenario: Scenario,
    pub columns: Vec<Column>,
    pub rows: Vec<DisplayRow>,
}

impl DisplayTable {
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(Column::label).collect()
    }

    /// Cell strings in column order, one vector per year.
    pub fn formatted_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.cells.iter().map(Cell::formatted).collect())
            .collect()
    }

    pub fn net_flows(&self) -> Vec<Decimal> {
        self.column_values(Column::NetFlow)
    }

    pub fn cumulative_flows(&self) -> Vec<Decimal> {
        self.column_values(Column::CumulativeFlow)
    }

    fn column_values(
        &self,
        column: Column,
    ) -> Vec<Decimal> {
        self.rows.iter().filter_map(|row| row.value(column)).collect()
    }
}

/// Builds the table for the scenario picked by `flags`.
///
/// The net flow of each year comes from the selected scenario's flow array,
/// never from the template row. The cumulative column is the running sum of
/// those net flows.
pub fn build(
    set: &ScenarioSet,
    flags: ScenarioFlags,
) -> Result<DisplayTable, TableError> {
    let selected = select(set, flags)?;
    if selected.flows.len() != set.rows.len() {
        return Err(TableError::LengthMismatch {
            scenario: selected.scenario,
            rows: set.rows.len(),
            flows: selected.flows.len(),
        });
    }

    let columns = Column::for_flags(flags);
    let mut cumulative = Decimal::ZERO;
    let mut rows = Vec::with_capacity(set.rows.len());

    for (template, net) in set.rows.iter().zip(selected.flows) {
        cumulative += *net;
        let cells = columns
            .iter()
            .map(|&column| {
                let value = match column {
                    Column::NetFlow => *net,
                    Column::CumulativeFlow => cumulative,
                    _ => template_value(template, column)?,
                };
                Ok(Cell { column, value })
            })
            .collect::<Result<Vec<_>, TableError>>()?;

        rows.push(DisplayRow {
            year: template.year,
            cells,
        });
    }

    Ok(DisplayTable {
        scenario: selected.scenario,
        columns,
        rows,
    })
}

fn template_value(
    row: &YearlyRow,
    column: Column,
) -> Result<Decimal, TableError> {
    let optional = |value: Option<Decimal>| {
        value.ok_or(TableError::MissingField {
            year: row.year,
            column: column.label(),
        })
    };

    match column {
        Column::Year => Ok(Decimal::from(row.year)),
        Column::Generation => Ok(row.generated_kwh),
        Column::EnergyTariff => Ok(row.energy_tariff),
        Column::SelfConsumptionIncome => Ok(row.self_consumption_income),
        Column::Surplus1Income => Ok(row.surplus1_income),
        Column::Surplus2Income => Ok(row.surplus2_income),
        Column::Opex => Ok(row.opex),
        Column::BaseFlow => Ok(row.base_flow),
        Column::LeasingCost => optional(row.leasing_cost),
        Column::DepreciationBenefit => optional(row.depreciation_benefit),
        Column::IncomeTaxBenefit => optional(row.income_tax_benefit),
        Column::NetFlow | Column::CumulativeFlow => optional(row.net_flow),
    }
}
