//! Exports of the currently selected scenario: a paginated PDF report and a
//! flat CSV file. Both read the same [`DisplayTable`] so their columns and
//! cell strings match what is shown on screen.

pub mod csv;
pub mod pdf;

use std::io;
use std::path::PathBuf;

use chrono::NaiveDate;
use solar_core::calculations::DisplayTable;
use solar_core::chart::ChartModel;
use solar_core::models::Indicators;
use solar_core::simulator::ScenarioView;
use thiserror::Error;

/// Errors that can occur when producing an export.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("CSV write error: {0}")]
    Csv(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("cannot write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<::csv::Error> for ReportError {
    fn from(err: ::csv::Error) -> Self {
        ReportError::Csv(err.to_string())
    }
}

impl From<printpdf::Error> for ReportError {
    fn from(err: printpdf::Error) -> Self {
        ReportError::Pdf(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Pdf,
    Csv,
}

/// File name of an export, suffixed with the client or site id when known.
///
/// The id is reduced to ASCII letters, digits, `_` and `-`.
///
/// # Examples
///
/// ```
/// use solar_report::{ExportKind, export_file_name};
///
/// assert_eq!(export_file_name(ExportKind::Pdf, None), "Informe_FV.pdf");
/// assert_eq!(export_file_name(ExportKind::Csv, Some("NIU 12/34")), "resultado_fv_NIU_12_34.csv");
/// ```
pub fn export_file_name(
    kind: ExportKind,
    client_id: Option<&str>,
) -> String {
    let (stem, extension) = match kind {
        ExportKind::Pdf => ("Informe_FV", "pdf"),
        ExportKind::Csv => ("resultado_fv", "csv"),
    };

    let id: String = client_id
        .unwrap_or_default()
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let id = id.trim_matches('_');

    if id.is_empty() {
        format!("{stem}.{extension}")
    } else {
        format!("{stem}_{id}.{extension}")
    }
}

/// Everything the PDF report prints, borrowed from the current view.
#[derive(Debug, Clone, Copy)]
pub struct ReportDocument<'a> {
    pub generated_on: NaiveDate,
    pub scenario_label: &'static str,
    pub indicators: &'a Indicators,
    pub break_even: Option<usize>,
    pub table: &'a DisplayTable,
    pub chart: &'a ChartModel,
}

impl<'a> ReportDocument<'a> {
    pub fn from_view(
        view: &'a ScenarioView,
        generated_on: NaiveDate,
    ) -> Self {
        Self {
            generated_on,
            scenario_label: view.scenario.label(),
            indicators: &view.indicators,
            break_even: view.break_even,
            table: &view.table,
            chart: &view.chart,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_names_without_client() {
        assert_eq!(export_file_name(ExportKind::Pdf, None), "Informe_FV.pdf");
        assert_eq!(export_file_name(ExportKind::Csv, Some("   ")), "resultado_fv.csv");
    }

    #[test]
    fn client_id_is_sanitised() {
        assert_eq!(export_file_name(ExportKind::Pdf, Some("1234567")), "Informe_FV_1234567.pdf");
        assert_eq!(
            export_file_name(ExportKind::Pdf, Some("../Finca Añil")),
            "Informe_FV_Finca_A_il.pdf"
        );
    }
}
