use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use solar_core::calculations::Agreement;
use solar_core::simulator::ScenarioView;
use solar_report::{ExportKind, ReportDocument, export_file_name};
use tracing::info;

use crate::tables::{build_flow_table, build_indicator_table};

pub const SVG_WIDTH: u32 = 900;
pub const SVG_HEIGHT: u32 = 450;

#[derive(Debug, Clone, Default, Args)]
pub struct ExportArgs {
    /// Write the PDF report (default name `Informe_FV[_<client>].pdf`).
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    pub pdf: Option<Option<PathBuf>>,

    /// Write the table as CSV (default name `resultado_fv[_<client>].csv`).
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    pub csv: Option<Option<PathBuf>>,

    /// Write the cash-flow chart as SVG.
    #[arg(long, value_name = "FILE")]
    pub svg: Option<PathBuf>,

    /// Client or site id appended to default export names.
    #[arg(long)]
    pub client_id: Option<String>,
}

impl ExportArgs {
    fn target(
        &self,
        kind: ExportKind,
    ) -> Option<PathBuf> {
        let requested = match kind {
            ExportKind::Pdf => self.pdf.as_ref(),
            ExportKind::Csv => self.csv.as_ref(),
        }?;
        Some(
            requested
                .clone()
                .unwrap_or_else(|| PathBuf::from(export_file_name(kind, self.client_id.as_deref()))),
        )
    }

    /// Writes every requested export of `view`; returns the files written.
    pub fn write(
        &self,
        view: &ScenarioView,
        today: NaiveDate,
    ) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        if let Some(path) = self.target(ExportKind::Pdf) {
            write_pdf(view, today, &path)?;
            written.push(path);
        }
        if let Some(path) = self.target(ExportKind::Csv) {
            write_csv(view, &path)?;
            written.push(path);
        }
        if let Some(path) = &self.svg {
            write_svg(view, path)?;
            written.push(path.clone());
        }
        Ok(written)
    }
}

pub fn write_pdf(
    view: &ScenarioView,
    today: NaiveDate,
    path: &Path,
) -> Result<()> {
    let doc = ReportDocument::from_view(view, today);
    solar_report::pdf::write_file(&doc, path)
        .with_context(|| format!("cannot export PDF to '{}'", path.display()))
}

pub fn write_csv(
    view: &ScenarioView,
    path: &Path,
) -> Result<()> {
    solar_report::csv::write_file(&view.table, path)
        .with_context(|| format!("cannot export CSV to '{}'", path.display()))
}

pub fn write_svg(
    view: &ScenarioView,
    path: &Path,
) -> Result<()> {
    std::fs::write(path, view.chart.render_svg(SVG_WIDTH, SVG_HEIGHT))
        .with_context(|| format!("cannot write chart to '{}'", path.display()))?;
    info!(path = %path.display(), "chart exported");
    Ok(())
}

/// Indicators, a payback note when the backend disagrees with its own flows,
/// and the yearly table.
pub fn render_view(view: &ScenarioView) -> String {
    let mut out = format!("{}\n", build_indicator_table(view));
    if let Agreement::Mismatch { local, .. } = &view.payback_check {
        let local = local.map_or_else(|| "ninguno".to_string(), |y| format!("Año {y}"));
        out.push_str(&format!(
            "Nota: el payback reportado no coincide con el flujo acumulado (equilibrio: {local}).\n"
        ));
    }
    out.push_str(&format!("{}\n", build_flow_table(&view.table)));
    out
}
