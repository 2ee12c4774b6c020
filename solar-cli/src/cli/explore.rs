//! Interactive session over one simulator: submit once, then flip the
//! toggles and export without further requests.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Args;
use solar_api::ScenarioSource;
use solar_core::models::{Scenario, ScenarioFlags};
use solar_core::{Completion, ScenarioView, Simulator};
use solar_report::{ExportKind, export_file_name};
use tracing::debug;

use super::export::{render_view, write_csv, write_pdf, write_svg};
use super::simulate::run_projection;
use crate::params::ParamArgs;

const HELP: &str = "\
Comandos:
  submit              calcula con los parámetros actuales
  tax on|off          incluye o quita los beneficios tributarios
  leasing on|off      incluye o quita el leasing
  show                muestra el escenario seleccionado
  pdf [archivo]       exporta el informe PDF
  csv [archivo]       exporta la tabla CSV
  svg [archivo]       exporta el gráfico SVG
  reset               vuelve a los valores por defecto
  quit                termina";

#[derive(Debug, Clone, Args)]
pub struct ExploreArgs {
    #[command(flatten)]
    pub params: ParamArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Submit,
    Tax(bool),
    Leasing(bool),
    Show,
    Export(ExportKind, Option<PathBuf>),
    Svg(Option<PathBuf>),
    Reset,
    Help,
    Quit,
}

fn parse_switch(word: Option<&str>) -> Option<bool> {
    match word? {
        "on" | "si" | "sí" => Some(true),
        "off" | "no" => Some(false),
        _ => None,
    }
}

fn parse_action(line: &str) -> Option<Action> {
    let mut words = line.split_whitespace();
    let command = words.next()?;
    let rest = words.next();
    let path = rest.map(PathBuf::from);

    match command {
        "submit" | "calcular" => Some(Action::Submit),
        "tax" => parse_switch(rest).map(Action::Tax),
        "leasing" => parse_switch(rest).map(Action::Leasing),
        "show" => Some(Action::Show),
        "pdf" => Some(Action::Export(ExportKind::Pdf, path)),
        "csv" => Some(Action::Export(ExportKind::Csv, path)),
        "svg" => Some(Action::Svg(path)),
        "reset" => Some(Action::Reset),
        "help" | "?" => Some(Action::Help),
        "quit" | "exit" => Some(Action::Quit),
        _ => None,
    }
}

/// Runs the prompt loop until `quit` or end of input.
pub async fn explore<R: BufRead, W: Write>(
    sim: &mut Simulator,
    source: &dyn ScenarioSource,
    input: R,
    mut out: W,
    today: NaiveDate,
) -> Result<()> {
    writeln!(out, "{HELP}")?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Some(action) = parse_action(&line) else {
            writeln!(out, "Comando no reconocido: {}", line.trim())?;
            continue;
        };
        debug!(?action, "explore");

        match action {
            Action::Quit => break,
            Action::Help => writeln!(out, "{HELP}")?,
            Action::Submit => match run_projection(sim, source).await {
                Ok(Completion::Failed) => {
                    writeln!(out, "{}", sim.last_error().unwrap_or("Error en el cálculo"))?
                }
                Ok(_) => show(sim, &mut out)?,
                Err(e) => writeln!(out, "{e}")?,
            },
            Action::Tax(on) => {
                let flags = sim.flags();
                sim.set_flags(ScenarioFlags::new(on, flags.include_leasing));
                show(sim, &mut out)?;
            }
            Action::Leasing(on) => {
                let flags = sim.flags();
                sim.set_flags(ScenarioFlags::new(flags.include_tax_benefit, on));
                show(sim, &mut out)?;
            }
            Action::Show => show(sim, &mut out)?,
            Action::Reset => {
                sim.reset();
                writeln!(out, "Formulario restablecido.")?;
            }
            Action::Export(kind, path) => {
                let path = path.unwrap_or_else(|| PathBuf::from(export_file_name(kind, None)));
                let written = with_view(sim, |view| match kind {
                    ExportKind::Pdf => write_pdf(view, today, &path),
                    ExportKind::Csv => write_csv(view, &path),
                });
                report_export(&mut out, written, &path)?;
            }
            Action::Svg(path) => {
                let path = path.unwrap_or_else(|| PathBuf::from("flujo_caja.svg"));
                let written = with_view(sim, |view| write_svg(view, &path));
                report_export(&mut out, written, &path)?;
            }
        }
    }
    Ok(())
}

/// Runs `export` on the current view and returns the scenario it wrote. A
/// view that cannot be derived is reported with its own error.
fn with_view(
    sim: &Simulator,
    export: impl FnOnce(&ScenarioView) -> Result<()>,
) -> Result<Scenario> {
    match sim.view() {
        Some(Ok(view)) => export(&view).map(|()| view.scenario),
        Some(Err(e)) => Err(e.into()),
        None => bail!("No hay resultados para exportar."),
    }
}

fn report_export<W: Write>(
    out: &mut W,
    written: Result<Scenario>,
    path: &std::path::Path,
) -> Result<()> {
    match written {
        Ok(scenario) => writeln!(out, "Exportado: {} ({})", path.display(), scenario.label())?,
        Err(e) => writeln!(out, "{e:#}")?,
    }
    Ok(())
}

fn show<W: Write>(
    sim: &Simulator,
    out: &mut W,
) -> Result<()> {
    match sim.view() {
        Some(Ok(view)) => {
            write!(out, "{}", render_view(&view))?;
            debug!(live_charts = sim.chart().live_charts(), "view shown");
        }
        Some(Err(e)) => writeln!(out, "{e}")?,
        None => match sim.last_error() {
            Some(message) => writeln!(out, "{message}")?,
            None => writeln!(out, "Sin resultados. Usa 'submit' para calcular.")?,
        },
    }
    Ok(())
}
