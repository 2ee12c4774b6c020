use anyhow::{Result, anyhow, bail};
use chrono::Local;
use clap::Args;
use solar_api::ScenarioSource;
use solar_core::models::{NewQuoteRecord, Owner, Scenario, ScenarioFlags};
use solar_core::{Completion, QuoteRepository, Simulator, SimulatorError};
use tracing::{instrument, warn};

use super::export::{ExportArgs, render_view};
use crate::app::{App, record_quote};
use crate::params::ParamArgs;
use crate::tables::build_warning_table;

#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub params: ParamArgs,

    /// Show the scenario with tax benefits.
    #[arg(long)]
    pub tax_benefit: bool,

    /// Show the scenario financed with leasing.
    #[arg(long)]
    pub leasing: bool,

    #[command(flatten)]
    pub export: ExportArgs,

    /// Do not store the projection in the quote history.
    #[arg(long)]
    pub no_save: bool,
}

/// Submits the simulator's parameters and hands the outcome back to it.
///
/// A failed request is recorded on the simulator, not returned.
pub async fn run_projection(
    sim: &mut Simulator,
    source: &dyn ScenarioSource,
) -> Result<Completion, SimulatorError> {
    let ticket = sim.begin_submit()?;
    let outcome = source.project(sim.parameters()).await.map_err(|e| {
        warn!(error = %e, "calculation failed");
        e.to_string()
    });
    Ok(sim.complete(ticket, outcome))
}

/// History entry for the current result, summarised by the base scenario.
pub fn projection_record(
    sim: &Simulator,
    owner: Owner,
) -> Option<NewQuoteRecord> {
    let set = sim.result()?;
    let payload = serde_json::json!({
        "parameters": sim.parameters(),
        "result": set.as_ref(),
    });
    Some(NewQuoteRecord::projection(owner, set.indicators(Scenario::Base), payload))
}

#[instrument(skip_all)]
pub async fn simulate(
    app: &App,
    args: &SimulateArgs,
) -> Result<()> {
    let params = args.params.resolve()?;
    let warnings = params.warnings();
    if !warnings.is_empty() {
        println!("{}", build_warning_table(&warnings));
    }

    let client = app.financial_client()?;
    let mut sim = Simulator::new(params);
    if run_projection(&mut sim, &client).await? == Completion::Failed {
        bail!("{}", sim.last_error().unwrap_or("Error en el cálculo"));
    }

    if !args.no_save {
        match app.repository().await {
            Ok(repo) => save_projection(&sim, app, repo.as_ref()).await,
            Err(e) => warn!(error = %e, "quote history unavailable"),
        }
    }

    sim.set_flags(ScenarioFlags::new(args.tax_benefit, args.leasing));
    let view = sim.view().ok_or_else(|| anyhow!("no result to show"))??;
    println!("{}", render_view(&view));

    for path in args.export.write(&view, Local::now().date_naive())? {
        println!("Exportado: {}", path.display());
    }
    Ok(())
}

async fn save_projection(
    sim: &Simulator,
    app: &App,
    repo: &dyn QuoteRepository,
) {
    let owner = match app.owner() {
        Ok(owner) => owner,
        Err(e) => {
            warn!(error = %e, "cannot determine quote owner");
            return;
        }
    };
    if let Some(record) = projection_record(sim, owner) {
        record_quote(repo, record).await;
    }
}
