use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use rust_decimal::Decimal;
use solar_core::models::{
    ConsumptionSource, InverterType, Location, NewQuoteRecord, RoofType, SizingQuote,
    SizingRequest, StructureType,
};
use tracing::{instrument, warn};

use crate::app::{App, record_quote};
use crate::tables::build_sizing_table;
use crate::utils::parse_decimal;

fn choice<T>(
    parse: fn(&str) -> Option<T>,
    allowed: &'static str,
) -> impl Fn(&str) -> Result<T, String> + Clone {
    move |s| parse(s.trim()).ok_or_else(|| format!("expected one of: {allowed}"))
}

#[derive(Debug, Clone, Args)]
pub struct SizeArgs {
    /// Utility bill (PDF) to read the consumption from.
    #[arg(long, value_name = "PDF", conflicts_with = "monthly_kwh", required_unless_present = "monthly_kwh")]
    pub bill: Option<PathBuf>,

    /// Average monthly consumption (kWh) when no bill is at hand.
    #[arg(long, value_parser = parse_decimal)]
    pub monthly_kwh: Option<Decimal>,

    #[arg(long, default_value = "madera", value_parser = choice(StructureType::parse, "madera, perfil_metalico, cercha, plancha, granja"))]
    pub structure: StructureType,

    #[arg(long, default_value = "fibrocemento", value_parser = choice(RoofType::parse, "teja_colonial, fibrocemento, trapezoidal"))]
    pub roof: RoofType,

    #[arg(long, default_value = "quindio", value_parser = choice(Location::parse, "quindio, risaralda, caldas, valle"))]
    pub location: Location,

    #[arg(long, default_value = "ongrid", value_parser = choice(InverterType::parse, "ongrid, hibrido"))]
    pub inverter: InverterType,

    /// Share of the consumption to cover (%).
    #[arg(long, default_value = "100", value_parser = parse_decimal)]
    pub coverage: Decimal,

    /// Do not store the quote in the history.
    #[arg(long)]
    pub no_save: bool,
}

impl SizeArgs {
    pub fn request(&self) -> Result<SizingRequest> {
        let consumption = match (&self.bill, self.monthly_kwh) {
            (Some(path), _) => ConsumptionSource::Bill(path.clone()),
            (None, Some(monthly_kwh)) => ConsumptionSource::Manual { monthly_kwh },
            (None, None) => bail!("pass either --bill or --monthly-kwh"),
        };
        Ok(SizingRequest {
            structure: self.structure,
            roof: self.roof,
            location: self.location,
            inverter: self.inverter,
            coverage_pct: self.coverage,
            consumption,
        })
    }
}

pub fn sizing_payload(
    request: &SizingRequest,
    quote: &SizingQuote,
) -> serde_json::Value {
    let consumption = match &request.consumption {
        ConsumptionSource::Bill(path) => serde_json::json!({ "factura": path.file_name().map(|n| n.to_string_lossy()) }),
        ConsumptionSource::Manual { monthly_kwh } => serde_json::json!({ "consumo_mensual_kwh": monthly_kwh }),
    };
    serde_json::json!({
        "request": {
            "estructura": request.structure,
            "cubierta": request.roof,
            "ubicacion": request.location,
            "tipoInversor": request.inverter,
            "cobertura": request.coverage_pct,
            "consumo": consumption,
        },
        "response": quote,
    })
}

#[instrument(skip_all)]
pub async fn size(
    app: &App,
    args: &SizeArgs,
) -> Result<()> {
    let request = args.request()?;
    let quote = app.sizing_client()?.quote(&request).await?;
    println!("{}", build_sizing_table(&quote));
    if let Some(id) = quote.export_id() {
        println!("Identificador para exportaciones: {id}");
    }

    if !args.no_save {
        match (app.repository().await, app.owner()) {
            (Ok(repo), Ok(owner)) => {
                let record = NewQuoteRecord::sizing(owner, &quote, sizing_payload(&request, &quote));
                record_quote(repo.as_ref(), record).await;
            }
            (Err(e), _) | (_, Err(e)) => warn!(error = %e, "quote history unavailable"),
        }
    }
    Ok(())
}
