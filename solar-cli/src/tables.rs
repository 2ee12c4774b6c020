use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use solar_core::calculations::{CellKind, DisplayTable};
use solar_core::format::{format_cop, format_number, format_optional_cop, format_percent, format_years, MISSING};
use solar_core::models::{ParameterWarning, QuoteKind, QuoteRecord, SizingQuote, WarningTone};
use solar_core::simulator::ScenarioView;

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table
}

/// Yearly cash-flow table of the selected scenario.
pub fn build_flow_table(display: &DisplayTable) -> Table {
    let mut table = new_table();
    table.set_header(display.headers());

    for row in &display.rows {
        table.add_row(row.cells.iter().map(|cell| {
            let text = Cell::new(cell.formatted());
            match cell.kind() {
                CellKind::Plain => text,
                CellKind::Money if cell.value.is_sign_negative() && !cell.value.is_zero() => {
                    text.set_alignment(CellAlignment::Right).fg(Color::Red)
                }
                CellKind::Money => text.set_alignment(CellAlignment::Right),
            }
        }));
    }
    table
}

/// Headline indicators of the selected scenario.
pub fn build_indicator_table(view: &ScenarioView) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Escenario", "VPN", "TIR", "Payback", "Punto de equilibrio"]);
    table.add_row(vec![
        Cell::new(view.scenario.label()).add_attribute(Attribute::Bold),
        Cell::new(format_optional_cop(view.indicators.npv)).set_alignment(CellAlignment::Right),
        Cell::new(format_percent(view.indicators.irr)).set_alignment(CellAlignment::Right),
        Cell::new(format_years(view.indicators.payback)).set_alignment(CellAlignment::Right),
        Cell::new(
            view.chart
                .break_even_label()
                .map_or_else(|| MISSING.to_string(), str::to_string),
        ),
    ]);
    table
}

pub fn build_sizing_table(quote: &SizingQuote) -> Table {
    let mut table = new_table();
    let optional_kwh = |value: Option<rust_decimal::Decimal>| {
        value.map_or_else(|| MISSING.to_string(), |v| format!("{} kWh", format_number(v)))
    };
    let rows = [
        ("Cliente", quote.client_name.clone().unwrap_or_else(|| MISSING.to_string())),
        ("Código", quote.site_id.clone().unwrap_or_else(|| MISSING.to_string())),
        ("Consumo mensual", format!("{} kWh", format_number(quote.monthly_consumption_kwh))),
        ("Potencia", format!("{} kWp", format_number(quote.power_kwp))),
        ("Paneles", quote.panel_count.to_string()),
        ("Inversor", quote.inverter.clone().unwrap_or_else(|| MISSING.to_string())),
        ("Generación mínima", optional_kwh(quote.generation_min_kwh)),
        ("Generación máxima", optional_kwh(quote.generation_max_kwh)),
        ("Precio total", format_cop(quote.total_price)),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table
}

/// Saved quotes, in the order given (newest first from the repository).
pub fn build_quote_table(quotes: &[QuoteRecord]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["#", "Fecha", "Tipo", "Potencia", "Precio", "VPN", "TIR", "Payback"]);

    for quote in quotes {
        let kind = match quote.kind {
            QuoteKind::Sizing => "Dimensionamiento",
            QuoteKind::Projection => "Simulación",
        };
        table.add_row(vec![
            Cell::new(quote.id).add_attribute(Attribute::Dim),
            Cell::new(quote.created_at.format("%Y-%m-%d %H:%M")),
            Cell::new(kind),
            Cell::new(
                quote
                    .power_kwp
                    .map_or_else(|| MISSING.to_string(), |p| format!("{} kWp", format_number(p))),
            ),
            Cell::new(format_optional_cop(quote.total_price)).set_alignment(CellAlignment::Right),
            Cell::new(format_optional_cop(quote.npv)).set_alignment(CellAlignment::Right),
            Cell::new(format_percent(quote.irr)).set_alignment(CellAlignment::Right),
            Cell::new(format_years(quote.payback)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_warning_table(warnings: &[ParameterWarning]) -> Table {
    let mut table = new_table();
    for warning in warnings {
        let colour = match warning.tone {
            WarningTone::Warning => Color::DarkYellow,
            WarningTone::Neutral => Color::Reset,
        };
        table.add_row(vec![Cell::new(warning.text).fg(colour)]);
    }
    table
}
