//! Landscape A4 report of the selected scenario.
//!
//! Page one carries the title, the headline indicators and the cash-flow
//! chart; the yearly table follows on as many pages as it needs, each with
//! its own header row. Every page gets the same footer.
//!
//! [`layout`] decides what goes on which page and is plain data, so the
//! pagination can be checked without parsing PDF output. [`render`] only
//! draws what the layout says.

use std::path::Path;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, LineDashPattern, Mm, PdfDocument,
    PdfLayerReference, Point, Polygon, Rgb,
};
use solar_core::chart::{self, ChartModel, X_AXIS_TITLE, Y_AXIS_TITLE};
use solar_core::calculations::{CellKind, Column};
use solar_core::format::{format_optional_cop, format_percent, format_years};
use tracing::info;

use crate::{ReportDocument, ReportError};

pub const REPORT_TITLE: &str = "Informe Financiero Proyecto FV";
pub const CHART_SECTION: &str = "Evolución del Flujo de Caja Anual";
pub const TABLE_SECTION: &str = "Resultados Detallados por Año";
pub const COPYRIGHT: &str = "© 2025 RED SOL Colombia";

/// Body rows that fit below the header on one table page.
pub const ROWS_PER_PAGE: usize = 26;

// Page geometry in millimetres, measured from the top-left corner.
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 14.0;
const TABLE_TOP: f32 = 25.0;
const ROW_HEIGHT: f32 = 6.0;
const TABLE_FONT: f32 = 7.0;
const HEADER_LINE: f32 = 3.0;
const CELL_PADDING: f32 = 1.5;
const MARKER_SIZE: f32 = 1.6;
const FOOTER_Y: f32 = 200.0;
const CHART_LEFT: f32 = 15.0;
const CHART_TOP: f32 = 44.0;

// The chart is laid out on a virtual canvas and scaled onto the page.
const CANVAS_WIDTH: f64 = 800.0;
const CANVAS_HEIGHT: f64 = 435.0;

const HEADER_FILL: (u8, u8, u8) = (40, 60, 120);
const ZEBRA_FILL: (u8, u8, u8) = (240, 240, 240);

const PT_TO_MM: f32 = 0.3528;

/// Rows of the yearly table that land on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePage {
    /// Index of the first row in the whole table; drives the zebra striping.
    pub first_row: usize,
    pub rows: Vec<Vec<String>>,
}

/// Page-by-page content of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub subtitle: String,
    pub summary: Vec<String>,
    pub headers: Vec<&'static str>,
    /// Each header wrapped at word boundaries to fit its column.
    pub header_lines: Vec<Vec<String>>,
    pub column_widths: Vec<f32>,
    pub table_pages: Vec<TablePage>,
}

impl ReportLayout {
    pub fn page_count(&self) -> usize {
        1 + self.table_pages.len()
    }

    /// Height of the header band; grows with the most wrapped header.
    pub fn header_height(&self) -> f32 {
        let lines = self.header_lines.iter().map(Vec::len).max().unwrap_or(1);
        (lines as f32 * HEADER_LINE + 2.0 * CELL_PADDING).max(ROW_HEIGHT)
    }

    /// Footer text of a 1-based page number.
    pub fn page_label(
        &self,
        page: usize,
    ) -> String {
        format!("Página {page} de {}", self.page_count())
    }

    /// Every body row in print order, across pages.
    pub fn table_cells(&self) -> Vec<Vec<String>> {
        self.table_pages
            .iter()
            .flat_map(|page| page.rows.iter().cloned())
            .collect()
    }
}

/// Splits the report into pages.
///
/// An empty table still gets one table page so the header is printed.
pub fn layout(doc: &ReportDocument<'_>) -> ReportLayout {
    let rows = doc.table.formatted_rows();
    let mut table_pages: Vec<TablePage> = rows
        .chunks(ROWS_PER_PAGE)
        .enumerate()
        .map(|(i, chunk)| TablePage {
            first_row: i * ROWS_PER_PAGE,
            rows: chunk.to_vec(),
        })
        .collect();
    if table_pages.is_empty() {
        table_pages.push(TablePage {
            first_row: 0,
            rows: Vec::new(),
        });
    }

    let break_even = match doc.break_even {
        Some(year) => format!("Punto de equilibrio: Año {year}"),
        None => "Sin punto de equilibrio en el horizonte".to_string(),
    };

    let column_widths = column_widths(&doc.table.columns, &rows, PAGE_WIDTH - 2.0 * MARGIN);
    let headers = doc.table.headers();
    let header_lines = headers
        .iter()
        .zip(&column_widths)
        .map(|(label, width)| wrap_label(label, width - 2.0 * CELL_PADDING, TABLE_FONT))
        .collect();

    ReportLayout {
        subtitle: format!(
            "Generado automáticamente - {}",
            doc.generated_on.format("%-d/%-m/%Y")
        ),
        summary: vec![
            format!("Escenario: {}", doc.scenario_label),
            format!("VPN: {}", format_optional_cop(doc.indicators.npv)),
            format!("TIR: {}", format_percent(doc.indicators.irr)),
            format!("Payback: {}", format_years(doc.indicators.payback)),
            break_even,
        ],
        headers,
        header_lines,
        column_widths,
        table_pages,
    }
}

/// Column widths that add up to `total`.
///
/// Each column first gets room for its longest header word and its widest
/// cell; what is left is shared out, money columns taking more than the
/// year and energy columns. If even the minimums do not fit they are scaled
/// down together.
fn column_widths(
    columns: &[Column],
    rows: &[Vec<String>],
    total: f32,
) -> Vec<f32> {
    if columns.is_empty() {
        return Vec::new();
    }
    let weight = |c: &Column| match c.kind() {
        CellKind::Plain => 0.6_f32,
        CellKind::Money => 1.0_f32,
    };

    let minimums: Vec<f32> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let word = column
                .label()
                .split_whitespace()
                .map(|w| text_width(w, TABLE_FONT))
                .fold(0.0, f32::max);
            let cell = rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|v| text_width(v, TABLE_FONT))
                .fold(0.0, f32::max);
            word.max(cell) + 2.0 * CELL_PADDING
        })
        .collect();

    let floor: f32 = minimums.iter().sum();
    if floor >= total {
        return minimums.iter().map(|m| m * total / floor).collect();
    }
    let spare = total - floor;
    let weights: f32 = columns.iter().map(weight).sum();
    minimums
        .iter()
        .zip(columns)
        .map(|(min, column)| min + spare * weight(column) / weights)
        .collect()
}

/// Greedy word wrap of `label` into lines no wider than `width`.
///
/// A single word wider than `width` gets a line of its own.
fn wrap_label(
    label: &str,
    width: f32,
    size: f32,
) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for word in label.split_whitespace() {
        match lines.last_mut() {
            Some(line) if text_width(&format!("{line} {word}"), size) <= width => {
                line.push(' ');
                line.push_str(word);
            }
            _ => lines.push(word.to_string()),
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Line through the points and a square marker on each, in page millimetres.
#[derive(Debug, Clone, PartialEq)]
struct SeriesPlan {
    polyline: Option<Vec<(f32, f32)>>,
    markers: Vec<(f32, f32)>,
}

impl SeriesPlan {
    fn new(points: Vec<(f32, f32)>) -> Self {
        Self {
            polyline: (points.len() > 1).then(|| points.clone()),
            markers: points,
        }
    }
}

/// Renders the report to PDF bytes.
pub fn render(doc: &ReportDocument<'_>) -> Result<Vec<u8>, ReportError> {
    let layout = layout(doc);
    let (pdf, first_page, first_layer) =
        PdfDocument::new(REPORT_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: pdf.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: pdf.add_builtin_font(BuiltinFont::HelveticaBold)?,
    };

    {
        let canvas = Canvas {
            layer: pdf.get_page(first_page).get_layer(first_layer),
            fonts: &fonts,
        };
        canvas.summary_page(&layout, doc.chart);
        canvas.footer(&layout, 1);
    }

    for (i, page) in layout.table_pages.iter().enumerate() {
        let number = i + 2;
        let (page_index, layer_index) =
            pdf.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Layer {number}"));
        let canvas = Canvas {
            layer: pdf.get_page(page_index).get_layer(layer_index),
            fonts: &fonts,
        };
        canvas.table_page(&layout, page);
        canvas.footer(&layout, number);
    }

    let bytes = pdf.save_to_bytes()?;
    info!(
        scenario = doc.scenario_label,
        pages = layout.page_count(),
        bytes = bytes.len(),
        "PDF report rendered"
    );
    Ok(bytes)
}

pub fn write_file(
    doc: &ReportDocument<'_>,
    path: &Path,
) -> Result<(), ReportError> {
    let bytes = render(doc)?;
    std::fs::write(path, bytes).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "PDF exported");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Drawing
// ─────────────────────────────────────────────────────────────────────────────

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

struct Canvas<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
}

fn colour(rgb: (u8, u8, u8)) -> Color {
    let channel = |c: u8| f32::from(c) / 255.0;
    Color::Rgb(Rgb::new(channel(rgb.0), channel(rgb.1), channel(rgb.2), None))
}

/// Page point from a top-left based position in millimetres.
fn at(
    x: f32,
    y: f32,
) -> Point {
    Point::new(Mm(x), Mm(PAGE_HEIGHT - y))
}

/// Helvetica advance in millimetres, from per-class glyph widths (1/1000 em).
///
/// Errs on the wide side so that anything measured to fit does fit.
fn text_width(
    text: &str,
    size: f32,
) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c {
            'i' | 'j' | 'l' | '.' | ',' | '\'' | ' ' => 280,
            'f' | 't' | 'r' | 'I' | '(' | ')' | '/' | '-' => 340,
            'm' | 'w' | 'M' | 'W' => 840,
            '$' | '0'..='9' => 560,
            c if c.is_uppercase() => 730,
            _ => 560,
        })
        .sum();
    units as f32 / 1000.0 * size * PT_TO_MM
}

impl Canvas<'_> {
    fn text(
        &self,
        text: &str,
        size: f32,
        x: f32,
        y: f32,
        bold: bool,
    ) {
        let font = if bold { &self.fonts.bold } else { &self.fonts.regular };
        self.layer
            .use_text(text, size, Mm(x), Mm(PAGE_HEIGHT - y), font);
    }

    fn line(
        &self,
        from: (f32, f32),
        to: (f32, f32),
    ) {
        self.layer.add_line(Line {
            points: vec![(at(from.0, from.1), false), (at(to.0, to.1), false)],
            is_closed: false,
        });
    }

    fn fill_rect(
        &self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: (u8, u8, u8),
    ) {
        self.layer.set_fill_color(colour(fill));
        self.layer.add_polygon(Polygon {
            rings: vec![vec![
                (at(x, y), false),
                (at(x + width, y), false),
                (at(x + width, y + height), false),
                (at(x, y + height), false),
            ]],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn summary_page(
        &self,
        layout: &ReportLayout,
        chart: &ChartModel,
    ) {
        self.layer.set_fill_color(colour(HEADER_FILL));
        self.text(REPORT_TITLE, 18.0, MARGIN, 15.0, true);

        self.layer.set_fill_color(colour((100, 100, 100)));
        self.text(&layout.subtitle, 10.0, MARGIN, 22.0, false);

        self.layer.set_fill_color(colour((0, 0, 0)));
        let column = (PAGE_WIDTH - 2.0 * MARGIN) / layout.summary.len().max(1) as f32;
        for (i, line) in layout.summary.iter().enumerate() {
            self.text(line, 9.0, MARGIN + i as f32 * column, 29.0, i == 0);
        }

        self.text(CHART_SECTION, 14.0, MARGIN, 38.0, false);
        self.chart(chart);
    }

    fn chart(
        &self,
        model: &ChartModel,
    ) {
        let plot = model.layout(CANVAS_WIDTH, CANVAS_HEIGHT);
        let scale = ((PAGE_WIDTH - 2.0 * CHART_LEFT) as f64 / CANVAS_WIDTH) as f32;
        let px = |x: f64| CHART_LEFT + x as f32 * scale;
        let py = |y: f64| CHART_TOP + y as f32 * scale;
        let left = px(plot.plot_left);
        let right = px(plot.plot_right);
        let top = py(plot.plot_top);
        let bottom = py(plot.plot_bottom);
        let centre = (left + right) / 2.0;

        self.layer.set_fill_color(colour((0, 0, 0)));
        self.text(
            chart::CHART_TITLE,
            10.0,
            centre - text_width(chart::CHART_TITLE, 10.0) / 2.0,
            CHART_TOP + 4.0,
            true,
        );

        // Legend
        let series = (model.colour.0, model.colour.1, model.colour.2);
        self.fill_rect(centre - 25.0, CHART_TOP + 7.0, 5.0, 1.5, series);
        self.layer.set_fill_color(colour((0, 0, 0)));
        self.text(model.series_label, 8.0, centre - 18.0, CHART_TOP + 8.5, false);

        // Grid and ticks
        self.layer.set_outline_thickness(0.5);
        for (y, label) in &plot.y_ticks {
            let y = py(*y);
            self.layer.set_outline_color(colour((224, 224, 224)));
            self.line((left, y), (right, y));
            self.text(label, 6.0, left - 2.0 - text_width(label, 6.0), y + 1.0, false);
        }
        for (x, label) in &plot.x_ticks {
            let x = px(*x);
            self.text(label, 6.0, x - text_width(label, 6.0) / 2.0, bottom + 4.0, false);
        }
        self.text(X_AXIS_TITLE, 8.0, centre, bottom + 9.0, false);
        self.text(Y_AXIS_TITLE, 8.0, CHART_LEFT, top - 2.0, false);

        self.layer.set_outline_color(colour((85, 85, 85)));
        self.line((left, top), (left, bottom));
        let zero = py(plot.zero_y);
        self.line((left, zero), (right, zero));

        // Series
        let plan = SeriesPlan::new(plot.points.iter().map(|(x, y)| (px(*x), py(*y))).collect());
        if let Some(polyline) = &plan.polyline {
            self.layer.set_outline_color(colour(series));
            self.layer.set_outline_thickness(1.5);
            self.layer.add_line(Line {
                points: polyline.iter().map(|(x, y)| (at(*x, *y), false)).collect(),
                is_closed: false,
            });
        }
        for (x, y) in &plan.markers {
            let half = MARKER_SIZE / 2.0;
            self.fill_rect(x - half, y - half, MARKER_SIZE, MARKER_SIZE, series);
        }

        if let Some(x) = plot.break_even_x {
            let x = px(x);
            let marker = chart::Rgb::BREAK_EVEN;
            self.layer.set_outline_color(colour((marker.0, marker.1, marker.2)));
            self.layer.set_outline_thickness(2.0);
            self.layer.set_line_dash_pattern(LineDashPattern {
                dash_1: Some(6),
                gap_1: Some(6),
                ..LineDashPattern::default()
            });
            self.line((x, top), (x, bottom));
            self.layer.set_line_dash_pattern(LineDashPattern::default());
        }
        self.layer.set_outline_thickness(1.0);
    }

    fn table_page(
        &self,
        layout: &ReportLayout,
        page: &TablePage,
    ) {
        self.layer.set_fill_color(colour((0, 0, 0)));
        self.text(TABLE_SECTION, 14.0, MARGIN, 20.0, false);

        let table_width: f32 = layout.column_widths.iter().sum();
        let header_height = layout.header_height();
        self.fill_rect(MARGIN, TABLE_TOP, table_width, header_height, HEADER_FILL);
        self.layer.set_fill_color(colour((255, 255, 255)));
        let mut x = MARGIN;
        for (lines, width) in layout.header_lines.iter().zip(&layout.column_widths) {
            for (j, line) in lines.iter().enumerate() {
                let baseline = TABLE_TOP + CELL_PADDING + HEADER_LINE * (j + 1) as f32 - 0.5;
                self.text(line, TABLE_FONT, x + CELL_PADDING, baseline, true);
            }
            x += width;
        }

        let body_top = TABLE_TOP + header_height;
        for (i, row) in page.rows.iter().enumerate() {
            let top = body_top + ROW_HEIGHT * i as f32;
            if (page.first_row + i) % 2 == 1 {
                self.fill_rect(MARGIN, top, table_width, ROW_HEIGHT, ZEBRA_FILL);
            }
            self.layer.set_fill_color(colour((0, 0, 0)));
            let mut x = MARGIN;
            for (value, width) in row.iter().zip(&layout.column_widths) {
                self.text(value, TABLE_FONT, x + CELL_PADDING, top + ROW_HEIGHT - 1.8, false);
                x += width;
            }
        }
    }

    fn footer(
        &self,
        layout: &ReportLayout,
        page: usize,
    ) {
        self.layer.set_fill_color(colour((150, 150, 150)));
        self.text(COPYRIGHT, 8.0, MARGIN, FOOTER_Y, false);
        self.text(&layout.page_label(page), 8.0, 260.0, FOOTER_Y, false);
    }
}
