//! Line chart of the selected scenario's yearly net flow.
//!
//! [`ChartModel`] is pure data derived from a flow array. [`ChartModel::layout`]
//! turns it into plot coordinates that both the SVG renderer here and the PDF
//! report draw from, so the two pictures always agree.
//!
//! A rendered chart is a managed resource: [`ChartSlot`] holds at most one
//! live [`Chart`] and always disposes the previous one before creating the
//! next.

use std::fmt::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::debug;

use crate::calculations::break_even;
use crate::format::format_cop;
use crate::models::Scenario;

pub const CHART_TITLE: &str = "Flujo de Caja Anual del Proyecto";
pub const X_AXIS_TITLE: &str = "Año";
pub const Y_AXIS_TITLE: &str = "COP";

const Y_TICKS: usize = 5;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 50.0;
const MARGIN_LEFT: f64 = 110.0;
const MARGIN_RIGHT: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BREAK_EVEN: Rgb = Rgb(0, 128, 0);

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Line colour of each scenario's series.
pub fn series_colour(scenario: Scenario) -> Rgb {
    match scenario {
        Scenario::Base => Rgb(0, 0, 255),
        Scenario::WithTaxBenefit => Rgb(0, 128, 0),
        Scenario::WithLeasing => Rgb(255, 165, 0),
        Scenario::WithLeasingAndTaxBenefit => Rgb(128, 0, 128),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartModel {
    pub scenario: Scenario,
    pub series_label: &'static str,
    pub colour: Rgb,
    /// `Año N` for each year.
    pub labels: Vec<String>,
    pub values: Vec<Decimal>,
    pub break_even: Option<usize>,
    pub y_min: Decimal,
    pub y_max: Decimal,
}

impl ChartModel {
    /// Builds the chart for one scenario's net flows (not cumulative).
    pub fn from_flows(
        scenario: Scenario,
        flows: &[Decimal],
    ) -> Self {
        let (mut y_min, mut y_max) = flows
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
        if y_min == y_max {
            y_min -= Decimal::ONE;
            y_max += Decimal::ONE;
        }

        Self {
            scenario,
            series_label: scenario.label(),
            colour: series_colour(scenario),
            labels: (0..flows.len()).map(|i| format!("Año {i}")).collect(),
            values: flows.to_vec(),
            break_even: break_even::locate(flows),
            y_min,
            y_max,
        }
    }

    /// Label of the break-even year, if any.
    pub fn break_even_label(&self) -> Option<&str> {
        self.break_even
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    /// Plot geometry for a canvas of `width` x `height`, y growing downwards.
    pub fn layout(
        &self,
        width: f64,
        height: f64,
    ) -> ChartLayout {
        let inner_width = (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let inner_height = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        let y_min = self.y_min.to_f64().unwrap_or(0.0);
        let y_max = self.y_max.to_f64().unwrap_or(0.0);
        let span = if y_max > y_min { y_max - y_min } else { 1.0 };
        let steps = self.values.len().saturating_sub(1).max(1) as f64;

        let x_scale = |index: usize| MARGIN_LEFT + (index as f64 / steps) * inner_width;
        let y_scale = |value: f64| MARGIN_TOP + inner_height - ((value - y_min) / span) * inner_height;

        let points = self
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| (x_scale(i), y_scale(v.to_f64().unwrap_or(0.0))))
            .collect();

        let y_ticks = (0..Y_TICKS)
            .map(|i| {
                let value = self.y_min
                    + (self.y_max - self.y_min) * Decimal::from(i) / Decimal::from(Y_TICKS - 1);
                (y_scale(value.to_f64().unwrap_or(0.0)), format_cop(value.round_dp(0)))
            })
            .collect();

        let x_ticks = (0..self.values.len())
            .map(|i| (x_scale(i), i.to_string()))
            .collect();

        ChartLayout {
            width,
            height,
            plot_left: MARGIN_LEFT,
            plot_right: MARGIN_LEFT + inner_width,
            plot_top: MARGIN_TOP,
            plot_bottom: MARGIN_TOP + inner_height,
            points,
            zero_y: y_scale(0.0),
            y_ticks,
            x_ticks,
            break_even_x: self.break_even.map(x_scale),
        }
    }

    /// Standalone SVG document of the chart.
    pub fn render_svg(
        &self,
        width: u32,
        height: u32,
    ) -> String {
        let layout = self.layout(f64::from(width), f64::from(height));
        let colour = self.colour.hex();
        let mut svg = String::new();

        // Writing into a String never fails.
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="Helvetica, Arial, sans-serif">"#
        );
        let _ = writeln!(svg, r##"  <rect width="100%" height="100%" fill="#ffffff"/>"##);
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="24" text-anchor="middle" font-size="16" font-weight="bold">{}</text>"#,
            layout.width / 2.0,
            CHART_TITLE
        );
        let _ = writeln!(
            svg,
            r#"  <g font-size="12"><rect x="{:.1}" y="32" width="14" height="4" fill="{colour}"/><text x="{:.1}" y="38">{}</text></g>"#,
            layout.width / 2.0 - 80.0,
            layout.width / 2.0 - 60.0,
            escape(self.series_label)
        );

        // Axes and grid
        for (y, label) in &layout.y_ticks {
            let _ = writeln!(
                svg,
                r##"  <line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="#e0e0e0"/><text x="{:.1}" y="{y:.1}" text-anchor="end" dominant-baseline="middle" font-size="11">{}</text>"##,
                layout.plot_left,
                layout.plot_right,
                layout.plot_left - 8.0,
                escape(label)
            );
        }
        for (x, label) in &layout.x_ticks {
            let _ = writeln!(
                svg,
                r#"  <text x="{x:.1}" y="{:.1}" text-anchor="middle" font-size="11">{label}</text>"#,
                layout.plot_bottom + 18.0
            );
        }
        let _ = writeln!(
            svg,
            r##"  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#555555"/>"##,
            layout.plot_left, layout.plot_top, layout.plot_left, layout.plot_bottom
        );
        let _ = writeln!(
            svg,
            r##"  <line x1="{:.1}" y1="{z:.1}" x2="{:.1}" y2="{z:.1}" stroke="#555555"/>"##,
            layout.plot_left,
            layout.plot_right,
            z = layout.zero_y
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="12">{X_AXIS_TITLE}</text>"#,
            (layout.plot_left + layout.plot_right) / 2.0,
            layout.height - 10.0
        );
        let _ = writeln!(
            svg,
            r#"  <text x="14" y="{y:.1}" text-anchor="middle" font-size="12" transform="rotate(-90 14 {y:.1})">{Y_AXIS_TITLE}</text>"#,
            y = (layout.plot_top + layout.plot_bottom) / 2.0
        );

        // Series
        if let Some(path) = layout.path() {
            let _ = writeln!(
                svg,
                r#"  <path d="{path}" fill="none" stroke="{colour}" stroke-width="2"/>"#
            );
            for (x, y) in &layout.points {
                let _ = writeln!(
                    svg,
                    r#"  <circle cx="{x:.1}" cy="{y:.1}" r="3" fill="{colour}"/>"#
                );
            }
        }

        if let Some(x) = layout.break_even_x {
            let _ = writeln!(
                svg,
                r#"  <line class="break-even" x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="{}" stroke-width="3" stroke-dasharray="6 6"/>"#,
                layout.plot_top,
                layout.plot_bottom,
                Rgb::BREAK_EVEN.hex()
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}

/// Plot coordinates computed by [`ChartModel::layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub plot_left: f64,
    pub plot_right: f64,
    pub plot_top: f64,
    pub plot_bottom: f64,
    pub points: Vec<(f64, f64)>,
    pub zero_y: f64,
    pub y_ticks: Vec<(f64, String)>,
    pub x_ticks: Vec<(f64, String)>,
    pub break_even_x: Option<f64>,
}

impl ChartLayout {
    /// SVG path data through every point, or `None` for an empty series.
    pub fn path(&self) -> Option<String> {
        let ((x0, y0), rest) = self.points.split_first()?;
        let mut path = format!("M {x0:.1} {y0:.1}");
        for (x, y) in rest {
            let _ = write!(path, " L {x:.1} {y:.1}");
        }
        Some(path)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

// ─────────────────────────────────────────────────────────────────────────────
// Chart lifecycle
// ─────────────────────────────────────────────────────────────────────────────

/// A live chart instance. Dropping it disposes it.
#[derive(Debug)]
pub struct Chart {
    id: u64,
    model: ChartModel,
    live: Arc<AtomicUsize>,
}

impl Chart {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn model(&self) -> &ChartModel {
        &self.model
    }
}

impl Drop for Chart {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        debug!(chart = self.id, "chart disposed");
    }
}

/// Owner of the single chart shown for the current result.
#[derive(Debug, Default)]
pub struct ChartSlot {
    current: Option<Chart>,
    next_id: u64,
    live: Arc<AtomicUsize>,
}

impl ChartSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disposes the current chart, then creates one for `model`.
    pub fn replace(
        &mut self,
        model: ChartModel,
    ) -> &Chart {
        self.clear();

        self.next_id += 1;
        self.live.fetch_add(1, Ordering::SeqCst);
        debug!(chart = self.next_id, scenario = ?model.scenario, "chart created");

        self.current.insert(Chart {
            id: self.next_id,
            model,
            live: Arc::clone(&self.live),
        })
    }

    pub fn clear(&mut self) {
        // Dropping the chart disposes it.
        self.current = None;
    }

    pub fn current(&self) -> Option<&Chart> {
        self.current.as_ref()
    }

    /// Charts created by this slot that have not been disposed yet.
    pub fn live_charts(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}
