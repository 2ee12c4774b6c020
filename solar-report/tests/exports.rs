//! Exports of every scenario of a recorded API response.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use solar_core::simulator::derive_view;
use solar_core::{ScenarioFlags, ScenarioSet};
use solar_report::{ExportKind, ReportDocument, csv, export_file_name, pdf};

const RESPONSE: &str = include_str!("../../solar-core/tests/fixtures/scenario_set.json");

fn fixture() -> ScenarioSet {
    serde_json::from_str(RESPONSE).expect("fixture should deserialize")
}

fn all_flags() -> [ScenarioFlags; 4] {
    [
        ScenarioFlags::new(false, false),
        ScenarioFlags::new(true, false),
        ScenarioFlags::new(false, true),
        ScenarioFlags::new(true, true),
    ]
}

fn read_csv(path: &std::path::Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rdr = ::csv::Reader::from_path(path).unwrap();
    let headers = rdr.headers().unwrap().iter().map(str::to_string).collect();
    let rows = rdr
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}

#[test]
fn screen_csv_and_pdf_show_the_same_cells() {
    let set = fixture();
    let generated_on = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let dir = tempfile::tempdir().unwrap();

    for flags in all_flags() {
        let view = derive_view(&set, flags).unwrap();
        let on_screen = view.table.formatted_rows();

        let csv_path = dir.path().join(export_file_name(ExportKind::Csv, None));
        csv::write_file(&view.table, &csv_path).unwrap();
        let (headers, csv_rows) = read_csv(&csv_path);

        let doc = ReportDocument::from_view(&view, generated_on);
        let layout = pdf::layout(&doc);

        assert_eq!(headers, view.table.headers(), "{flags:?}");
        assert_eq!(csv_rows, on_screen, "{flags:?}");
        assert_eq!(layout.headers, view.table.headers(), "{flags:?}");
        assert_eq!(layout.table_cells(), on_screen, "{flags:?}");
    }
}

#[test]
fn report_follows_selected_scenario() {
    let set = fixture();
    let view = derive_view(&set, ScenarioFlags::new(true, false)).unwrap();
    let doc = ReportDocument::from_view(&view, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());

    let layout = pdf::layout(&doc);

    assert_eq!(layout.summary[0], "Escenario: Con beneficios");
    assert_eq!(layout.summary[4], "Punto de equilibrio: Año 2");
    assert_eq!(layout.page_count(), 2);
}

#[test]
fn pdf_export_is_written_under_client_name() {
    let set = fixture();
    let view = derive_view(&set, ScenarioFlags::new(true, true)).unwrap();
    let doc = ReportDocument::from_view(&view, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    let dir = tempfile::tempdir().unwrap();

    let path = dir.path().join(export_file_name(ExportKind::Pdf, Some("1234567")));
    pdf::write_file(&doc, &path).unwrap();

    assert!(path.ends_with("Informe_FV_1234567.pdf"));
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
}
