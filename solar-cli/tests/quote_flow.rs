use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta, Utc};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use solar_api::{ApiError, AuthError, ScenarioSource};
use solar_cli::app::{App, record_quote};
use solar_cli::cli::{explore, projection_record, run_projection, user_quotes};
use solar_cli::config::AppConfig;
use solar_cli::session::StateStore;
use solar_core::models::{FinancialParameters, Owner, QuoteKind, ScenarioSet, UserSession};
use solar_core::{Completion, Scenario, Simulator};

const RESPONSE: &str = include_str!("../../solar-core/tests/fixtures/scenario_set.json");

struct RecordedBackend;

#[async_trait]
impl ScenarioSource for RecordedBackend {
    async fn project(
        &self,
        _params: &FinancialParameters,
    ) -> Result<ScenarioSet, ApiError> {
        Ok(serde_json::from_str(RESPONSE).expect("fixture should deserialize"))
    }
}

fn config_in(dir: &Path) -> AppConfig {
    let text = format!(
        "[database]\nconnection_string = '{}'\n\n[state]\ndir = '{}'\n",
        dir.join("quotes.db").display(),
        dir.join("state").display(),
    );
    AppConfig::parse(&text).unwrap()
}

fn session() -> UserSession {
    UserSession {
        uid: "uid-42".to_string(),
        email: "ventas@example.com".to_string(),
        id_token: "id".to_string(),
        refresh_token: "refresh".to_string(),
        expires_at: Utc::now() + TimeDelta::hours(1),
    }
}

#[tokio::test]
async fn signed_in_projection_shows_up_in_history() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    StateStore::new(&config.state.dir).save_session(&session()).unwrap();
    let app = App::new(config).unwrap();

    let mut sim = Simulator::new(FinancialParameters::default());
    assert_eq!(run_projection(&mut sim, &RecordedBackend).await.unwrap(), Completion::Applied);
    let record = projection_record(&sim, app.owner().unwrap()).unwrap();
    let repo = app.repository().await.unwrap();
    assert!(record_quote(repo.as_ref(), record).await.is_some());

    // A second connection reads the same file.
    let repo = app.repository().await.unwrap();
    let quotes = user_quotes(&app.auth, repo.as_ref()).await.unwrap();

    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].owner, Owner::User("uid-42".to_string()));
    assert_eq!(quotes[0].kind, QuoteKind::Projection);
    assert_eq!(quotes[0].payback, Some(dec!(3)));
}

#[tokio::test]
async fn anonymous_quotes_are_saved_but_history_needs_sign_in() {
    let dir = tempfile::tempdir().unwrap();
    let app = App::new(config_in(dir.path())).unwrap();

    let mut sim = Simulator::new(FinancialParameters::default());
    run_projection(&mut sim, &RecordedBackend).await.unwrap();
    let owner = app.owner().unwrap();
    assert!(matches!(owner, Owner::Anonymous(_)));

    let repo = app.repository().await.unwrap();
    record_quote(repo.as_ref(), projection_record(&sim, owner).unwrap()).await;
    assert_eq!(repo.count_quotes().await.unwrap(), 1);

    let err = user_quotes(&app.auth, repo.as_ref()).await.unwrap_err();
    assert!(matches!(err.downcast_ref::<AuthError>(), Some(AuthError::NotSignedIn)));
}

#[tokio::test]
async fn explore_session_exports_the_toggled_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("con_beneficios.csv");
    let script = format!("submit\ntax on\ncsv {}\nquit\n", csv_path.display());
    let mut out = Vec::new();
    let mut sim = Simulator::new(FinancialParameters::default());

    explore(
        &mut sim,
        &RecordedBackend,
        Cursor::new(script),
        &mut out,
        NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
    )
    .await
    .unwrap();

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let header = csv.lines().next().unwrap();
    assert!(header.contains("Beneficio Depreciación"));
    assert!(header.contains("Beneficio Renta"));
    assert!(!header.contains("Costo Leasing"));
    assert!(String::from_utf8(out).unwrap().contains("con_beneficios.csv"));
}

#[tokio::test]
async fn each_export_keeps_the_scenario_selected_when_it_was_written() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.csv");
    let pdf = dir.path().join("leasing_beneficios.pdf");
    let leasing = dir.path().join("leasing.csv");
    let script = format!(
        "submit\ncsv {}\nleasing on\ntax on\npdf {}\ntax off\ncsv {}\nquit\n",
        base.display(),
        pdf.display(),
        leasing.display(),
    );
    let mut out = Vec::new();
    let mut sim = Simulator::new(FinancialParameters::default());

    explore(
        &mut sim,
        &RecordedBackend,
        Cursor::new(script),
        &mut out,
        NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
    )
    .await
    .unwrap();

    let header = |path: &Path| {
        let csv = std::fs::read_to_string(path).unwrap();
        csv.lines().next().unwrap().to_string()
    };
    let base_header = header(&base);
    assert!(!base_header.contains("Costo Leasing"));
    assert!(!base_header.contains("Beneficio Renta"));
    let leasing_header = header(&leasing);
    assert!(leasing_header.contains("Costo Leasing"));
    assert!(!leasing_header.contains("Beneficio Renta"));

    let bytes = std::fs::read(&pdf).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let out = String::from_utf8(out).unwrap();
    let exported: Vec<&str> = out.lines().filter(|l| l.starts_with("Exportado:")).collect();
    assert_eq!(
        exported,
        vec![
            format!("Exportado: {} (Sin beneficios / sin leasing)", base.display()),
            format!("Exportado: {} (Leasing + beneficios)", pdf.display()),
            format!("Exportado: {} (Con leasing)", leasing.display()),
        ]
    );
    assert_eq!(sim.flags().scenario(), Scenario::WithLeasing);
}
