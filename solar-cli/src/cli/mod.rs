mod account;
mod explore;
mod export;
mod history;
mod simulate;
mod size;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use solar_core::Simulator;

pub use self::account::LoginArgs;
pub use self::explore::{ExploreArgs, explore};
pub use self::export::{ExportArgs, render_view};
pub use self::history::user_quotes;
pub use self::simulate::{SimulateArgs, projection_record, run_projection};
pub use self::size::SizeArgs;
use crate::app::App;
use crate::config::AppConfig;

/// Photovoltaic sizing and financial projection for RED SOL Colombia quotes.
#[derive(Debug, Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to `solar-quote.toml` when present).
    #[arg(long, env = "SOLAR_QUOTE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Database backend for the quote history.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Database connection string.
    /// For SQLite this is a file path (e.g. `quotes.db`) or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Log filter, e.g. `debug` or `solar_api=trace`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also append logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Project the four financing scenarios and show one of them.
    Simulate(Box<SimulateArgs>),

    /// Submit once, then switch scenarios and export interactively.
    Explore(Box<ExploreArgs>),

    /// Size an installation from a bill or a monthly consumption.
    Size(Box<SizeArgs>),

    /// Sign in with email and password.
    Login(LoginArgs),

    /// Forget the stored session.
    Logout,

    /// Show the current session.
    Whoami,

    /// List your saved quotes (requires sign-in).
    History,
}

impl Cli {
    /// Command-line values take precedence over the file.
    pub fn apply_overrides(
        &self,
        config: &mut AppConfig,
    ) {
        if let Some(backend) = &self.backend {
            config.database.backend = backend.clone();
        }
        if let Some(db) = &self.db {
            config.database.connection_string = db.clone();
        }
    }
}

pub async fn run(
    app: &App,
    command: &Command,
) -> Result<()> {
    match command {
        Command::Simulate(args) => simulate::simulate(app, args).await,
        Command::Explore(args) => {
            let client = app.financial_client()?;
            let mut sim = Simulator::new(args.params.resolve()?);
            explore(&mut sim, &client, io::stdin().lock(), io::stdout(), Local::now().date_naive())
                .await
        }
        Command::Size(args) => size::size(app, args).await,
        Command::Login(args) => account::login(app, args).await,
        Command::Logout => account::logout(app).await,
        Command::Whoami => account::whoami(app),
        Command::History => history::history(app).await,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use solar_api::{ApiError, ScenarioSource, Service};
    use solar_core::{FinancialParameters, ScenarioSet};

    use super::*;

    const RESPONSE: &str = include_str!("../../../solar-core/tests/fixtures/scenario_set.json");

    pub fn fixture() -> ScenarioSet {
        serde_json::from_str(RESPONSE).expect("fixture should deserialize")
    }

    /// Answers every request with the recorded response.
    pub struct FixtureSource;

    #[async_trait]
    impl ScenarioSource for FixtureSource {
        async fn project(
            &self,
            _params: &FinancialParameters,
        ) -> Result<ScenarioSet, ApiError> {
            Ok(fixture())
        }
    }

    pub struct FailingSource;

    #[async_trait]
    impl ScenarioSource for FailingSource {
        async fn project(
            &self,
            _params: &FinancialParameters,
        ) -> Result<ScenarioSet, ApiError> {
            Err(ApiError::Status {
                service: Service::Calculation,
                status: 500,
                body: "boom".to_string(),
            })
        }
    }

    #[test]
    fn simulate_flags_parse() {
        let cli = Cli::try_parse_from([
            "solar-quote",
            "simulate",
            "--capex",
            "83,000,000",
            "--discount-rate",
            "12",
            "--tax-benefit",
            "--pdf",
            "--db",
            ":memory:",
        ])
        .unwrap();

        let Command::Simulate(args) = &cli.command else {
            panic!("expected simulate");
        };
        assert!(args.tax_benefit);
        assert!(!args.leasing);
        assert_eq!(args.export.pdf, Some(None));
        let params = args.params.resolve().unwrap();
        assert_eq!(params.capex, rust_decimal_macros::dec!(83000000));
        assert_eq!(params.discount_rate, rust_decimal_macros::dec!(0.12));

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.database.connection_string, ":memory:");
        assert_eq!(config.database.backend, "sqlite");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
