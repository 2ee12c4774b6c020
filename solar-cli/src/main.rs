use anyhow::Context;
use clap::Parser;
use tracing::debug;

use solar_cli::app::App;
use solar_cli::cli::{self, Cli};
use solar_cli::config::AppConfig;
use solar_cli::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }

    let mut config = AppConfig::load(cli.config.as_deref()).context("cannot load configuration")?;
    cli.apply_overrides(&mut config);
    debug!(?config.database, "configuration ready");

    let app = App::new(config)?;
    cli::run(&app, &cli.command).await
}
