//! Wiring shared by every command: configuration, state files, the session
//! observer and factories for the remote clients and the quote store.

use anyhow::{Context, Result};
use solar_api::{FinancialClient, FirebaseIdentity, SizingClient};
use solar_api::AuthState;
use solar_core::db::{DbConfig, RepositoryRegistry};
use solar_core::models::{NewQuoteRecord, Owner, QuoteRecord};
use solar_core::QuoteRepository;
use solar_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::session::StateStore;

/// Every database backend this binary ships with.
pub fn build_registry() -> RepositoryRegistry {
    RepositoryRegistry::new().with(Box::new(SqliteRepositoryFactory))
}

pub struct App {
    pub config: AppConfig,
    pub state: StateStore,
    pub auth: AuthState,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let state = StateStore::new(&config.state.dir);
        let session = state.load_session()?;
        if let Some(session) = &session {
            debug!(uid = %session.uid, "restored session");
        }
        Ok(Self {
            config,
            state,
            auth: AuthState::new(session),
        })
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::from(&self.config.database)
    }

    pub async fn repository(&self) -> Result<Box<dyn QuoteRepository>> {
        let db_config = self.db_config();
        debug!("connecting to {} backend", db_config.backend);
        build_registry()
            .create(&db_config)
            .await
            .with_context(|| format!("cannot open quote store '{}'", db_config.connection_string))
    }

    pub fn financial_client(&self) -> Result<FinancialClient> {
        FinancialClient::new(&self.config.api.calc_base_url, self.config.api.timeout())
            .context("cannot build the calculation client")
    }

    pub fn sizing_client(&self) -> Result<SizingClient> {
        SizingClient::new(
            &self.config.api.sizing_base_url,
            self.config.api.timeout(),
            self.config.upload.max_bill_bytes,
        )
        .context("cannot build the sizing client")
    }

    pub fn identity(&self) -> Result<FirebaseIdentity> {
        FirebaseIdentity::new(
            &self.config.identity.endpoint,
            self.config.identity.api_key.clone(),
            self.config.api.timeout(),
        )
        .context("cannot build the identity client")
    }

    /// Signed-in user, or this machine's anonymous visitor.
    pub fn owner(&self) -> Result<Owner> {
        self.state.owner(self.auth.current().as_ref())
    }
}

/// Appends a quote without ever failing the command that produced it.
pub async fn record_quote(
    repo: &dyn QuoteRepository,
    record: NewQuoteRecord,
) -> Option<QuoteRecord> {
    let kind = record.kind;
    match repo.append_quote(record).await {
        Ok(saved) => {
            info!(id = saved.id, kind = kind.as_str(), "quote saved");
            Some(saved)
        }
        Err(e) => {
            error!(kind = kind.as_str(), error = %e, "could not save quote");
            None
        }
    }
}
