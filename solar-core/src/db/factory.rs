use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::debug;

use super::repository::{QuoteRepository, RepositoryError};

/// Where quotes are stored.
///
/// `backend` selects a registered [`RepositoryFactory`]; `connection_string`
/// is handed to it as is. For `sqlite` that is a file path, a `sqlite:` URL
/// or `:memory:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl DbConfig {
    pub fn sqlite(location: impl Into<String>) -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: location.into(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::sqlite(":memory:")
    }
}

/// Opens a [`QuoteRepository`] for one storage backend.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Connects and returns a repository whose schema is current.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn QuoteRepository>, RepositoryError>;
}

/// Backends compiled into the binary, keyed by name.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: BTreeMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a backend. A later factory with the same name wins.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    pub fn with(
        mut self,
        factory: Box<dyn RepositoryFactory>,
    ) -> Self {
        self.register(factory);
        self
    }

    /// Registered backend names in alphabetical order.
    pub fn available_backends(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Opens the store named by `config.backend`.
    ///
    /// Fails with [`RepositoryError::Configuration`] when no such backend is
    /// registered; otherwise returns whatever the factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn QuoteRepository>, RepositoryError> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            return Err(RepositoryError::Configuration(format!(
                "no quote store backend named '{}' (known: {})",
                config.backend,
                self.available_backends().join(", ")
            )));
        };
        debug!(backend = %config.backend, "opening quote store");
        factory.create(config).await
    }
}
