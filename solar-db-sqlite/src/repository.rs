use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use solar_core::{NewQuoteRecord, Owner, QuoteKind, QuoteRecord, QuoteRepository, RepositoryError};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::debug;

use crate::decimal::{get_optional_count, get_optional_decimal, optional_decimal_to_f64};

const MEMORY: &str = ":memory:";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens `location`, creating the file if needed.
    ///
    /// `location` is a bare path (`quotes.db`), a `sqlite:` URL, or `:memory:`.
    /// An in-memory database is held on a single connection so every query
    /// sees the same data.
    pub async fn new(location: &str) -> Result<Self> {
        let (url, max_connections) = if location == MEMORY {
            ("sqlite::memory:".to_string(), 1)
        } else if location.starts_with("sqlite:") {
            (location.to_string(), 5)
        } else {
            (format!("sqlite://{location}"), 5)
        };

        let options = SqliteConnectOptions::from_str(&url)
            .with_context(|| format!("Invalid database location: {}", location))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", location))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn get_quote(
        &self,
        id: i64,
    ) -> Result<QuoteRecord, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, owner_kind, owner_id, kind, power_kwp, panel_count, total_price,
                    npv, irr, payback, payload, created_at
             FROM quote WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?
        .ok_or(RepositoryError::NotFound)?;

        row_to_quote(&row)
    }
}

fn row_to_quote(row: &SqliteRow) -> Result<QuoteRecord, RepositoryError> {
    let text = |column: &str| -> Result<String, RepositoryError> {
        row.try_get(column)
            .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", column, e)))
    };

    let owner_kind = text("owner_kind")?;
    let owner = Owner::parse(&owner_kind, text("owner_id")?).ok_or_else(|| {
        RepositoryError::Database(format!("Unknown owner kind '{}'", owner_kind))
    })?;
    let kind_text = text("kind")?;
    let kind = QuoteKind::parse(&kind_text)
        .ok_or_else(|| RepositoryError::Database(format!("Unknown quote kind '{}'", kind_text)))?;
    let payload = serde_json::from_str(&text("payload")?)
        .map_err(|e| RepositoryError::Database(format!("Invalid payload JSON: {}", e)))?;

    Ok(QuoteRecord {
        id: row
            .try_get("id")
            .map_err(|e| RepositoryError::Database(e.to_string()))?,
        owner,
        kind,
        power_kwp: get_optional_decimal(row, "power_kwp")?,
        panel_count: get_optional_count(row, "panel_count")?,
        total_price: get_optional_decimal(row, "total_price")?,
        npv: get_optional_decimal(row, "npv")?,
        irr: get_optional_decimal(row, "irr")?,
        payback: get_optional_decimal(row, "payback")?,
        payload,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
    })
}

#[async_trait]
impl QuoteRepository for SqliteRepository {
    async fn append_quote(
        &self,
        quote: NewQuoteRecord,
    ) -> Result<QuoteRecord, RepositoryError> {
        let payload = serde_json::to_string(&quote.payload)
            .map_err(|e| RepositoryError::Database(format!("Failed to encode payload: {}", e)))?;

        let result = sqlx::query(
            "INSERT INTO quote (
                owner_kind, owner_id, kind, power_kwp, panel_count, total_price,
                npv, irr, payback, payload, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(quote.owner.kind())
        .bind(quote.owner.id())
        .bind(quote.kind.as_str())
        .bind(optional_decimal_to_f64(quote.power_kwp))
        .bind(quote.panel_count.map(i64::from))
        .bind(optional_decimal_to_f64(quote.total_price))
        .bind(optional_decimal_to_f64(quote.npv))
        .bind(optional_decimal_to_f64(quote.irr))
        .bind(optional_decimal_to_f64(quote.payback))
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        debug!(id, kind = quote.kind.as_str(), owner = quote.owner.kind(), "quote stored");
        self.get_quote(id).await
    }

    async fn list_quotes_for_user(
        &self,
        uid: &str,
    ) -> Result<Vec<QuoteRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, owner_kind, owner_id, kind, power_kwp, panel_count, total_price,
                    npv, irr, payback, payload, created_at
             FROM quote
             WHERE owner_kind = 'user' AND owner_id = ?
             ORDER BY created_at DESC, id DESC",
        )
        .bind(uid)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_quote).collect()
    }

    async fn count_quotes(&self) -> Result<i64, RepositoryError> {
        sqlx::query("SELECT COUNT(*) AS n FROM quote")
            .fetch_one(&self.pool)
            .await
            .and_then(|row| row.try_get("n"))
            .map_err(|e| RepositoryError::Database(e.to_string()))
    }
}
