use anyhow::Result;
use solar_core::models::QuoteRecord;
use solar_core::QuoteRepository;
use solar_api::AuthState;
use tracing::instrument;

use crate::app::App;
use crate::tables::build_quote_table;

/// Quotes of the signed-in user, newest first.
pub async fn user_quotes(
    auth: &AuthState,
    repo: &dyn QuoteRepository,
) -> Result<Vec<QuoteRecord>> {
    let session = auth.require_user()?;
    Ok(repo.list_quotes_for_user(&session.uid).await?)
}

#[instrument(skip_all)]
pub async fn history(app: &App) -> Result<()> {
    // Check the session before touching the database.
    app.auth.require_user()?;
    let repo = app.repository().await?;
    let quotes = user_quotes(&app.auth, repo.as_ref()).await?;

    if quotes.is_empty() {
        println!("Todavía no tienes cotizaciones guardadas.");
    } else {
        println!("{}", build_quote_table(&quotes));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use pretty_assertions::assert_eq;
    use solar_api::AuthError;
    use solar_core::models::{NewQuoteRecord, Owner, UserSession};
    use solar_db_sqlite::SqliteRepository;

    use super::*;

    async fn store() -> SqliteRepository {
        let repo = SqliteRepository::new(":memory:").await.unwrap();
        repo.run_migrations().await.unwrap();
        repo
    }

    fn session(uid: &str) -> UserSession {
        UserSession {
            uid: uid.to_string(),
            email: format!("{uid}@example.com"),
            id_token: "id".to_string(),
            refresh_token: "r".to_string(),
            expires_at: Utc::now() + TimeDelta::hours(1),
        }
    }

    #[tokio::test]
    async fn anonymous_visitors_are_turned_away() {
        let repo = store().await;

        let err = user_quotes(&AuthState::default(), &repo).await.unwrap_err();

        assert_eq!(err.downcast_ref::<AuthError>(), Some(&AuthError::NotSignedIn));
    }

    #[tokio::test]
    async fn lists_only_own_quotes() {
        let repo = store().await;
        for owner in [
            Owner::User("ana".to_string()),
            Owner::User("luis".to_string()),
            Owner::Anonymous("ana".to_string()),
            Owner::User("ana".to_string()),
        ] {
            repo.append_quote(NewQuoteRecord::projection(owner, None, serde_json::json!({})))
                .await
                .unwrap();
        }

        let quotes = user_quotes(&AuthState::new(Some(session("ana"))), &repo).await.unwrap();

        let ids: Vec<_> = quotes.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![4, 1]);
    }
}
