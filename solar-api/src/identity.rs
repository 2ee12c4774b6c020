//! Email/password identity backed by the Firebase Identity Toolkit REST API,
//! and the observable session state that gates private commands.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use solar_core::UserSession;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::client::{self, endpoint};

pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Shown for every sign-in failure; the cause is only logged.
    #[error("Usuario o contraseña incorrectos")]
    InvalidCredentials,

    #[error("sign in first to see this page")]
    NotSignedIn,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserSession, AuthError>;

    async fn sign_out(
        &self,
        session: &UserSession,
    ) -> Result<(), AuthError>;
}

pub struct FirebaseIdentity {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl FirebaseIdentity {
    pub fn new(
        endpoint_base: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, crate::ApiError> {
        Ok(Self {
            client: client::try_new(timeout)?,
            endpoint: endpoint(endpoint_base, "v1/accounts:signInWithPassword"),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    id_token: String,
    refresh_token: String,
    /// Seconds, sent as a string.
    expires_in: String,
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    #[instrument(skip_all)]
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserSession, AuthError> {
        let Some(api_key) = &self.api_key else {
            warn!("identity api key is not configured");
            return Err(AuthError::InvalidCredentials);
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&SignInRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| {
                debug!(error = %e, "identity request failed");
                AuthError::InvalidCredentials
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            debug!(error = %e, "identity response unreadable");
            AuthError::InvalidCredentials
        })?;

        let session = parse_sign_in(status, &body, Utc::now())?;
        info!(uid = %session.uid, "signed in");
        Ok(session)
    }

    async fn sign_out(
        &self,
        session: &UserSession,
    ) -> Result<(), AuthError> {
        // Tokens are bearer tokens; forgetting them locally ends the session.
        info!(uid = %session.uid, "signed out");
        Ok(())
    }
}

/// Maps a raw sign-in response to a session, hiding every failure cause.
pub fn parse_sign_in(
    status: StatusCode,
    body: &str,
    now: DateTime<Utc>,
) -> Result<UserSession, AuthError> {
    if !status.is_success() {
        debug!(status = status.as_u16(), body, "sign-in rejected");
        return Err(AuthError::InvalidCredentials);
    }

    let response: SignInResponse = serde_json::from_str(body).map_err(|e| {
        debug!(error = %e, "sign-in response malformed");
        AuthError::InvalidCredentials
    })?;
    let seconds: i64 = response.expires_in.parse().map_err(|_| {
        debug!(expires_in = %response.expires_in, "sign-in expiry malformed");
        AuthError::InvalidCredentials
    })?;
    let expires_at = TimeDelta::try_seconds(seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            debug!(seconds, "sign-in expiry out of range");
            AuthError::InvalidCredentials
        })?;

    Ok(UserSession {
        uid: response.local_id,
        email: response.email,
        id_token: response.id_token,
        refresh_token: response.refresh_token,
        expires_at,
    })
}

/// Current session, observable by anything that needs to react to sign-in
/// and sign-out.
#[derive(Debug)]
pub struct AuthState {
    tx: watch::Sender<Option<UserSession>>,
}

impl AuthState {
    pub fn new(initial: Option<UserSession>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<UserSession>> {
        self.tx.subscribe()
    }

    /// The session if one exists and has not expired.
    pub fn current(&self) -> Option<UserSession> {
        self.current_at(Utc::now())
    }

    pub fn current_at(
        &self,
        now: DateTime<Utc>,
    ) -> Option<UserSession> {
        self.tx
            .borrow()
            .as_ref()
            .filter(|s| !s.is_expired_at(now))
            .cloned()
    }

    /// Gate for private views.
    pub fn require_user(&self) -> Result<UserSession, AuthError> {
        self.current().ok_or(AuthError::NotSignedIn)
    }

    pub async fn sign_in(
        &self,
        provider: &dyn IdentityProvider,
        email: &str,
        password: &str,
    ) -> Result<UserSession, AuthError> {
        let session = provider.sign_in(email, password).await?;
        self.tx.send_replace(Some(session.clone()));
        Ok(session)
    }

    pub async fn sign_out(
        &self,
        provider: &dyn IdentityProvider,
    ) -> Result<(), AuthError> {
        let previous = self.tx.send_replace(None);
        if let Some(session) = previous {
            provider.sign_out(&session).await?;
        }
        Ok(())
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new(None)
    }
}
