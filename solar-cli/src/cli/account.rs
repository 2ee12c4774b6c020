use anyhow::Result;
use clap::Args;
use solar_api::{AuthState, IdentityProvider};
use solar_core::UserSession;
use tracing::{info, instrument};

use crate::app::App;
use crate::session::StateStore;

#[derive(Debug, Clone, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, env = "SOLAR_QUOTE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Signs in and persists the session for later commands.
pub async fn sign_in(
    auth: &AuthState,
    store: &StateStore,
    provider: &dyn IdentityProvider,
    email: &str,
    password: &str,
) -> Result<UserSession> {
    let session = auth.sign_in(provider, email.trim(), password).await?;
    store.save_session(&session)?;
    Ok(session)
}

pub async fn sign_out(
    auth: &AuthState,
    store: &StateStore,
    provider: &dyn IdentityProvider,
) -> Result<()> {
    auth.sign_out(provider).await?;
    store.clear_session()
}

#[instrument(skip_all)]
pub async fn login(
    app: &App,
    args: &LoginArgs,
) -> Result<()> {
    let identity = app.identity()?;
    let session = sign_in(&app.auth, &app.state, &identity, &args.email, &args.password).await?;
    println!("Sesión iniciada como {}", session.email);
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    let identity = app.identity()?;
    sign_out(&app.auth, &app.state, &identity).await?;
    println!("Sesión cerrada.");
    Ok(())
}

pub fn whoami(app: &App) -> Result<()> {
    match app.auth.current() {
        Some(session) => println!("{} ({})", session.email, session.uid),
        None => {
            let id = app.state.anonymous_id()?;
            info!(%id, "no active session");
            println!("Sin sesión. Visitante anónimo {id}");
        }
    }
    Ok(())
}
