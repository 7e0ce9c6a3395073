//! Command-line driver for the portal session core.
//!
//! Talks to the real email-verification service and keeps the session token
//! in a file, so a sign-in survives between invocations the way the browser
//! keeps it in `localStorage`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use portal_auth::config::{ConfigError, PortalConfig, parse_base_url};
use portal_auth::http::HttpAccessService;
use portal_auth::validate::{EmailError, validate_email};
use portal_auth::{
    AccessService, Clock, FileSlot, Identity, ServiceError, Session, SessionStore, SystemClock, TokenError, token,
};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Email(#[from] EmailError),
    #[error("email service error: {0}")]
    Service(#[from] ServiceError),
    #[error("token rejected: {0}")]
    Token(#[from] TokenError),
    #[error("sign-in link was not accepted")]
    VerifyRejected,
    #[error("not signed in")]
    NotAuthenticated,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "portal-cli", about = "School portal sign-in CLI")]
struct Cli {
    /// Overrides `PORTAL_API_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    #[arg(long, env = "PORTAL_TOKEN_FILE", default_value = ".portal-token")]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Email a sign-in link.
    RequestAccess {
        #[arg(long)]
        email: String,
    },
    /// Exchange the link token for a session token and store it.
    Verify {
        #[arg(long)]
        token: String,
        #[arg(long)]
        email: String,
    },
    /// Show the stored session, purging it if expired or malformed.
    Status,
    Logout,
    /// Decode a token without storing it.
    Decode { token: String },
    /// Print the `Authorization` header value for the stored session.
    Bearer,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = load_config(cli.base_url.as_deref())?;
    tracing::debug!(base_url = %config.api_base_url, token_file = %cli.token_file.display(), "cli configured");
    let mut store = SessionStore::new(FileSlot::new(cli.token_file), SystemClock);

    match cli.command {
        Command::RequestAccess { email } => {
            let email = validate_email(&email)?;
            let service = HttpAccessService::new(&config)?;
            let message = service.request_access(&email).await?;
            println!("{}", message.unwrap_or_else(|| "sign-in link sent".to_owned()));
        }
        Command::Verify { token, email } => {
            let email = validate_email(&email)?;
            let service = HttpAccessService::new(&config)?;
            if !store.verify_login_token(&service, token.trim(), &email).await {
                return Err(CliError::VerifyRejected);
            }
            print_json(&session_report(store.session()))?;
        }
        Command::Status => print_json(&session_report(store.session()))?,
        Command::Logout => {
            store.logout();
            println!("logged out");
        }
        Command::Decode { token: raw } => {
            let identity = token::decode(raw.trim())?;
            let expired = identity.is_expired_at(SystemClock.now_millis());
            print_json(&identity_report(&identity, expired))?;
        }
        Command::Bearer => println!("{}", store.bearer_token().ok_or(CliError::NotAuthenticated)?),
    }
    Ok(())
}

fn load_config(base_url: Option<&str>) -> Result<PortalConfig, ConfigError> {
    let mut config = PortalConfig::from_env()?;
    if let Some(url) = base_url {
        config.api_base_url = parse_base_url(Some(url))?;
    }
    Ok(config)
}

fn identity_report(identity: &Identity, expired: bool) -> Value {
    json!({
        "email": identity.subject_email,
        "person_id": identity.person_id,
        "roles": identity.roles,
        "issued_at": identity.issued_at,
        "expires_at": identity.expires_at,
        "expired": expired,
    })
}

fn session_report(session: &Session) -> Value {
    match session.identity() {
        Some(identity) => json!({ "authenticated": true, "identity": identity_report(identity, false) }),
        None => json!({ "authenticated": false }),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
