//! Execsuite session CLI.
//!
//! A small companion tool for the Execsuite client library: sign in, check
//! whether the persisted session is still accepted by the server, and sign
//! out. Useful when debugging a deployment without a full UI in front of
//! the API.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use execsuite::api::SessionClient;
use execsuite::auth::{FileStore, SessionStore, StaticNavigator};
use execsuite::config::Config;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("Execsuite CLI starting");

    let config = Config::load()?;
    let cache_dir = config.cache_dir()?;
    let store = Arc::new(FileStore::new(cache_dir).context("Failed to open session store")?);
    let navigator = Arc::new(StaticNavigator::new());
    let client = SessionClient::new(config, store, navigator)?;

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        None | Some("status") => status(&client).await,
        Some("login") => {
            let email = args
                .get(2)
                .context("Usage: execsuite login <email>")?;
            login(&client, email).await
        }
        Some("logout") => {
            client.logout();
            println!("Signed out.");
            Ok(())
        }
        Some(other) => {
            anyhow::bail!("Unknown command '{other}'. Commands: status, login <email>, logout")
        }
    }
}

async fn status(client: &SessionClient) -> Result<()> {
    if !client.token_is_valid().await {
        println!("Not signed in.");
        return Ok(());
    }

    match client.me().await {
        Ok(profile) => {
            println!("Signed in as {} (user id {})", profile.email, profile.id);
            if profile.is_superuser {
                println!("Superuser account");
            }
        }
        Err(e) => {
            // The probe passed but the fresh fetch failed; fall back to the
            // cached identity rather than claiming the session is gone.
            match client.store().profile() {
                Some(profile) => {
                    println!("Signed in as {} (cached; profile fetch failed: {e})", profile.email)
                }
                None => println!("Session accepted but no profile available: {e}"),
            }
        }
    }
    Ok(())
}

async fn login(client: &SessionClient, email: &str) -> Result<()> {
    let password = prompt_password()?;
    let login = client
        .login(email, &password)
        .await
        .context("Login failed")?;

    println!("Signed in as {} (user id {})", login.email, login.user_id);
    if let Some(path) = client.take_return_path() {
        println!("Return to: {path}");
    }
    Ok(())
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    let mut password = String::new();
    io::stdin()
        .read_line(&mut password)
        .context("Failed to read password")?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
