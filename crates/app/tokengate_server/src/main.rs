//! Tokengate server binary.
//!
//! Seeds the user table from a JSON file, registers the shared application
//! credentials, and serves `/oauth` and `/home`.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokengate_api::config::ApiConfig;
use tokengate_core::auth::clients::ClientRegistry;
use tokengate_core::auth::directory::SqlUserDirectory;
use tokengate_core::auth::tokens::TokenStore;
use tracing::{info, warn};

/// CLI arguments; every flag falls back to its environment variable.
#[derive(Parser, Debug)]
#[command(name = "tokengate_server", about = "OAuth2 password-grant token server")]
struct Args {
    /// Database driver. Only `sqlite` is supported.
    #[arg(long, env = "DB_DRIVER", default_value = "sqlite")]
    db_driver: String,

    /// Database name (SQLite file path).
    #[arg(long, env = "DB_NAME", default_value = "tokengate.db")]
    db_name: String,

    /// Shared application (client) id.
    #[arg(long, env = "APP_ID")]
    app_id: String,

    /// Shared application (client) secret.
    #[arg(long, env = "APP_SECRET", hide_env_values = true)]
    app_secret: String,

    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    bind_addr: String,

    /// JSON array of `{id, username, email, password}` to seed at startup.
    #[arg(long, env = "SEED_FILE", default_value = "seedUsers.json")]
    seed_file: String,

    /// Accept token requests as GET with query parameters.
    #[arg(
        long,
        env = "ALLOW_GET_ACCESS_REQUEST",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    allow_get_access_request: bool,

    /// Seconds between expired-token sweeps (0 = never sweep).
    #[arg(long, env = "TOKEN_SWEEP_SECS", default_value_t = 60)]
    token_sweep_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tokengate_api=debug,tokengate_core=debug".into()),
        )
        .init();

    if let Err(e) = dotenv {
        // Plain environment variables still apply.
        warn!("no .env file loaded: {e}");
    }

    let args = Args::parse();

    info!(
        db_driver = %args.db_driver,
        db_name = %args.db_name,
        bind_addr = %args.bind_addr,
        "starting tokengate_server"
    );

    let seed = tokengate_core::seed::load_seed_file(&args.seed_file).await?;
    let pool = tokengate_core::db::connect(&args.db_driver, &args.db_name).await?;
    tokengate_core::seed::seed_users(&pool, &seed).await?;
    let directory = SqlUserDirectory::new(pool);

    // Client registry is filled from the directory snapshot before the
    // listener starts and is read-only afterwards.
    let users = directory.list_users().await?;

    let config = ApiConfig {
        bind_addr: args.bind_addr,
        app_id: args.app_id,
        app_secret: args.app_secret,
        allow_get_access_request: args.allow_get_access_request,
    };

    let clients = ClientRegistry::from_users(&config.app_id, &config.app_secret, users.iter());
    if clients.is_empty() {
        warn!(seed_file = %args.seed_file, "no users seeded; every token request will be rejected");
    }
    if let Some(client) = clients.get(&config.app_id) {
        info!(
            clients = clients.len(),
            users = users.len(),
            client_id = %client.id,
            bound_user_id = %client.bound_user_id,
            "client registry ready"
        );
    }

    tokengate_core::auth::password::warm_up();

    let tokens = Arc::new(TokenStore::new());
    if args.token_sweep_secs > 0 {
        tokens.spawn_cleanup_task(Duration::from_secs(args.token_sweep_secs));
    }

    let state = tokengate_api::AppState {
        directory: Arc::new(directory),
        clients: Arc::new(clients),
        tokens,
        config: config.clone(),
    };

    let app = tokengate_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
