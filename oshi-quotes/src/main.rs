//! oshi-quotes - lyric quote board
//!
//! `serve` (the default) runs the web site. `add-user` and `remove-user`
//! manage accounts from the command line; there is no sign-up page.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oshi_common::config::{RootFolderInitializer, RootFolderResolver, ServerSettings, TomlConfig};
use oshi_common::db::{init_database, users};
use oshi_quotes::{build_router, AppState};
use sqlx::SqlitePool;
use tokio::signal;
use tracing::{error, info, warn};

/// Command-line arguments for oshi-quotes
#[derive(Parser, Debug)]
#[command(name = "oshi-quotes")]
#[command(about = "Share favourite lyric lines with the artist and song title")]
#[command(version)]
struct Args {
    /// Folder holding oshi_quotes.db (overrides OSHI_ROOT_FOLDER and config.toml)
    #[arg(long, global = true)]
    root_folder: Option<PathBuf>,

    /// Config file to read instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web server
    Serve,
    /// Create an account
    AddUser {
        username: String,
        #[arg(long, env = "OSHI_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Delete an account together with its quotes and sessions
    RemoveUser { username: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, config_error) = TomlConfig::load_or_default(args.config.as_deref());

    let mut settings = ServerSettings::from_config(&config);
    if let Some(bind) = args.bind.clone() {
        settings.bind = bind;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(level) = args.log_level.clone() {
        settings.log_level = level;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .init();

    info!(
        "Starting oshi-quotes v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(e) = config_error {
        warn!("Ignoring config file: {}", e);
    }

    let resolver = RootFolderResolver::new(args.root_folder.clone(), &config);
    let initializer = RootFolderInitializer::new(resolver.resolve());
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(pool, settings).await,
        Command::AddUser { username, password } => {
            let user = users::create_user(&pool, &username, &password)
                .await
                .with_context(|| format!("Failed to add user {:?}", username))?;
            info!("Added user {} (id {})", user.username, user.id);
            Ok(())
        }
        Command::RemoveUser { username } => {
            let quotes = users::delete_user(&pool, &username)
                .await
                .with_context(|| format!("Failed to remove user {:?}", username))?;
            info!("Removed user {} and {} quote(s)", username, quotes);
            Ok(())
        }
    }
}

async fn serve(pool: SqlitePool, settings: ServerSettings) -> Result<()> {
    let state = AppState::new(pool, settings.session_ttl);
    let app = build_router(state);

    let addr = settings.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("oshi-quotes listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
