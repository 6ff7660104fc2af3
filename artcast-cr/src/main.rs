//! Artcast Content Review (artcast-cr) - Main entry point
//!
//! Runs the submission review and publishing microservice: staff upload
//! images, an administrator approves or rejects them, approved items are
//! pushed to the external signage CMS.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use artcast_cr::assets::AssetStore;
use artcast_cr::config::Config;
use artcast_cr::services::cms::CmsClient;
use artcast_cr::{build_router, db, AppState};

/// Command-line arguments for artcast-cr
#[derive(Parser, Debug)]
#[command(name = "artcast-cr")]
#[command(about = "Content Review microservice for Artcast")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "artcast.toml", env = "ARTCAST_CONFIG")]
    config: PathBuf,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "ARTCAST_PORT")]
    port: Option<u16>,

    /// Data root folder holding the database and uploads (overrides the
    /// config file)
    #[arg(short, long, env = "ARTCAST_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artcast_cr=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    config.apply_env_overrides();
    config.apply_overrides(args.port, args.root_folder);

    info!(
        "Starting Artcast Content Review (artcast-cr) v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Root folder: {}", config.root_folder.display());

    let db_path = config.root_folder.join("artcast.db");
    let pool = db::init_database_pool(&db_path)
        .await
        .context("Failed to initialize database")?;

    let session_secret = db::settings::load_session_secret(&pool)
        .await
        .context("Failed to load session secret")?;

    if let Some(admin) = &config.admin {
        db::admins::ensure_admin(&pool, &admin.username, &admin.password)
            .await
            .context("Failed to bootstrap administrator account")?;
    }

    let cms = CmsClient::new(&config.cms).context("Failed to build CMS client")?;

    let state = AppState {
        db: pool,
        assets: AssetStore::new(config.root_folder.clone()),
        cms: Arc::new(cms),
        publish_target: config.cms.publish_target(),
        session_secret,
    };

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
