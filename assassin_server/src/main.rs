//! Assassin chain server.
//!
//! Serves the roster upload, chain delivery and check-in API. Check-ins go to
//! PostgreSQL when `DATABASE_URL` is set and stay in memory otherwise.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use assassin::{
    checkin::{
        CheckInManager, CheckInRepository, LocalImageStore, MemoryCheckInRepository,
        PgCheckInRepository,
    },
    db::Database,
    mail::{SmtpMailer, TargetNotifier},
};
use assassin_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use pico_args::Arguments;
use tracing::{info, warn};

const HELP: &str = "\
Run the assassin chain server

USAGE:
  assassin_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:5001]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SENDER_EMAIL             Address target mail is sent from (required)
  APP_PASSWORD             SMTP app password for the sender (required)
  SMTP_HOST, SMTP_PORT     Mail relay [default: smtp.gmail.com:465]
  DATABASE_URL             PostgreSQL for check-ins [default: in memory]
  UPLOAD_DIR               Selfie directory [default: uploads]
  CORS_ORIGINS             Comma-separated allowed origins
  METRICS_BIND             Prometheus exporter address
  (See .env.example for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let bind_override: Option<SocketAddr> = pargs
        .opt_value_from_str("--bind")
        .context("Invalid --bind address")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override)?;
    config.validate()?;
    info!("Starting assassin server at {}", config.bind);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
    }

    let mailer = SmtpMailer::new(&config.mail).context("Failed to configure SMTP transport")?;
    let notifier = Arc::new(TargetNotifier::new(Arc::new(mailer)));
    info!(
        "Sending target mail as {} via {}:{}",
        config.mail.sender_email, config.mail.smtp_host, config.mail.smtp_port
    );

    let repository: Arc<dyn CheckInRepository> = match &config.database {
        Some(db_config) => {
            let db = Database::new(db_config)
                .await
                .context("Failed to connect to database")?;
            let repository = PgCheckInRepository::new(db.pool().clone());
            repository
                .ensure_schema()
                .await
                .context("Failed to prepare check-in table")?;
            info!("Database connected successfully");
            Arc::new(repository)
        }
        None => {
            warn!("DATABASE_URL not set, check-ins are kept in memory only");
            Arc::new(MemoryCheckInRepository::new())
        }
    };

    tokio::fs::create_dir_all(&config.storage.upload_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.storage.upload_dir.display()
            )
        })?;
    let images = Arc::new(LocalImageStore::new(
        config.storage.upload_dir.clone(),
        config.storage.public_base_url.clone(),
    ));

    let state = AppState {
        notifier,
        check_ins: Arc::new(CheckInManager::new(repository, images)),
        settings: config.api_settings(),
    };

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
