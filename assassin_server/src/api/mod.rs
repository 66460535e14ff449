//! HTTP API for the assassin server.
//!
//! # Modules
//!
//! - [`chains`]: Roster upload, chain generation and target mail delivery
//! - [`check_ins`]: Selfie check-ins
//! - [`cors`]: Origin allow-list with wildcard hosts
//! - [`request_id`]: Request correlation and HTTP metrics
//! - [`error`]: Error to response mapping
//!
//! # Endpoints Overview
//!
//! ## Chains
//! - `POST /api/v1/chains` - Generate a chain from a CSV roster
//! - `POST /api/v1/chains/deliver` - Mail a previously generated chain
//!
//! ## Check-ins
//! - `POST /api/v1/check-ins` - Record a selfie check-in
//! - `GET /api/v1/check-ins` - List check-ins
//! - `GET /uploads/{key}` - Stored selfies
//!
//! ## Health Check
//! - `GET /health` - Server health status
//! - `GET /api/test` - Liveness check for the web client
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use assassin::checkin::{CheckInManager, LocalImageStore, MemoryCheckInRepository};
//! use assassin::mail::{MailConfig, SmtpMailer, TargetNotifier};
//! use assassin_server::api::{ApiSettings, AppState, create_router};
//! use std::sync::Arc;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let mailer = SmtpMailer::new(&MailConfig::gmail("game@gmail.com", "app-password"))?;
//! let state = AppState {
//!     notifier: Arc::new(TargetNotifier::new(Arc::new(mailer))),
//!     check_ins: Arc::new(CheckInManager::new(
//!         Arc::new(MemoryCheckInRepository::new()),
//!         Arc::new(LocalImageStore::new("uploads", "http://localhost:5001/uploads")),
//!     )),
//!     settings: ApiSettings::default(),
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod chains;
pub mod check_ins;
pub mod cors;
pub mod error;
pub mod request_id;

use assassin::{checkin::CheckInManager, mail::TargetNotifier};
use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{services::ServeDir, timeout::TimeoutLayer};

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; everything heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub notifier: Arc<TargetNotifier>,
    pub check_ins: Arc<CheckInManager>,
    pub settings: ApiSettings,
}

/// Router-level settings
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
    /// Requests running longer are answered with `408`
    pub request_timeout: Duration,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
    /// Directory served under `/uploads`, if any
    pub upload_dir: Option<PathBuf>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout: Duration::from_secs(120),
            max_upload_bytes: 10 * 1024 * 1024,
            upload_dir: None,
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Endpoint Summary
///
/// ## API v1
/// ```text
/// GET  /health                  - Health check
/// GET  /api/test                - Liveness check
/// POST /api/v1/chains           - Generate (and optionally mail) a chain
/// POST /api/v1/chains/deliver   - Mail an existing chain
/// POST /api/v1/check-ins        - Record a check-in
/// GET  /api/v1/check-ins        - List check-ins
/// GET  /uploads/{key}           - Stored selfies
/// ```
///
/// ## Legacy Routes (Deprecated)
/// ```text
/// POST /generate                - Use /api/v1/chains
/// POST /generate-chain          - Use /api/v1/chains with notify=false&reveal=full
/// POST /send-emails             - Use /api/v1/chains/deliver
/// POST /check-in                - Use /api/v1/check-ins
/// GET  /check-ins               - Use /api/v1/check-ins
/// ```
pub fn create_router(state: AppState) -> Router {
    let settings = state.settings.clone();

    let v1_routes = Router::new()
        .route("/chains", post(chains::create_chain))
        .route("/chains/deliver", post(chains::deliver_chain))
        .route(
            "/check-ins",
            post(check_ins::submit_check_in).get(check_ins::list_check_ins),
        );

    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/api/test", get(api_test))
        .nest("/api/v1", v1_routes)
        .route("/generate", post(chains::generate_game))
        .route("/generate-chain", post(chains::generate_chain_only))
        .route("/send-emails", post(chains::deliver_chain))
        .route("/check-in", post(check_ins::submit_check_in))
        .route("/check-ins", get(check_ins::list_check_ins));

    if let Some(dir) = &settings.upload_dir {
        router = router.nest_service("/uploads", ServeDir::new(dir));
    }

    #[allow(deprecated)]
    let timeout = TimeoutLayer::new(settings.request_timeout);

    router
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(timeout)
        .layer(cors::cors_layer(&settings.cors_origins))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the check-in store answers, `503 Service Unavailable`
/// otherwise.
///
/// # Example
///
/// ```bash
/// curl http://localhost:5001/health
/// # {"status":"healthy","version":"1.0.0","check_ins":true,"timestamp":"2026-03-01T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = state.check_ins.ping().await.is_ok();

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "check_ins": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}

async fn api_test() -> Json<serde_json::Value> {
    Json(json!({ "message": "API is working!" }))
}
