//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.
//! Nothing outside this module reads the process environment.

use crate::api::ApiSettings;
use assassin::{
    db::DatabaseConfig,
    mail::{MailConfig, is_valid_address},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Outgoing mail configuration
    pub mail: MailConfig,
    /// Check-in image storage configuration
    pub storage: StorageConfig,
    /// Database configuration; check-ins stay in memory without it
    pub database: Option<DatabaseConfig>,
    /// HTTP surface configuration
    pub http: HttpConfig,
    /// Prometheus exporter address, disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

/// Image storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory selfies are written to
    pub upload_dir: PathBuf,
    /// URL prefix under which stored selfies are served
    pub public_base_url: String,
    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

/// HTTP configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Allowed CORS origins; `*` wildcards allowed in the host part
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("Not a socket address: {raw}"),
                })?,
                Err(_) => SocketAddr::from(([127, 0, 0, 1], 5001)),
            },
        };

        // Mail credentials (REQUIRED)
        let sender_email =
            std::env::var("SENDER_EMAIL").map_err(|_| ConfigError::MissingRequired {
                var: "SENDER_EMAIL".to_string(),
                hint: "Address target mail is sent from, e.g. game@gmail.com".to_string(),
            })?;

        let app_password =
            std::env::var("APP_PASSWORD").map_err(|_| ConfigError::MissingRequired {
                var: "APP_PASSWORD".to_string(),
                hint: "Create an app password for the sender account".to_string(),
            })?;

        let mail = MailConfig {
            smtp_host: std::env::var("SMTP_HOST")
                .unwrap_or_else(|_| MailConfig::DEFAULT_HOST.to_string()),
            smtp_port: parse_env_or("SMTP_PORT", MailConfig::DEFAULT_PORT)?,
            sender_email,
            app_password,
            timeout_secs: parse_env_or("SMTP_TIMEOUT_SECS", MailConfig::DEFAULT_TIMEOUT_SECS)?,
        };

        let storage = StorageConfig {
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .map(|base| format!("{}/uploads", base.trim_end_matches('/')))
                .unwrap_or_else(|_| format!("http://{bind}/uploads")),
            max_upload_bytes: parse_env_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        };

        let database = match std::env::var("DATABASE_URL") {
            Ok(url) => {
                let defaults = DatabaseConfig::new(url);
                Some(DatabaseConfig {
                    max_connections: parse_env_or("DB_MAX_CONNECTIONS", defaults.max_connections)?,
                    min_connections: parse_env_or("DB_MIN_CONNECTIONS", defaults.min_connections)?,
                    connection_timeout_secs: parse_env_or(
                        "DB_CONNECTION_TIMEOUT_SECS",
                        defaults.connection_timeout_secs,
                    )?,
                    idle_timeout_secs: parse_env_or(
                        "DB_IDLE_TIMEOUT_SECS",
                        defaults.idle_timeout_secs,
                    )?,
                    max_lifetime_secs: parse_env_or(
                        "DB_MAX_LIFETIME_SECS",
                        defaults.max_lifetime_secs,
                    )?,
                    ..defaults
                })
            }
            Err(_) => None,
        };

        let http = HttpConfig {
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_else(|_| {
                    vec![
                        "http://localhost:5173".to_string(),
                        "https://*.vercel.app".to_string(),
                    ]
                }),
            request_timeout_secs: parse_env_or("REQUEST_TIMEOUT_SECS", 120)?,
        };

        let metrics_bind = match std::env::var("METRICS_BIND") {
            Ok(raw) => Some(raw.parse().map_err(|_| ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Not a socket address: {raw}"),
            })?),
            Err(_) => None,
        };

        Ok(ServerConfig {
            bind,
            mail,
            storage,
            database,
            http,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mail.smtp_port == 0 {
            return Err(ConfigError::Invalid {
                var: "SMTP_PORT".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.mail.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "SMTP_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if !is_valid_address(&self.mail.sender_email) {
            return Err(ConfigError::Invalid {
                var: "SENDER_EMAIL".to_string(),
                reason: format!("Not a mail address: {}", self.mail.sender_email),
            });
        }

        if self.storage.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_UPLOAD_BYTES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.http.cors_origins.is_empty() {
            return Err(ConfigError::Invalid {
                var: "CORS_ORIGINS".to_string(),
                reason: "At least one origin is required".to_string(),
            });
        }

        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "REQUEST_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Settings for the HTTP router
    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            cors_origins: self.http.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.http.request_timeout_secs),
            max_upload_bytes: self.storage.max_upload_bytes,
            upload_dir: Some(self.storage.upload_dir.clone()),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an environment variable, using `default` only when it is unset
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Cannot parse {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated origin list, dropping blanks
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| o.trim_end_matches('/').to_string())
        .collect()
}
