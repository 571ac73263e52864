use std::path::PathBuf;

use mindak_core::reservation::{
    validate_confirmation_prefix, ReservationKind, DEFAULT_PODCAST_PREFIX, DEFAULT_SERVICE_PREFIX,
};
use mindak_core::uploads::MAX_UPLOAD_BYTES;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Grace period for in-flight requests after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Directory answer-option images are written to.
    pub upload_dir: PathBuf,
    /// Largest accepted image upload, in bytes.
    pub upload_max_bytes: usize,
    /// Confirmation-id prefix for podcast reservations.
    pub podcast_confirmation_prefix: String,
    /// Confirmation-id prefix for service reservations.
    pub service_confirmation_prefix: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                    |
    /// |-------------------------------|----------------------------|
    /// | `HOST`                        | `0.0.0.0`                  |
    /// | `PORT`                        | `3000`                     |
    /// | `CORS_ORIGINS`                | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`       | `30`                       |
    /// | `UPLOAD_DIR`                  | `storage/uploads/answers`  |
    /// | `UPLOAD_MAX_BYTES`            | `5242880` (5 MiB)          |
    /// | `PODCAST_CONFIRMATION_PREFIX` | `POD`                      |
    /// | `SERVICE_CONFIRMATION_PREFIX` | `SRV`                      |
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let upload_dir = PathBuf::from(
            std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "storage/uploads/answers".into()),
        );

        let upload_max_bytes: usize = std::env::var("UPLOAD_MAX_BYTES")
            .map(|v| v.parse().expect("UPLOAD_MAX_BYTES must be a valid usize"))
            .unwrap_or(MAX_UPLOAD_BYTES);

        let podcast_confirmation_prefix = prefix_from_env(
            "PODCAST_CONFIRMATION_PREFIX",
            DEFAULT_PODCAST_PREFIX,
        );
        let service_confirmation_prefix = prefix_from_env(
            "SERVICE_CONFIRMATION_PREFIX",
            DEFAULT_SERVICE_PREFIX,
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            upload_dir,
            upload_max_bytes,
            podcast_confirmation_prefix,
            service_confirmation_prefix,
        }
    }

    /// The confirmation-id prefix for reservations of `kind`.
    pub fn confirmation_prefix(&self, kind: ReservationKind) -> &str {
        match kind {
            ReservationKind::Podcast => &self.podcast_confirmation_prefix,
            ReservationKind::Service => &self.service_confirmation_prefix,
        }
    }
}

fn prefix_from_env(var: &str, default: &str) -> String {
    let prefix = std::env::var(var).unwrap_or_else(|_| default.into());
    if let Err(msg) = validate_confirmation_prefix(&prefix) {
        panic!("{var}: {msg}");
    }
    prefix
}
