use chrono::FixedOffset;
use policydesk_core::expiry::offset_from_minutes;

use crate::auth::jwt::JwtConfig;

/// Default business timezone: UTC+3.
const DEFAULT_BUSINESS_UTC_OFFSET_MINUTES: i32 = 180;

/// Default lifetime of cached dashboard reports.
const DEFAULT_REPORT_CACHE_TTL_SECS: u64 = 30;

/// Credentials for the first Admin, created at startup when no users exist.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

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
    /// How long shutdown waits for background tasks, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Fixed UTC offset that defines the business calendar day.
    pub business_offset: FixedOffset,
    /// Time-to-live of cached dashboard reports in seconds.
    pub report_cache_ttl_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Optional first-run Admin account.
    pub bootstrap_admin: Option<BootstrapAdmin>,
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
    /// | `BUSINESS_UTC_OFFSET_MINUTES` | `180`                      |
    /// | `REPORT_CACHE_TTL_SECS`       | `30`                       |
    /// | `BOOTSTRAP_ADMIN_EMAIL`       | unset                      |
    /// | `BOOTSTRAP_ADMIN_PASSWORD`    | unset                      |
    ///
    /// # Panics
    ///
    /// Panics on unparseable values so misconfiguration fails at startup.
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

        let offset_minutes: i32 = std::env::var("BUSINESS_UTC_OFFSET_MINUTES")
            .unwrap_or_else(|_| DEFAULT_BUSINESS_UTC_OFFSET_MINUTES.to_string())
            .parse()
            .expect("BUSINESS_UTC_OFFSET_MINUTES must be a valid i32");
        let business_offset = offset_from_minutes(offset_minutes)
            .unwrap_or_else(|e| panic!("BUSINESS_UTC_OFFSET_MINUTES: {e}"));

        let report_cache_ttl_secs: u64 = std::env::var("REPORT_CACHE_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_REPORT_CACHE_TTL_SECS.to_string())
            .parse()
            .expect("REPORT_CACHE_TTL_SECS must be a valid u64");

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_EMAIL"),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin { email, password })
            }
            _ => None,
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            business_offset,
            report_cache_ttl_secs,
            jwt,
            bootstrap_admin,
        }
    }
}
