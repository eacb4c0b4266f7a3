use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have sensible defaults suitable for
/// local development. In production, override via environment variables.
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
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Directory for uploaded photos (default: `uploads`).
    pub upload_dir: String,
    /// Base URL of the Nominatim-compatible geocoding service.
    pub geocode_base_url: String,
    /// Weekly-summary generation settings.
    pub summary: SummaryConfig,
}

/// Settings for the weekly-summary background job.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Base URL of the generation API.
    pub api_base_url: String,
    /// Generation model name.
    pub model: String,
    /// API key; the refresh job is disabled when unset.
    pub api_key: Option<String>,
    /// Seconds between refresh passes (default: 6 hours).
    pub refresh_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                                  |
    /// |--------------------------------|------------------------------------------|
    /// | `HOST`                         | `0.0.0.0`                                |
    /// | `PORT`                         | `3000`                                   |
    /// | `CORS_ORIGINS`                 | `http://localhost:5173`                  |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                                     |
    /// | `SHUTDOWN_TIMEOUT_SECS`        | `30`                                     |
    /// | `UPLOAD_DIR`                   | `uploads`                                |
    /// | `GEOCODE_BASE_URL`             | `https://nominatim.openstreetmap.org`    |
    /// | `SUMMARY_API_BASE_URL`         | `https://generativelanguage.googleapis.com` |
    /// | `SUMMARY_MODEL`                | `gemini-2.5-flash`                       |
    /// | `SUMMARY_API_KEY`              | unset (job disabled)                     |
    /// | `SUMMARY_REFRESH_INTERVAL_SECS`| `21600`                                  |
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

        let jwt = JwtConfig::from_env();

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into());

        let geocode_base_url = std::env::var("GEOCODE_BASE_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".into());

        let summary = SummaryConfig {
            api_base_url: std::env::var("SUMMARY_API_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".into()),
            model: std::env::var("SUMMARY_MODEL")
                .unwrap_or_else(|_| cityline_services::summary::DEFAULT_MODEL.into()),
            api_key: std::env::var("SUMMARY_API_KEY").ok().filter(|k| !k.is_empty()),
            refresh_interval_secs: std::env::var("SUMMARY_REFRESH_INTERVAL_SECS")
                .unwrap_or_else(|_| "21600".into())
                .parse()
                .expect("SUMMARY_REFRESH_INTERVAL_SECS must be a valid u64"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            upload_dir,
            geocode_base_url,
            summary,
        }
    }
}
