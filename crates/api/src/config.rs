use std::path::PathBuf;

use axum::http::HeaderValue;

/// Startup misconfiguration. The only fatal error class in the server.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Without
/// `DATABASE_URL` the server runs against the in-memory remote.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: Option<String>,
    /// Wait for a pooled database connection before the read path falls
    /// back to the cache (default: `5`). Must be below the request timeout.
    pub db_acquire_timeout_secs: u64,
    /// Root of the local cache files.
    pub cache_dir: PathBuf,
    /// Root of the generated-file archive.
    pub archive_dir: PathBuf,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `HOST`                    | `0.0.0.0`                |
    /// | `PORT`                    | `3000`                   |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                     |
    /// | `DATABASE_URL`            | unset (in-memory remote) |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`                      |
    /// | `CACHE_DIR`               | `.detailhq/cache`        |
    /// | `ARCHIVE_DIR`             | `.detailhq/files`        |
    /// | `LOG_FORMAT`              | `text`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port = match var("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a valid u16",
                value: v,
            })?,
            None => 3000,
        };

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    name: "CORS_ORIGINS",
                    expected: "a comma-separated list of origins",
                    value: origin.clone(),
                });
            }
        }

        let request_timeout_secs = match var("REQUEST_TIMEOUT_SECS") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "REQUEST_TIMEOUT_SECS",
                expected: "a valid u64",
                value: v,
            })?,
            None => 30,
        };

        let db_acquire_timeout_secs = match var("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "DB_ACQUIRE_TIMEOUT_SECS",
                expected: "a valid u64",
                value: v,
            })?,
            None => 5,
        };
        if db_acquire_timeout_secs == 0 || db_acquire_timeout_secs >= request_timeout_secs {
            return Err(ConfigError::Invalid {
                name: "DB_ACQUIRE_TIMEOUT_SECS",
                expected: "between 1 and REQUEST_TIMEOUT_SECS - 1",
                value: db_acquire_timeout_secs.to_string(),
            });
        }

        let log_format = match var("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") | Some("plain") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    expected: "'text' or 'json'",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url: var("DATABASE_URL"),
            db_acquire_timeout_secs,
            cache_dir: var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".detailhq/cache")),
            archive_dir: var("ARCHIVE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".detailhq/files")),
            log_format,
        })
    }
}
