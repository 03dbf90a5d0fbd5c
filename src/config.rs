//! Configuration, built from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Where query records are persisted.
#[derive(Debug)]
pub enum DatabaseConfig {
    /// Local libSQL file.
    Local { path: PathBuf },
    /// Remote libSQL instance (connection URL + auth token).
    Remote {
        url: String,
        auth_token: SecretString,
    },
}

/// Service configuration.
#[derive(Debug)]
pub struct AssistConfig {
    /// HTTP listen port.
    pub port: u16,
    pub database: DatabaseConfig,
    /// Webhook for completed records. None disables delivery.
    pub webhook_url: Option<String>,
    /// Sessions idle longer than this are evicted.
    pub session_ttl: Duration,
    /// CORS origin for the web frontend.
    pub allowed_origin: String,
}

impl AssistConfig {
    /// Build config from environment variables.
    ///
    /// `UNI_ASSIST_DB_URL` selects a remote database and then requires
    /// `UNI_ASSIST_DB_AUTH_TOKEN`; otherwise `UNI_ASSIST_DB_PATH` (or its
    /// default) selects a local file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_env("UNI_ASSIST_PORT", 8080)?;

        let database = match std::env::var("UNI_ASSIST_DB_URL") {
            Ok(url) => {
                let auth_token = std::env::var("UNI_ASSIST_DB_AUTH_TOKEN").map_err(|_| {
                    ConfigError::MissingRequired {
                        key: "UNI_ASSIST_DB_AUTH_TOKEN".to_string(),
                        hint: "Required when UNI_ASSIST_DB_URL is set.".to_string(),
                    }
                })?;
                DatabaseConfig::Remote {
                    url,
                    auth_token: SecretString::from(auth_token),
                }
            }
            Err(_) => {
                let path = std::env::var("UNI_ASSIST_DB_PATH")
                    .unwrap_or_else(|_| "./data/uni-assist.db".to_string());
                DatabaseConfig::Local {
                    path: PathBuf::from(path),
                }
            }
        };

        let webhook_url = std::env::var("WEBHOOK_URL").ok().filter(|s| !s.is_empty());

        let ttl_min: u64 = parse_env("UNI_ASSIST_SESSION_TTL_MIN", 60)?;

        let allowed_origin = std::env::var("UNI_ASSIST_ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        Ok(Self {
            port,
            database,
            webhook_url,
            session_ttl: Duration::from_secs(ttl_min * 60),
            allowed_origin,
        })
    }
}

/// Parse an env var, defaulting when unset and erroring when malformed.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}
