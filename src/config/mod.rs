//! Portal settings, read from the process environment (and `.env`).
//!
//! Everything has a local-development default except the lending API URL in
//! production, which must be given explicitly.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Deployment profile, from `ENVIRONMENT`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Local,
    Staging,
    Production,
}

impl Profile {
    pub fn is_production(self) -> bool {
        self == Profile::Production
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "local" | "dev" | "development" => Ok(Profile::Local),
            "staging" => Ok(Profile::Staging),
            "prod" | "production" => Ok(Profile::Production),
            other => Err(ConfigError::invalid(
                "ENVIRONMENT",
                format!("unknown profile '{}'", other),
            )),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Profile::Local => "local",
            Profile::Staging => "staging",
            Profile::Production => "production",
        })
    }
}

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_SESSION_FILE: &str = ".loan-portal/session.json";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root URL of the remote lending API
    pub api_base_url: String,

    pub profile: Profile,

    /// Portal port (the portal binds to 127.0.0.1 only)
    pub port: u16,

    /// Timeout for each call to the lending API
    pub request_timeout: Duration,

    /// Where the session token is kept between runs
    pub session_file: PathBuf,

    /// Comma-separated origins allowed to call the portal from a browser
    pub cors_allowed_origins: Option<String>,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ConfigError::invalid(".env", e.to_string()));
            }
        }

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile: Profile = lookup("ENVIRONMENT").unwrap_or_default().parse()?;

        let api_base_url = match lookup("API_BASE_URL") {
            Some(url) => url,
            None if profile.is_production() => return Err(ConfigError::Missing("API_BASE_URL")),
            None => DEFAULT_API_BASE_URL.to_string(),
        };
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_string();
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "API_BASE_URL",
                format!("expected an http(s) URL, got '{}'", api_base_url),
            ));
        }

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid("PORT", e.to_string()))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ConfigError::invalid(
                        "REQUEST_TIMEOUT_SECS",
                        "expected a positive number of seconds",
                    )
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let session_file = PathBuf::from(
            lookup("SESSION_FILE").unwrap_or_else(|| DEFAULT_SESSION_FILE.to_string()),
        );

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").filter(|v| !v.trim().is_empty());
        let log_level = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Config {
            api_base_url,
            profile,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            session_file,
            cors_allowed_origins,
            log_level,
        })
    }
}
