use std::{collections::HashMap, env, path::PathBuf, time::Duration};

use asc_ci_token::{AUDIENCE, EXPIRATION_TIME_DURATION_SECONDS_MAX_FOR_MOST_REQUESTS};
use thiserror::Error;

pub const DEFAULT_API_ROOT: &str = "https://api.appstoreconnect.apple.com/v1";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const ENV_KEY_ID: &str = "ASC_KEY_ID";
pub const ENV_ISSUER_ID: &str = "ASC_ISSUER_ID";
pub const ENV_KEY_PATH: &str = "ASC_KEY_PATH";
pub const ENV_API_ROOT: &str = "ASC_API_ROOT";
pub const ENV_TOKEN_TTL_SECS: &str = "ASC_TOKEN_TTL_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "ASC_HTTP_TIMEOUT_SECS";
pub const ENV_REUSE_TOKEN: &str = "ASC_REUSE_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub key_id: String,
    pub issuer_id: String,
    pub key_path: PathBuf,
    pub api_root: String,
    pub audience: String,
    pub token_ttl: Duration,
    pub http_timeout: Duration,
    pub reuse_token: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },

    #[error("Cannot locate the home directory, set ASC_KEY_PATH")]
    NoHomeDir,
}

impl Config {
    /// Minimal configuration with defaults for everything but the identifiers.
    pub fn new(
        key_id: impl Into<String>,
        issuer_id: impl Into<String>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            key_id: key_id.into(),
            issuer_id: issuer_id.into(),
            key_path: key_path.into(),
            api_root: DEFAULT_API_ROOT.to_string(),
            audience: AUDIENCE.to_string(),
            token_ttl: Duration::from_secs(EXPIRATION_TIME_DURATION_SECONDS_MAX_FOR_MOST_REQUESTS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            reuse_token: false,
        }
    }

    pub fn with_api_root(mut self, api_root: impl Into<String>) -> Self {
        self.api_root = api_root.into();
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let key_id = required(vars, ENV_KEY_ID)?;
        let issuer_id = required(vars, ENV_ISSUER_ID)?;

        let key_path = match vars.get(ENV_KEY_PATH).filter(|v| !v.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => {
                let home = vars
                    .get("HOME")
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
                    .or_else(home::home_dir)
                    .ok_or(ConfigError::NoHomeDir)?;
                default_key_path(home, &key_id)
            }
        };

        let api_root = vars
            .get(ENV_API_ROOT)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_API_ROOT.to_string());

        let token_ttl = match vars.get(ENV_TOKEN_TTL_SECS) {
            Some(value) => Duration::from_secs(parse_secs(ENV_TOKEN_TTL_SECS, value)?),
            None => Duration::from_secs(EXPIRATION_TIME_DURATION_SECONDS_MAX_FOR_MOST_REQUESTS),
        };

        let http_timeout = match vars.get(ENV_HTTP_TIMEOUT_SECS) {
            Some(value) => Duration::from_secs(parse_secs(ENV_HTTP_TIMEOUT_SECS, value)?),
            None => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let reuse_token = match vars.get(ENV_REUSE_TOKEN) {
            Some(value) => parse_bool(ENV_REUSE_TOKEN, value)?,
            None => false,
        };

        Ok(Config {
            key_id,
            issuer_id,
            key_path,
            api_root,
            audience: AUDIENCE.to_string(),
            token_ttl,
            http_timeout,
            reuse_token,
        })
    }
}

/// `<home>/.appstoreconnect/AuthKey_<KEY_ID>.p8`
pub fn default_key_path(home: impl Into<PathBuf>, key_id: &str) -> PathBuf {
    let mut path = home.into();
    path.push(".appstoreconnect");
    path.push(format!("AuthKey_{key_id}.p8"));
    path
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim().to_string())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn invalid(name: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(invalid(name, value)),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(invalid(name, value)),
    }
}
