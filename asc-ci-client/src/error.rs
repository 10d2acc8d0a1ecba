use asc_ci_token::{IssueError, KeyLoadError};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Signing key could not be loaded: {0}")]
    KeyLoad(#[from] KeyLoadError),

    #[error("Credential could not be signed: {0}")]
    Issue(IssueError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Response body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No {kind} matching {selector}")]
    NotFound { kind: &'static str, selector: String },
}

impl From<IssueError> for Error {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::KeyLoad(err) => Error::KeyLoad(err),
            err => Error::Issue(err),
        }
    }
}

impl Error {
    /// HTTP status of an [`ApiError`], if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(err) => Some(err.status),
            _ => None,
        }
    }
}

/// Non-2xx answer from the API, status and body untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status}: {body}")]
pub struct ApiError {
    pub status: u16,
    pub body: String,
}
