//! [Doc](https://developer.apple.com/documentation/appstoreconnectapi/generating_tokens_for_api_requests)

use core::time::Duration;
use std::path::Path;

use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{errors::Error as JsonwebtokenError, Header};
use serde::{Deserialize, Serialize};

pub mod cache;
pub mod credential;
pub mod key;

pub use cache::CredentialCache;
pub use credential::{Credential, Issuer};
pub use key::{KeyLoadError, SigningKey};

pub const AUDIENCE: &str = "appstoreconnect-v1";
// six months, scoped tokens only
pub const EXPIRATION_TIME_DURATION_SECONDS_MAX: u64 = 60 * 60 * 24 * 180;
// 20 minutes
pub const EXPIRATION_TIME_DURATION_SECONDS_MAX_FOR_MOST_REQUESTS: u64 = 60 * 20;

//
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub iss: Box<str>,
    #[serde(with = "ts_seconds")]
    pub iat: DateTime<Utc>,
    #[serde(with = "ts_seconds")]
    pub exp: DateTime<Utc>,
    pub aud: Box<str>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub scope: Option<Vec<Box<str>>>,
}

/// Loads the key at `key_path` and signs a credential with the default validity window.
pub fn issue(
    key_path: impl AsRef<Path>,
    issuer_id: impl AsRef<str>,
    key_id: impl AsRef<str>,
    audience: impl AsRef<str>,
) -> Result<Credential, IssueError> {
    let key = SigningKey::from_file(key_path).map_err(IssueError::KeyLoad)?;

    Issuer::new(key_id, issuer_id, key)
        .with_audience(audience)
        .issue()
}

pub fn create(
    key_id: impl AsRef<str>,
    auth_key_p8_bytes: impl AsRef<[u8]>,
    issuer_id: impl AsRef<str>,
    scope: impl Into<Option<Vec<Box<str>>>>,
    issued_at: impl Into<Option<DateTime<Utc>>>,
    expiration_time_dur: impl Into<Option<Duration>>,
) -> Result<Box<str>, CreateError> {
    let key = SigningKey::from_pem(auth_key_p8_bytes).map_err(CreateError::MakeEncodingKeyFailed)?;

    let mut issuer = Issuer::new(key_id, issuer_id, key);
    if let Some(scope) = scope.into() {
        issuer = issuer.with_scope(scope);
    }
    if let Some(dur) = expiration_time_dur.into() {
        issuer = issuer.with_validity(dur);
    }

    let credential = issuer
        .issue_at(issued_at.into().unwrap_or_else(Utc::now))
        .map_err(|err| match err {
            IssueError::KeyLoad(err) => CreateError::MakeEncodingKeyFailed(err),
            IssueError::EncodeFailed(err) => CreateError::EncodeFailed(err),
        })?;

    Ok(credential.as_str().into())
}

pub(crate) fn header(key_id: &str) -> Header {
    let mut header = Header::new(jsonwebtoken::Algorithm::ES256);
    header.typ = Some("JWT".to_owned());
    header.kid = Some(key_id.to_owned());
    header
}

pub(crate) fn clamp_validity(dur: Duration) -> Duration {
    if dur.as_secs() > EXPIRATION_TIME_DURATION_SECONDS_MAX {
        Duration::from_secs(EXPIRATION_TIME_DURATION_SECONDS_MAX)
    } else {
        dur
    }
}

//
#[derive(Debug)]
pub enum IssueError {
    KeyLoad(KeyLoadError),
    EncodeFailed(JsonwebtokenError),
}
impl core::fmt::Display for IssueError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::KeyLoad(err) => write!(f, "{err}"),
            Self::EncodeFailed(err) => write!(f, "token signing failed: {err}"),
        }
    }
}
impl std::error::Error for IssueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::KeyLoad(err) => Some(err),
            Self::EncodeFailed(err) => Some(err),
        }
    }
}

#[derive(Debug)]
pub enum CreateError {
    MakeEncodingKeyFailed(KeyLoadError),
    EncodeFailed(JsonwebtokenError),
}
impl core::fmt::Display for CreateError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}
impl std::error::Error for CreateError {}
