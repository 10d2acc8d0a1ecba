use core::time::Duration;
use std::path::Path;

use chrono::{DateTime, Duration as ChronoDuration, SubsecRound as _, Utc};
use jsonwebtoken::encode;

use crate::{
    clamp_validity, header, Claims, IssueError, KeyLoadError, SigningKey, AUDIENCE,
    EXPIRATION_TIME_DURATION_SECONDS_MAX_FOR_MOST_REQUESTS,
};

/// A signed bearer token together with the claims it was signed over.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: Box<str>,
    key_id: Box<str>,
    claims: Claims,
}

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.claims.iat
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.exp
    }

    /// Time left before `exp`, zero once expired.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.claims.exp - now).to_std().unwrap_or(Duration::ZERO)
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credential")
            .field("key_id", &self.key_id)
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

//
#[derive(Debug, Clone)]
pub struct Issuer {
    key_id: Box<str>,
    issuer_id: Box<str>,
    audience: Box<str>,
    validity: Duration,
    scope: Option<Vec<Box<str>>>,
    key: SigningKey,
}

impl Issuer {
    pub fn new(key_id: impl AsRef<str>, issuer_id: impl AsRef<str>, key: SigningKey) -> Self {
        Self {
            key_id: key_id.as_ref().into(),
            issuer_id: issuer_id.as_ref().into(),
            audience: AUDIENCE.into(),
            validity: Duration::from_secs(EXPIRATION_TIME_DURATION_SECONDS_MAX_FOR_MOST_REQUESTS),
            scope: None,
            key,
        }
    }

    pub fn from_key_file(
        key_id: impl AsRef<str>,
        issuer_id: impl AsRef<str>,
        key_path: impl AsRef<Path>,
    ) -> Result<Self, KeyLoadError> {
        let key = SigningKey::from_file(key_path)?;
        Ok(Self::new(key_id, issuer_id, key))
    }

    pub fn with_audience(mut self, audience: impl AsRef<str>) -> Self {
        self.audience = audience.as_ref().into();
        self
    }

    /// Clamped to [`EXPIRATION_TIME_DURATION_SECONDS_MAX`](crate::EXPIRATION_TIME_DURATION_SECONDS_MAX).
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = clamp_validity(validity);
        self
    }

    pub fn with_scope(mut self, scope: Vec<Box<str>>) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    pub fn issue(&self) -> Result<Credential, IssueError> {
        self.issue_at(Utc::now())
    }

    /// `issued_at` is truncated to whole seconds, the resolution of `iat`/`exp`.
    pub fn issue_at(&self, issued_at: DateTime<Utc>) -> Result<Credential, IssueError> {
        let issued_at = issued_at.trunc_subsecs(0);
        // exp > iat even for a zero window
        let secs = self.validity.as_secs().max(1) as i64;

        let claims = Claims {
            iss: self.issuer_id.clone(),
            iat: issued_at,
            exp: issued_at + ChronoDuration::seconds(secs),
            aud: self.audience.clone(),
            scope: self.scope.clone(),
        };

        let token = encode(&header(&self.key_id), &claims, self.key.encoding_key())
            .map_err(IssueError::EncodeFailed)?;

        Ok(Credential {
            token: token.into(),
            key_id: self.key_id.clone(),
            claims,
        })
    }
}
