use std::{sync::Arc, time::Duration};

use asc_ci_token::{Credential, CredentialCache, Issuer};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::{ApiError, Error},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    pub fn allows_payload(&self) -> bool {
        matches!(self, Method::Post | Method::Patch)
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl core::fmt::Display for Method {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and raw body of a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: String,
}

impl Response {
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Authenticated App Store Connect API client.
///
/// Every [`dispatch`](Client::dispatch) signs a fresh credential unless token
/// reuse is enabled, then performs exactly one blocking HTTP exchange.
#[derive(Debug)]
pub struct Client {
    api_root: String,
    issuer: Issuer,
    cache: Option<CredentialCache>,
    http: reqwest::blocking::Client,
}

impl Client {
    /// Loads the signing key named by `config`; fails before any request if it is unusable.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let issuer = Issuer::from_key_file(&config.key_id, &config.issuer_id, &config.key_path)?
            .with_audience(&config.audience)
            .with_validity(config.token_ttl);

        let mut client = Self::with_issuer(&config.api_root, issuer, config.http_timeout)?;
        if config.reuse_token {
            client.cache = Some(CredentialCache::new());
        }
        Ok(client)
    }

    pub fn with_issuer(
        api_root: impl Into<String>,
        issuer: Issuer,
        http_timeout: Duration,
    ) -> Result<Self, Error> {
        let http = reqwest::blocking::Client::builder()
            .timeout(http_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_root: api_root.into(),
            issuer,
            cache: None,
            http,
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.api_root.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn credential(&self) -> Result<Arc<Credential>, Error> {
        match &self.cache {
            Some(cache) => Ok(cache.get_or_issue(&self.issuer)?),
            None => Ok(Arc::new(self.issuer.issue()?)),
        }
    }

    /// Sends `method` to `<api_root>/<endpoint>`.
    ///
    /// `payload` is only sent for POST and PATCH. Any status outside 2xx is
    /// returned as [`Error::Api`] carrying the status and body as received.
    pub fn dispatch(
        &self,
        endpoint: &str,
        method: Method,
        payload: Option<&Value>,
    ) -> Result<Response, Error> {
        let credential = self.credential()?;
        let url = self.url(endpoint);

        let mut request = self
            .http
            .request(method.to_reqwest(), &url)
            .header(AUTHORIZATION, format!("Bearer {}", credential.as_str()))
            .header(CONTENT_TYPE, "application/json");

        match payload {
            Some(payload) if method.allows_payload() => {
                request = request.json(payload);
            }
            Some(_) => {
                warn!(%method, endpoint, "payload ignored, {method} requests carry no body");
            }
            None => {}
        }

        let response = request.send().map_err(|err| {
            debug!(%method, endpoint, "request failed: {err}");
            Error::Transport(err)
        })?;

        let status = response.status().as_u16();
        let body = response.text()?;
        debug!(%method, endpoint, status, "response received");

        if !(200..300).contains(&status) {
            return Err(ApiError { status, body }.into());
        }

        Ok(Response { status, body })
    }

    pub fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, Error> {
        self.dispatch(endpoint, Method::Get, None)?.json()
    }

    pub fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, Error> {
        let payload = serde_json::to_value(body)?;
        self.dispatch(endpoint, Method::Post, Some(&payload))?.json()
    }

    pub fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, Error> {
        let payload = serde_json::to_value(body)?;
        self.dispatch(endpoint, Method::Patch, Some(&payload))?.json()
    }
}
