#![allow(dead_code)]

use std::{
    io::Read as _,
    path::PathBuf,
    sync::mpsc::{self, Receiver},
    thread,
    time::Duration,
};

use asc_ci_client::{Client, Config};
use tiny_http::{Header, Response, Server};

pub const KEY_ID: &str = "2X9R4HXF34";
pub const ISSUER_ID: &str = "57246542-96fe-1a63-e053-0824d011072a";

pub fn key_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/AuthKey_2X9R4HXF34.p8")
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub method: &'static str,
    pub path: &'static str,
    pub status: u16,
    pub body: String,
}

pub fn route(method: &'static str, path: &'static str, status: u16, body: serde_json::Value) -> Route {
    Route {
        method,
        path,
        status,
        body: body.to_string(),
    }
}

/// HTTP stub answering from a fixed route table. Requests without a bearer
/// token that looks like a JWT get 401; unknown routes get 404.
pub struct StubServer {
    pub api_root: String,
    requests: Receiver<RecordedRequest>,
}

impl StubServer {
    pub fn start(routes: Vec<Route>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let header = |name: &'static str| {
                    request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv(name))
                        .map(|h| h.value.as_str().to_string())
                };
                let authorization = header("Authorization");
                let content_type = header("Content-Type");

                let mut body = String::new();
                request.as_reader().read_to_string(&mut body).unwrap();

                let recorded = RecordedRequest {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    authorization,
                    content_type,
                    body,
                };
                let path = recorded.url.split('?').next().unwrap_or_default().to_string();

                let (status, body) = if !has_bearer_jwt(recorded.authorization.as_deref()) {
                    (401, r#"{"errors":[{"status":"401","code":"NOT_AUTHORIZED"}]}"#.to_string())
                } else {
                    routes
                        .iter()
                        .find(|r| r.method == recorded.method && r.path == path)
                        .map(|r| (r.status, r.body.clone()))
                        .unwrap_or_else(|| {
                            (404, r#"{"errors":[{"status":"404","code":"NOT_FOUND"}]}"#.to_string())
                        })
                };

                let _ = tx.send(recorded);

                let response = Response::from_string(body)
                    .with_status_code(status)
                    .with_header(
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
                    );
                let _ = request.respond(response);
            }
        });

        Self {
            api_root: format!("http://{addr}/v1"),
            requests: rx,
        }
    }

    pub fn next_request(&self) -> RecordedRequest {
        self.requests.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    pub fn assert_no_request(&self) {
        assert!(self
            .requests
            .recv_timeout(Duration::from_millis(200))
            .is_err());
    }

    pub fn config(&self) -> Config {
        Config::new(KEY_ID, ISSUER_ID, key_path()).with_api_root(&self.api_root)
    }

    pub fn client(&self) -> Client {
        Client::new(&self.config()).unwrap()
    }
}

fn has_bearer_jwt(authorization: Option<&str>) -> bool {
    let Some(token) = authorization.and_then(|v| v.strip_prefix("Bearer ")) else {
        return false;
    };
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty())
}
