use std::time::Duration;

use async_trait::async_trait;
use http::{Method, StatusCode};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use super::{RequestBody, Transport};
use crate::error::TransportError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// reqwest-backed implementation of `Transport`.
///
/// Holds the archive's base URL and optional basic-auth credentials, which
/// are attached to every request when a user is set.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    credentials: Option<(String, Option<String>)>,
}

impl HttpTransport {
    /// Create a transport for the archive at `host` (e.g. `http://localhost:8042`).
    ///
    /// Returns an error if `host` is not an absolute http(s) URL.
    pub fn new(host: &str) -> Result<Self, TransportError> {
        Self::with_timeout(host, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a transport with a custom request timeout.
    pub fn with_timeout(host: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = normalize_host(host)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            credentials: None,
        })
    }

    /// Attach basic-auth credentials.
    pub fn with_credentials(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.credentials = Some((user.into(), password));
        self
    }

    /// Get the base URL requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "archive request");
        let builder = self.client.request(method, self.url(path));
        match &self.credentials {
            Some((user, password)) => builder.basic_auth(user, password.as_deref()),
            None => builder,
        }
    }

    async fn send(&self, path: &str, builder: RequestBuilder) -> Result<Value, TransportError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|e| TransportError::Decode {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TransportError> {
        let builder = self.request(Method::GET, path);
        let builder = if query.is_empty() {
            builder
        } else {
            builder.query(query)
        };
        self.send(path, builder).await
    }

    async fn post(&self, path: &str, body: RequestBody) -> Result<Value, TransportError> {
        let builder = self.request(Method::POST, path);
        let builder = match body {
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Raw(text) => builder.body(text),
        };
        self.send(path, builder).await
    }

    async fn delete(&self, path: &str) -> Result<Value, TransportError> {
        let builder = self.request(Method::DELETE, path);
        self.send(path, builder).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Validate `host` and strip any trailing slash so paths can be appended.
fn normalize_host(host: &str) -> Result<String, TransportError> {
    let parsed =
        url::Url::parse(host).map_err(|e| TransportError::InvalidUrl(format!("{host}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(TransportError::InvalidUrl(format!(
                "{host}: unsupported scheme {other}"
            )))
        }
    }

    Ok(host.trim_end_matches('/').to_string())
}
