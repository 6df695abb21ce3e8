//! HTTP transport: one request in, one response out.
//!
//! Session credentials travel as cookies held in the transport's jar; request
//! construction never touches tokens.

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::ApiError;
use crate::config::ApiConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A request as seen by the interceptor. Replays reuse it unchanged.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    /// Whether a 401 may trigger refresh-and-retry
    pub retry_on_unauthorized: bool,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            retry_on_unauthorized: true,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: None,
            retry_on_unauthorized: true,
        }
    }

    pub fn with_json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Opt out of refresh-and-retry; used for credential endpoints.
    pub fn without_retry(mut self) -> Self {
        self.retry_on_unauthorized = false;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Turn non-success statuses into `ApiError::Status`.
    pub fn error_for_status(self) -> Result<Self, ApiError> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_response(self.status, &self.body))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Sends a single request. Implementations never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// reqwest-backed transport with a cookie jar scoped to the API origin.
pub struct HttpTransport {
    base_url: Url,
    client: reqwest::Client,
    jar: Arc<Jar>,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid API base URL: {}", config.base_url))?;
        let jar = Arc::new(Jar::default());
        let timeout = Duration::from_secs(config.request_timeout);

        let client = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(timeout)
            .user_agent(concat!("marketlink/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url,
            client,
            jar,
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// Load cookies saved by a previous run. Returns how many were restored.
    pub fn restore_cookies(&self, path: &Path) -> Result<usize> {
        if !path.exists() {
            return Ok(0);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cookie file: {}", path.display()))?;

        let mut restored = 0;
        for pair in content.trim().split("; ").filter(|p| p.contains('=')) {
            self.jar.add_cookie_str(pair, &self.base_url);
            restored += 1;
        }
        debug!(count = restored, path = %path.display(), "Restored session cookies");
        Ok(restored)
    }

    /// Save the jar's cookies for the API origin, or remove the file when
    /// the server cleared them.
    pub fn persist_cookies(&self, path: &Path) -> Result<()> {
        match self.jar.cookies(&self.base_url) {
            Some(header) => {
                let value = header
                    .to_str()
                    .context("Session cookie is not valid UTF-8")?
                    .to_string();
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create directory: {}", parent.display())
                    })?;
                }
                std::fs::write(path, value)
                    .with_context(|| format!("Failed to write cookie file: {}", path.display()))?;
            }
            None => {
                if path.exists() {
                    std::fs::remove_file(path).with_context(|| {
                        format!("Failed to remove cookie file: {}", path.display())
                    })?;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url(&request.path);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout)
            } else {
                ApiError::from(e)
            }
        })?;

        let status = response.status();
        let body = response.bytes().await?;

        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "API request completed"
        );

        Ok(ApiResponse { status, body })
    }
}
