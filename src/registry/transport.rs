//! Transport layer for the registry management API
//!
//! Pruning stages never talk to `reqwest` directly. They go through
//! [`RegistryTransport`], which hands back raw [`ApiResponse`] values so that
//! status handling (rate limiting, rejections) stays with the caller.

use crate::error::handlers::NetworkErrorHandler;
use crate::error::{PrunerError, Result};
use crate::logging::Logger;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Raw HTTP exchange with the registry API
#[async_trait]
pub trait RegistryTransport: Send + Sync {
    /// GET `path` relative to the API base, optionally with a bearer token
    async fn get(&self, path: &str, token: Option<&str>) -> Result<ApiResponse>;

    /// POST a JSON body to `path` relative to the API base
    async fn post_json(
        &self,
        path: &str,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<ApiResponse>;
}

/// Status, headers and body of one API response
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    pub status: u16,
    /// Header names are stored lower-cased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            PrunerError::Parse(format!(
                "Failed to parse response body (status {}): {}",
                self.status, e
            ))
        })
    }
}

/// `reqwest`-backed transport used by the binary
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    output: Logger,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration, skip_tls: bool, output: Logger) -> Result<Self> {
        // Url::join drops the last path segment unless the base ends with '/'
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        let mut builder = reqwest::Client::builder().timeout(timeout);
        if skip_tls {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }
        let client = builder.build().map_err(|e| {
            PrunerError::Network(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url,
            output,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn send(&self, request: reqwest::RequestBuilder, context: &str) -> Result<ApiResponse> {
        let response = request
            .send()
            .await
            .map_err(|e| NetworkErrorHandler::handle_network_error(&e, context))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| NetworkErrorHandler::handle_network_error(&e, context))?;

        self.output
            .debug(&format!("{} -> HTTP {} ({} bytes)", context, status, body.len()));

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl RegistryTransport for HttpTransport {
    async fn get(&self, path: &str, token: Option<&str>) -> Result<ApiResponse> {
        let url = self.base_url.join(path)?;
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.send(request, &format!("GET {}", path)).await
    }

    async fn post_json(
        &self,
        path: &str,
        token: Option<&str>,
        body: &serde_json::Value,
    ) -> Result<ApiResponse> {
        let url = self.base_url.join(path)?;
        let mut request = self.client.post(url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.send(request, &format!("POST {}", path)).await
    }
}
