//! Black-box GET transport used by both workflows.
//!
//! The workflows only see [`HttpRequest`] and [`HttpResponse`]; TLS, timeouts
//! and the user agent are fixed when a [`ReqwestTransport`] is built.

use reqwest::Client;
use std::time::Duration;

use crate::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One request, one response. Implementations must not retry.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub user_agent: String,
    /// `None` keeps reqwest's default (no overall timeout).
    pub timeout: Option<Duration>,
    /// Skips certificate verification. Only meant for self-signed test servers.
    pub accept_invalid_certs: bool,
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(options: &TransportOptions) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .user_agent(options.user_agent.as_str())
            .danger_accept_invalid_certs(options.accept_invalid_certs);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if options.accept_invalid_certs {
            tracing::warn!("TLS certificate verification disabled for this client");
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.get(&request.url).query(&request.query);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        tracing::debug!("GET {}", request.url);
        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::Request {
                url: request.url.clone(),
                message: err.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|err| TransportError::Body {
            url: request.url.clone(),
            message: err.to_string(),
        })?;
        Ok(HttpResponse { status, body })
    }
}
