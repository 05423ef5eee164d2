//! HTTP abstraction for ImageFeed.
//!
//! This module provides a pluggable request/response layer that abstracts
//! the underlying HTTP stack (reqwest, mock for testing).
//!
//! # Design
//!
//! The client trait is async and request-oriented: one [`HttpRequest`] in,
//! one [`HttpResponse`] (status + body bytes) or an [`HttpError`] out.
//! Nothing above this layer inspects framing beyond the status code and body.
//!
//! # Example
//!
//! ```ignore
//! let http = MockHttpClient::new();
//! http.queue_response(200, b"[]".to_vec());
//! let response = http.send(HttpRequest::new(Method::Get, url)).await?;
//! assert!(response.is_success());
//! ```

mod mock;
mod reqwest_client;

pub use mock::MockHttpClient;
pub use reqwest_client::ReqwestClient;

use async_trait::async_trait;
use reqwest::Url;
use std::fmt;
use thiserror::Error;

/// HTTP errors below the status-code level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// Could not reach the server.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Sending the request failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Reading the response body failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// The adapter's timeout elapsed.
    #[error("request timeout")]
    Timeout,
}

/// Request methods used by the photos API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing request.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute URL including query.
    pub url: Url,
    /// Header name/value pairs, in insertion order.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a request with no headers.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// First value of the named header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Value of a query parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    (name.as_str(), "[REDACTED]")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        // Token requests carry the client secret and code in the query.
        let mut url = self.url.clone();
        url.set_query(self.url.query().map(|_| "[REDACTED]"));
        f.debug_struct("HttpRequest")
            .field("method", &self.method.as_str())
            .field("url", &url.as_str())
            .field("headers", &headers)
            .finish()
    }
}

/// A received response.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("body", &format!("[{} bytes]", self.body.len()))
            .finish()
    }
}

/// Client trait for performing HTTP requests.
///
/// Implementations own connection pooling and timeout policy.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a request and return its status and body.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}
