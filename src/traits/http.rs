//! Transport seam between the chat client and the network.
//!
//! The client only ever talks to [`HttpClient`]; production code plugs in the
//! reqwest adapter and tests plug in a scripted mock.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use thiserror::Error;

/// Header name to value. Names are kept exactly as given.
pub type Headers = HashMap<String, String>;

/// Body chunks in arrival order. A read failure ends the body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

fn status_is_2xx(status: u16) -> bool {
    matches!(status, 200..=299)
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: Bytes) -> Self {
        Self::with_headers(status, Headers::new(), body)
    }

    pub fn with_headers(status: u16, headers: Headers, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        status_is_2xx(self.status)
    }

    /// Body decoded as UTF-8.
    pub fn text(&self) -> Result<String, std::str::Utf8Error> {
        std::str::from_utf8(&self.body).map(str::to_owned)
    }

    /// Body decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// A response whose body has not been read yet.
///
/// `body` is `None` when the server sent nothing that can be read
/// incrementally, such as a 204.
pub struct StreamResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Option<ByteStream>,
}

impl StreamResponse {
    pub fn new(status: u16, body: ByteStream) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Some(body),
        }
    }

    pub fn without_body(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn is_success(&self) -> bool {
        status_is_2xx(self.status)
    }
}

impl fmt::Debug for StreamResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Failures below the HTTP status line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Request timeout: {0}")]
    Timeout(String),
    /// Non-2xx status, with the response text when it could be read
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },
    /// The body broke off while being read
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("HTTP error: {0}")]
    Other(String),
}

/// The HTTP operations the chat client needs.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// POST and hand back the body unread.
    ///
    /// Resolves as soon as the status line and headers are in. Implementations
    /// report a non-2xx status as [`HttpError::ServerError`]. Dropping the body
    /// stream aborts the request.
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<StreamResponse, HttpError>;
}
