//! Reqwest-based HTTP client adapter.
//!
//! Production implementation of [`HttpClient`]. Plain requests are read to
//! the end; streaming requests hand back the body as it arrives.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Method, StatusCode};

use crate::config::ClientConfig;
use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response, StreamResponse};

/// HTTP client implementation using reqwest.
///
/// # Example
///
/// ```ignore
/// use ragchat::adapters::ReqwestHttpClient;
/// use ragchat::config::ClientConfig;
/// use ragchat::traits::{Headers, HttpClient};
///
/// let client = ReqwestHttpClient::from_config(&ClientConfig::default())?;
/// let response = client.get("http://localhost:8000/health", &Headers::new()).await?;
/// println!("Status: {}", response.status);
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Build a client with the connect timeout and user agent from `config`.
    ///
    /// No overall request timeout is set; answers stream for as long as the
    /// backend keeps generating.
    pub fn from_config(config: &ClientConfig) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| HttpError::Other(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an already configured reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Send a request and wait for the response headers.
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&str>,
        headers: &Headers,
    ) -> Result<reqwest::Response, HttpError> {
        let mut builder = self.client.request(method, url);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }
        builder.send().await.map_err(map_error)
    }

    /// Read a whole response into memory.
    async fn buffered(response: reqwest::Response) -> Result<Response, HttpError> {
        let status = response.status().as_u16();
        let headers = header_map(response.headers());
        let body = response.bytes().await.map_err(map_error)?;
        Ok(Response::with_headers(status, headers, body))
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        let response = self.send(Method::GET, url, None, headers).await?;
        Self::buffered(response).await
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        let response = self.send(Method::POST, url, Some(body), headers).await?;
        Self::buffered(response).await
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<StreamResponse, HttpError> {
        let response = self.send(Method::POST, url, Some(body), headers).await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());
            return Err(HttpError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let headers = header_map(response.headers());
        let body = if is_bodyless(status, response.content_length()) {
            None
        } else {
            Some(body_stream(response))
        };

        Ok(StreamResponse {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

/// 204 and an explicit zero length both mean there is nothing to read.
fn is_bodyless(status: StatusCode, content_length: Option<u64>) -> bool {
    status == StatusCode::NO_CONTENT || content_length == Some(0)
}

fn body_stream(response: reqwest::Response) -> ByteStream {
    Box::pin(response.bytes_stream().map(|chunk| {
        chunk.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(e.to_string())
            } else {
                HttpError::Io(e.to_string())
            }
        })
    }))
}

fn map_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(err.to_string())
    } else if err.is_connect() {
        HttpError::ConnectionFailed(err.to_string())
    } else if err.is_builder() {
        HttpError::InvalidUrl(err.to_string())
    } else {
        HttpError::Other(err.to_string())
    }
}

/// Header values that are not visible ASCII are skipped.
fn header_map(headers: &reqwest::header::HeaderMap) -> Headers {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect()
}
