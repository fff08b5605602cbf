//! Scripted HTTP client for tests.
//!
//! Responses are registered per URL. A streaming response is a list of body
//! chunks plus what happens after the last one: end, fail, or hang.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::sync::{Arc, Mutex};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response, StreamResponse};

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// "GET" or "POST"
    pub method: String,
    pub url: String,
    pub headers: Headers,
    /// Body, for POST requests
    pub body: Option<String>,
}

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// A complete response, for `get` and `post`
    Success(Response),
    /// Fail before any response arrives
    Error(HttpError),
    /// Status 200 with these body chunks, then end of body
    Stream(Vec<Bytes>),
    /// These chunks, then a read error
    StreamThenError(Vec<Bytes>, HttpError),
    /// These chunks, then no further data, ever
    StreamPending(Vec<Bytes>),
    /// Status 200 without a readable body
    EmptyBody,
    /// Response headers never arrive
    Hang,
}

impl MockResponse {
    fn into_stream_response(self, url: &str) -> Result<StreamResponse, HttpError> {
        let body: ByteStream = match self {
            MockResponse::Stream(chunks) => Box::pin(chunk_stream(chunks)),
            MockResponse::StreamThenError(chunks, err) => {
                Box::pin(chunk_stream(chunks).chain(stream::once(async move { Err(err) })))
            }
            MockResponse::StreamPending(chunks) => {
                Box::pin(chunk_stream(chunks).chain(stream::pending()))
            }
            MockResponse::EmptyBody => return Ok(StreamResponse::without_body(200)),
            MockResponse::Error(err) => return Err(err),
            MockResponse::Success(_) | MockResponse::Hang => {
                return Err(HttpError::Other(format!(
                    "mock response for {} cannot be streamed",
                    url
                )))
            }
        };
        Ok(StreamResponse::new(200, body))
    }

    fn into_response(self, url: &str) -> Result<Response, HttpError> {
        match self {
            MockResponse::Success(response) => Ok(response),
            MockResponse::Error(err) => Err(err),
            _ => Err(HttpError::Other(format!(
                "mock response for {} is a stream",
                url
            ))),
        }
    }
}

fn chunk_stream(chunks: Vec<Bytes>) -> impl futures::Stream<Item = Result<Bytes, HttpError>> {
    stream::iter(chunks.into_iter().map(Ok))
}

/// Mock HTTP client for tests.
///
/// Lookup order: exact URL, then the longest registered prefix, then the
/// default response.
///
/// # Example
///
/// ```ignore
/// use ragchat::adapters::mock::{MockHttpClient, MockResponse};
/// use bytes::Bytes;
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "http://test/api/v1/conversations/c1/messages/stream",
///     MockResponse::Stream(vec![Bytes::from("event: token\ndata: {\"value\":\"hi\"}\n\n")]),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    routes: Arc<Mutex<Vec<(String, MockResponse)>>>,
    fallback: Arc<Mutex<Option<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests to `url` (or URLs starting with it) with `response`.
    /// Registering the same URL again replaces the earlier response.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        let mut routes = self.routes.lock().unwrap();
        routes.retain(|(pattern, _)| pattern != url);
        routes.push((url.to_string(), response));
    }

    /// Answer requests that match no registered URL.
    pub fn set_default_response(&self, response: MockResponse) {
        *self.fallback.lock().unwrap() = Some(response);
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, method: &str, url: &str, headers: &Headers, body: Option<&str>) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: body.map(str::to_string),
        });
    }

    fn lookup(&self, url: &str) -> Result<MockResponse, HttpError> {
        let routes = self.routes.lock().unwrap();
        let matched = routes
            .iter()
            .find(|(pattern, _)| pattern == url)
            .or_else(|| {
                routes
                    .iter()
                    .filter(|(pattern, _)| url.starts_with(pattern.as_str()))
                    .max_by_key(|(pattern, _)| pattern.len())
            })
            .map(|(_, response)| response.clone());

        matched
            .or_else(|| self.fallback.lock().unwrap().clone())
            .ok_or_else(|| HttpError::Other(format!("No mock response for URL: {}", url)))
    }

    async fn answer(&self, url: &str) -> Result<Response, HttpError> {
        match self.lookup(url)? {
            MockResponse::Hang => std::future::pending().await,
            response => response.into_response(url),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record("GET", url, headers, None);
        self.answer(url).await
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record("POST", url, headers, Some(body));
        self.answer(url).await
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<StreamResponse, HttpError> {
        self.record("POST", url, headers, Some(body));
        match self.lookup(url)? {
            MockResponse::Hang => std::future::pending().await,
            response => response.into_stream_response(url),
        }
    }
}
