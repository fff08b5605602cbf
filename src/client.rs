//! Chat backend API client.
//!
//! Issues the streaming message request and the plain REST calls around it
//! (conversation creation, history, health).

use std::sync::Arc;

use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::models::{ConversationCreated, CreateMessagePayload, Message};
use crate::stream::{StreamHandler, StreamSession};
use crate::traits::{Headers, HttpClient, HttpError, Response};

/// Client for the chat backend.
///
/// Cheap to clone; clones share the underlying HTTP client.
#[derive(Clone)]
pub struct ChatClient {
    config: ClientConfig,
    http: Arc<dyn HttpClient>,
}

impl ChatClient {
    /// Create a client backed by reqwest.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        Url::parse(&config.base_url).map_err(|e| TransportError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;
        let http = ReqwestHttpClient::from_config(&config)?;
        Ok(Self::with_http_client(config, Arc::new(http)))
    }

    /// Create a client with a custom HTTP implementation.
    pub fn with_http_client(config: ClientConfig, http: Arc<dyn HttpClient>) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send `content` to a conversation and stream the answer.
    ///
    /// The request starts immediately on the current tokio runtime; events are
    /// delivered to `handler` and the result through
    /// [`StreamSession::completion`].
    pub fn stream_message<H>(&self, conversation_id: &str, content: &str, handler: H) -> StreamSession
    where
        H: StreamHandler + 'static,
    {
        let url = format!("{}/messages/stream", self.conversation_url(conversation_id));
        let payload = CreateMessagePayload::new(content);
        let http = Arc::clone(&self.http);

        let mut headers = json_headers();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        let connect = async move {
            let body = serde_json::to_string(&payload).map_err(|e| HttpError::Other(e.to_string()))?;
            debug!("POST {}", url);
            http.post_stream(&url, &body, &headers).await
        };

        StreamSession::spawn(conversation_id, connect, handler)
    }

    /// Send `content` and wait for the whole answer without streaming.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> Result<Message, TransportError> {
        let url = format!("{}/messages", self.conversation_url(conversation_id));
        let body = serde_json::to_string(&CreateMessagePayload::new(content)).map_err(|e| {
            TransportError::InvalidResponse {
                message: e.to_string(),
            }
        })?;

        let response = self.http.post(&url, &body, &json_headers()).await?;
        decode(response)
    }

    /// Create an empty conversation.
    pub async fn create_conversation(&self) -> Result<ConversationCreated, TransportError> {
        let url = format!("{}/conversations", self.config.base_url);
        let response = self.http.post(&url, "", &json_headers()).await?;
        decode(response)
    }

    /// Fetch the stored messages of a conversation, oldest first.
    pub async fn fetch_messages(&self, conversation_id: &str) -> Result<Vec<Message>, TransportError> {
        let url = format!("{}/messages", self.conversation_url(conversation_id));
        let response = self.http.get(&url, &Headers::new()).await?;
        decode(response)
    }

    /// Check whether the backend is reachable.
    ///
    /// The health endpoint lives at the server root, outside the API prefix.
    /// Returns `Ok(false)` for a non-success status.
    pub async fn health_check(&self) -> Result<bool, TransportError> {
        let url = self.health_url()?;
        match self.http.get(&url, &Headers::new()).await {
            Ok(response) => Ok(response.is_success()),
            Err(HttpError::ServerError { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn conversation_url(&self, conversation_id: &str) -> String {
        format!(
            "{}/conversations/{}",
            self.config.base_url,
            urlencoding::encode(conversation_id)
        )
    }

    fn health_url(&self) -> Result<String, TransportError> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| TransportError::InvalidUrl {
            url: self.config.base_url.clone(),
            message: e.to_string(),
        })?;
        url.set_path("/health");
        url.set_query(None);
        Ok(url.to_string())
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn json_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert("Content-Type".to_string(), "application/json".to_string());
    headers
}

/// Check the status and decode a JSON body.
fn decode<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    if !response.is_success() {
        let message = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(TransportError::HttpStatus {
            status: response.status,
            message,
        });
    }

    response.json().map_err(|e| TransportError::InvalidResponse {
        message: e.to_string(),
    })
}
