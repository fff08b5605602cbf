//! Common test utilities for integration tests.
//!
//! Provides a recording stream handler, canned wire payloads and helpers
//! for chunking a payload at arbitrary byte offsets.
//!
//! # Example
//!
//! ```ignore
//! let (handler, log) = RecordingHandler::new();
//! let session = client.stream_message("c1", "hi", handler);
//! session.completion().await?;
//! assert_eq!(log.events(), vec![Recorded::Close]);
//! ```

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use ragchat::adapters::mock::{MockHttpClient, MockResponse};
use ragchat::client::ChatClient;
use ragchat::config::ClientConfig;
use ragchat::error::StreamError;
use ragchat::models::{Message, PhaseDefinition, PhaseProgress};
use ragchat::sse::TokenPayload;
use ragchat::stream::StreamHandler;

pub const BASE_URL: &str = "http://test/api/v1";

/// Stream endpoint of conversation `c1` on [`BASE_URL`].
pub const STREAM_URL: &str = "http://test/api/v1/conversations/c1/messages/stream";

pub const MESSAGE_COMPLETE_FRAME: &str = "event: message:complete\ndata: {\"id\":\"m1\",\"conversation_id\":\"c1\",\"author\":\"AGENT\",\"content\":\"Hello\",\"cited_sources\":[],\"created_at\":\"2024-01-01T00:00:00Z\"}\n\n";

/// The two chunks of the token-then-completion scenario.
pub fn token_then_completion_chunks() -> Vec<String> {
    vec![
        "event: token\ndata: {\"value\":\"He\"".to_string(),
        format!("llo\"}}\n\n{}", MESSAGE_COMPLETE_FRAME),
    ]
}

/// A wire payload exercising every event kind plus multibyte text.
pub fn full_payload() -> String {
    [
        "event: phase:start\ndata: {\"phases\":[{\"id\":\"embedding\",\"label\":\"Embedding\"},{\"id\":\"post_process\",\"label\":\"Pós-processamento\"}]}\n\n",
        "event: phase:update\ndata: {\"phase\":\"embedding\",\"status\":\"running\"}\n\n",
        "event: phase:complete\ndata: {\"phase\":\"embedding\"}\n\n",
        "event: token\ndata: {\"value\":\"Olá, \"}\n\n",
        "event: token\ndata: {\"value\":\"mundo 🌍\"}\n\n",
        "event: phase:complete\ndata: {\"phase\":\"post_process\"}\n\n",
        MESSAGE_COMPLETE_FRAME,
    ]
    .concat()
}

/// A callback as observed by [`RecordingHandler`].
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    PhaseStart(Vec<String>),
    PhaseUpdate(String),
    PhaseComplete(String),
    Token(String),
    MessageComplete(Message),
    Error(StreamError),
    Close,
}

/// Shared view of what a [`RecordingHandler`] saw.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Recorded>>>);

impl EventLog {
    pub fn events(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    pub fn tokens(&self) -> String {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Token(value) => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&Recorded) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    fn push(&self, event: Recorded) {
        self.0.lock().unwrap().push(event);
    }
}

/// Stream handler that records every callback in order.
pub struct RecordingHandler {
    log: EventLog,
}

impl RecordingHandler {
    pub fn new() -> (Self, EventLog) {
        let log = EventLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl StreamHandler for RecordingHandler {
    fn on_phase_start(&mut self, phases: &[PhaseDefinition]) {
        self.log
            .push(Recorded::PhaseStart(phases.iter().map(|p| p.id.clone()).collect()));
    }

    fn on_phase_update(&mut self, progress: &PhaseProgress) {
        self.log.push(Recorded::PhaseUpdate(progress.phase.clone()));
    }

    fn on_phase_complete(&mut self, progress: &PhaseProgress) {
        self.log.push(Recorded::PhaseComplete(progress.phase.clone()));
    }

    fn on_token(&mut self, token: &TokenPayload) {
        self.log.push(Recorded::Token(token.value.clone()));
    }

    fn on_message_complete(&mut self, message: &Message) {
        self.log.push(Recorded::MessageComplete(message.clone()));
    }

    fn on_error(&mut self, error: &StreamError) {
        self.log.push(Recorded::Error(error.clone()));
    }

    fn on_close(&mut self) {
        self.log.push(Recorded::Close);
    }
}

/// Split `payload` into chunks at the given byte offsets.
pub fn split_at_offsets(payload: &[u8], offsets: &[usize]) -> Vec<Bytes> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for &offset in offsets {
        chunks.push(Bytes::copy_from_slice(&payload[start..offset]));
        start = offset;
    }
    chunks.push(Bytes::copy_from_slice(&payload[start..]));
    chunks
}

/// One chunk per byte.
pub fn single_byte_chunks(payload: &[u8]) -> Vec<Bytes> {
    payload.iter().map(|b| Bytes::copy_from_slice(&[*b])).collect()
}

pub fn chunks<S: AsRef<str>>(parts: &[S]) -> Vec<Bytes> {
    parts
        .iter()
        .map(|p| Bytes::copy_from_slice(p.as_ref().as_bytes()))
        .collect()
}

/// A client over a mock answering the `c1` stream endpoint with `response`.
pub fn mock_client(response: MockResponse) -> (ChatClient, MockHttpClient) {
    let mock = MockHttpClient::new();
    mock.set_response(STREAM_URL, response);
    let client = ChatClient::with_http_client(
        ClientConfig::default().with_base_url(BASE_URL),
        Arc::new(mock.clone()),
    );
    (client, mock)
}
