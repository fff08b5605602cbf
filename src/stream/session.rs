//! Stream session lifecycle.
//!
//! A [`StreamSession`] owns one streaming request. Its task pumps response
//! chunks through the decoder, splitter and parser, feeds the dispatcher,
//! and settles the completion channel exactly once. The sender half lives
//! in an `Option` that is taken on settlement, so a second settlement has
//! nothing to send with.

use std::future::Future;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{oneshot, watch};
use tracing::{info, info_span, trace, warn, Instrument};
use uuid::Uuid;

use super::dispatch::{Dispatch, Dispatcher};
use super::handler::StreamHandler;
use crate::error::{StreamError, StreamResult, TransportError};
use crate::models::Message;
use crate::sse::{parse_frame, FrameSplitter, Utf8Decoder};
use crate::traits::{HttpError, StreamResponse};

/// How a session ended successfully.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    /// The server sent `message:complete`
    Completed(Message),
    /// The body ended without a terminal event
    Ended,
}

impl StreamOutcome {
    /// The final message, if the server sent one.
    pub fn message(&self) -> Option<&Message> {
        match self {
            StreamOutcome::Completed(message) => Some(message),
            StreamOutcome::Ended => None,
        }
    }

    pub fn into_message(self) -> Option<Message> {
        match self {
            StreamOutcome::Completed(message) => Some(message),
            StreamOutcome::Ended => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            StreamOutcome::Completed(_) => "completed",
            StreamOutcome::Ended => "ended",
        }
    }
}

/// Cloneable handle that cancels a session.
///
/// Safe to call from any task or thread, any number of times.
#[derive(Debug, Clone)]
pub struct CloseHandle {
    abort: Arc<watch::Sender<bool>>,
}

impl CloseHandle {
    /// Abort the request. If the session has not settled yet it settles
    /// as [`StreamError::Cancelled`].
    pub fn close(&self) {
        self.abort.send_replace(true);
    }

    /// Whether close has been requested.
    pub fn is_closed(&self) -> bool {
        *self.abort.borrow()
    }
}

/// One streaming request and its completion signal.
///
/// Dropping the session without calling [`StreamSession::close`] leaves the
/// request running to its natural end.
#[derive(Debug)]
pub struct StreamSession {
    id: Uuid,
    conversation_id: String,
    close: CloseHandle,
    completion: oneshot::Receiver<StreamResult<StreamOutcome>>,
}

impl StreamSession {
    /// Start a session on the current tokio runtime.
    ///
    /// `connect` resolves once response headers arrive. It is raced against
    /// close, so closing while connecting drops the pending request.
    pub fn spawn<F, H>(conversation_id: impl Into<String>, connect: F, handler: H) -> Self
    where
        F: Future<Output = Result<StreamResponse, HttpError>> + Send + 'static,
        H: StreamHandler + 'static,
    {
        let id = Uuid::new_v4();
        let conversation_id = conversation_id.into();

        let (abort_tx, abort_rx) = watch::channel(false);
        let (settle_tx, settle_rx) = oneshot::channel();

        let span = info_span!(
            "stream_session",
            session_id = %id,
            conversation_id = %conversation_id
        );
        let driver = SessionDriver::new(handler, settle_tx);
        tokio::spawn(driver.run(connect, abort_rx).instrument(span));

        Self {
            id,
            conversation_id,
            close: CloseHandle {
                abort: Arc::new(abort_tx),
            },
            completion: settle_rx,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Cancel the session. Idempotent.
    pub fn close(&self) {
        self.close.close();
    }

    /// Get a handle that can close this session from elsewhere.
    pub fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }

    /// Wait for the session to settle.
    ///
    /// By the time this returns, `on_close` has already run.
    pub async fn completion(self) -> StreamResult<StreamOutcome> {
        match self.completion.await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Network {
                message: "session task ended before settling".to_string(),
            }
            .into()),
        }
    }
}

/// State private to one session task.
struct SessionDriver<H> {
    decoder: Utf8Decoder,
    splitter: FrameSplitter,
    dispatcher: Dispatcher<H>,
    settlement: Option<oneshot::Sender<StreamResult<StreamOutcome>>>,
}

impl<H: StreamHandler> SessionDriver<H> {
    fn new(handler: H, settlement: oneshot::Sender<StreamResult<StreamOutcome>>) -> Self {
        Self {
            decoder: Utf8Decoder::new(),
            splitter: FrameSplitter::new(),
            dispatcher: Dispatcher::new(handler),
            settlement: Some(settlement),
        }
    }

    async fn run<F>(mut self, connect: F, mut abort: watch::Receiver<bool>)
    where
        F: Future<Output = Result<StreamResponse, HttpError>>,
    {
        info!("Stream session started");
        let result = self.drive(connect, &mut abort).await;
        self.settle(result);
    }

    /// Run until the first terminal condition. The response body is dropped
    /// on return, which aborts the request if it is still open.
    async fn drive<F>(
        &mut self,
        connect: F,
        abort: &mut watch::Receiver<bool>,
    ) -> StreamResult<StreamOutcome>
    where
        F: Future<Output = Result<StreamResponse, HttpError>>,
    {
        let response = tokio::select! {
            biased;
            _ = wait_for_abort(abort) => return Err(StreamError::Cancelled),
            response = connect => response?,
        };

        if !response.is_success() {
            return Err(TransportError::HttpStatus {
                status: response.status,
                message: "unexpected status".to_string(),
            }
            .into());
        }

        let mut body = response.body.ok_or(TransportError::StreamUnsupported)?;

        loop {
            let next = tokio::select! {
                biased;
                _ = wait_for_abort(abort) => return Err(StreamError::Cancelled),
                next = body.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    let text = self.decoder.decode(&chunk);
                    for frame in self.splitter.push(&text) {
                        if let Some(result) = self.process_frame(&frame, abort) {
                            return result;
                        }
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => break,
            }
        }

        let tail = self.decoder.finish();
        let mut frames = self.splitter.push(&tail);
        frames.extend(self.splitter.finish());
        for frame in frames {
            if let Some(result) = self.process_frame(&frame, abort) {
                return result;
            }
        }

        Ok(StreamOutcome::Ended)
    }

    /// Parse and dispatch one frame. Returns the settlement if the frame
    /// ended the session.
    fn process_frame(
        &mut self,
        frame: &str,
        abort: &watch::Receiver<bool>,
    ) -> Option<StreamResult<StreamOutcome>> {
        if *abort.borrow() {
            return Some(Err(StreamError::Cancelled));
        }
        trace!(frame, "Frame received");

        let event = match parse_frame(frame) {
            Ok(Some(event)) => event,
            Ok(None) => return None,
            Err(e) => return Some(Err(e.into())),
        };

        match self.dispatcher.dispatch(event) {
            Dispatch::Continue => None,
            Dispatch::Completed(message) => Some(Ok(StreamOutcome::Completed(message))),
            Dispatch::Failed(err) => Some(Err(err)),
        }
    }

    /// Settle once: closing callbacks first, then the completion value.
    fn settle(&mut self, result: StreamResult<StreamOutcome>) {
        let Some(settlement) = self.settlement.take() else {
            return;
        };

        match &result {
            Ok(outcome) => info!(outcome = outcome.label(), "Stream session settled"),
            Err(e) if e.is_cancelled() => info!("Stream session cancelled"),
            Err(e) => warn!(
                code = e.error_code(),
                category = %e.category(),
                "Stream session failed: {}",
                e
            ),
        }

        self.dispatcher.finish(&result);
        // The receiver may be gone if the caller dropped the session.
        let _ = settlement.send(result);
    }
}

/// Resolve once close is requested. If every close handle is dropped
/// without closing, never resolve.
async fn wait_for_abort(abort: &mut watch::Receiver<bool>) {
    loop {
        if *abort.borrow_and_update() {
            return;
        }
        if abort.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
