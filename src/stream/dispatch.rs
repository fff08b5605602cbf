//! Event dispatcher state machine.
//!
//! Routes typed events to a [`StreamHandler`] and decides when the session
//! is over. States only move forward:
//!
//! ```text
//! Init -> Streaming -> Completed | Failed | Cancelled
//! ```

use tracing::{debug, trace};

use super::handler::StreamHandler;
use crate::error::{StreamError, StreamResult};
use crate::models::Message;
use crate::sse::{ParsedEvent, StreamEvent};

use super::session::StreamOutcome;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Nothing received yet
    Init,
    /// At least one event dispatched, no terminal event yet
    Streaming,
    /// Settled successfully
    Completed,
    /// Settled with an error
    Failed,
    /// Closed by the caller
    Cancelled,
}

impl DispatchState {
    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DispatchState::Completed | DispatchState::Failed | DispatchState::Cancelled
        )
    }
}

/// What the session should do after an event.
#[derive(Debug)]
pub enum Dispatch {
    /// Keep reading
    Continue,
    /// `message:complete` arrived; settle successfully
    Completed(Message),
    /// The event ended the session with an error
    Failed(StreamError),
}

/// Drives a handler from parsed events.
pub struct Dispatcher<H> {
    handler: H,
    state: DispatchState,
}

impl<H: StreamHandler> Dispatcher<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            state: DispatchState::Init,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Dispatch one parsed frame.
    ///
    /// Unknown event names are skipped. Once terminal, further events are
    /// ignored.
    pub fn dispatch(&mut self, event: ParsedEvent) -> Dispatch {
        if self.state.is_terminal() {
            trace!("Ignoring '{}' after settlement", event.name);
            return Dispatch::Continue;
        }
        self.state = DispatchState::Streaming;

        let event = StreamEvent::from_parsed(event);
        debug!("Dispatching '{}'", event.event_type_name());

        match event {
            StreamEvent::PhaseStart(phases) => self.handler.on_phase_start(&phases),
            StreamEvent::PhaseUpdate(progress) => self.handler.on_phase_update(&progress),
            StreamEvent::PhaseComplete(progress) => self.handler.on_phase_complete(&progress),
            StreamEvent::Token(token) => self.handler.on_token(&token),
            StreamEvent::MessageComplete(message) => {
                self.handler.on_message_complete(&message);
                return Dispatch::Completed(message);
            }
            StreamEvent::Error(payload) => {
                return Dispatch::Failed(StreamError::protocol(payload.detail));
            }
            StreamEvent::Unknown { name } => {
                debug!("Ignoring unknown event '{}'", name);
            }
        }

        Dispatch::Continue
    }

    /// Move to the terminal state matching `result` and run the closing
    /// callbacks: `on_error` for real failures, then `on_close`.
    ///
    /// Returns false without calling anything if already terminal.
    pub fn finish(&mut self, result: &StreamResult<StreamOutcome>) -> bool {
        if self.state.is_terminal() {
            return false;
        }

        self.state = match result {
            Ok(_) => DispatchState::Completed,
            Err(e) if e.is_cancelled() => DispatchState::Cancelled,
            Err(_) => DispatchState::Failed,
        };

        if let Err(e) = result {
            if !e.is_cancelled() {
                self.handler.on_error(e);
            }
        }
        self.handler.on_close();
        true
    }
}
