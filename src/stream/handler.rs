//! Consumer callback interface.
//!
//! A [`StreamHandler`] receives the events of one session in arrival order.
//! Every method has a no-op default so implementors only override what they
//! care about. [`StreamCallbacks`] is a closure-based handler for callers that
//! prefer not to declare a type.

use crate::error::StreamError;
use crate::models::{Message, PhaseDefinition, PhaseProgress};
use crate::sse::TokenPayload;

/// Observer for the events of a stream session.
///
/// Methods are called sequentially from the session task, never after the
/// session has settled. [`StreamHandler::on_close`] is the exception: it is
/// called exactly once, as the very last call, whatever the outcome.
pub trait StreamHandler: Send {
    /// The pipeline announced its phases.
    fn on_phase_start(&mut self, _phases: &[PhaseDefinition]) {}

    /// A phase reported progress.
    fn on_phase_update(&mut self, _progress: &PhaseProgress) {}

    /// A phase finished.
    fn on_phase_complete(&mut self, _progress: &PhaseProgress) {}

    /// One increment of generated text arrived.
    fn on_token(&mut self, _token: &TokenPayload) {}

    /// The finalized message arrived.
    fn on_message_complete(&mut self, _message: &Message) {}

    /// The session failed. Not called for cancellations.
    fn on_error(&mut self, _error: &StreamError) {}

    /// The session is over.
    fn on_close(&mut self) {}
}

type Callback<T> = Option<Box<dyn FnMut(&T) + Send>>;

/// [`StreamHandler`] built from optional closures.
///
/// # Example
///
/// ```
/// use ragchat::stream::StreamCallbacks;
///
/// let callbacks = StreamCallbacks::new()
///     .with_token(|token| print!("{}", token.value))
///     .with_close(|| println!());
/// ```
#[derive(Default)]
pub struct StreamCallbacks {
    phase_start: Option<Box<dyn FnMut(&[PhaseDefinition]) + Send>>,
    phase_update: Callback<PhaseProgress>,
    phase_complete: Callback<PhaseProgress>,
    token: Callback<TokenPayload>,
    message_complete: Callback<Message>,
    error: Callback<StreamError>,
    close: Option<Box<dyn FnMut() + Send>>,
}

impl StreamCallbacks {
    /// Create a set of callbacks that does nothing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_phase_start<F>(mut self, f: F) -> Self
    where
        F: FnMut(&[PhaseDefinition]) + Send + 'static,
    {
        self.phase_start = Some(Box::new(f));
        self
    }

    pub fn with_phase_update<F>(mut self, f: F) -> Self
    where
        F: FnMut(&PhaseProgress) + Send + 'static,
    {
        self.phase_update = Some(Box::new(f));
        self
    }

    pub fn with_phase_complete<F>(mut self, f: F) -> Self
    where
        F: FnMut(&PhaseProgress) + Send + 'static,
    {
        self.phase_complete = Some(Box::new(f));
        self
    }

    pub fn with_token<F>(mut self, f: F) -> Self
    where
        F: FnMut(&TokenPayload) + Send + 'static,
    {
        self.token = Some(Box::new(f));
        self
    }

    pub fn with_message_complete<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Message) + Send + 'static,
    {
        self.message_complete = Some(Box::new(f));
        self
    }

    pub fn with_error<F>(mut self, f: F) -> Self
    where
        F: FnMut(&StreamError) + Send + 'static,
    {
        self.error = Some(Box::new(f));
        self
    }

    pub fn with_close<F>(mut self, f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.close = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for StreamCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCallbacks")
            .field("phase_start", &self.phase_start.is_some())
            .field("phase_update", &self.phase_update.is_some())
            .field("phase_complete", &self.phase_complete.is_some())
            .field("token", &self.token.is_some())
            .field("message_complete", &self.message_complete.is_some())
            .field("error", &self.error.is_some())
            .field("close", &self.close.is_some())
            .finish()
    }
}

impl StreamHandler for StreamCallbacks {
    fn on_phase_start(&mut self, phases: &[PhaseDefinition]) {
        if let Some(f) = self.phase_start.as_mut() {
            f(phases);
        }
    }

    fn on_phase_update(&mut self, progress: &PhaseProgress) {
        if let Some(f) = self.phase_update.as_mut() {
            f(progress);
        }
    }

    fn on_phase_complete(&mut self, progress: &PhaseProgress) {
        if let Some(f) = self.phase_complete.as_mut() {
            f(progress);
        }
    }

    fn on_token(&mut self, token: &TokenPayload) {
        if let Some(f) = self.token.as_mut() {
            f(token);
        }
    }

    fn on_message_complete(&mut self, message: &Message) {
        if let Some(f) = self.message_complete.as_mut() {
            f(message);
        }
    }

    fn on_error(&mut self, error: &StreamError) {
        if let Some(f) = self.error.as_mut() {
            f(error);
        }
    }

    fn on_close(&mut self) {
        if let Some(f) = self.close.as_mut() {
            f();
        }
    }
}
