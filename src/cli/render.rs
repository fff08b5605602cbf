//! Terminal output for a streamed answer.
//!
//! Generated text goes to `out` as it arrives; phase progress and errors go
//! to `err`, so piping stdout captures only the answer.

use std::io::Write;

use crate::error::StreamError;
use crate::models::{Message, PhaseDefinition, PhaseProgress};
use crate::sse::TokenPayload;
use crate::stream::StreamHandler;

/// [`StreamHandler`] that prints to a pair of writers.
pub struct TerminalRenderer<O, E> {
    out: O,
    err: E,
    phases: Vec<PhaseDefinition>,
    wrote_text: bool,
}

impl<O: Write + Send, E: Write + Send> TerminalRenderer<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            phases: Vec::new(),
            wrote_text: false,
        }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn label<'a>(&'a self, phase: &'a str) -> &'a str {
        self.phases
            .iter()
            .find(|p| p.id == phase)
            .map(|p| p.label.as_str())
            .unwrap_or(phase)
    }

    fn status(&mut self, line: String) {
        // Terminal write failures have nowhere better to go.
        let _ = writeln!(self.err, "{}", line);
    }
}

impl<O: Write + Send, E: Write + Send> StreamHandler for TerminalRenderer<O, E> {
    fn on_phase_start(&mut self, phases: &[PhaseDefinition]) {
        self.phases = phases.to_vec();
        let labels: Vec<&str> = phases.iter().map(|p| p.label.as_str()).collect();
        if !labels.is_empty() {
            self.status(format!("[{}]", labels.join(" > ")));
        }
    }

    fn on_phase_update(&mut self, progress: &PhaseProgress) {
        let label = self.label(&progress.phase).to_string();
        match progress.status() {
            Some(status) => self.status(format!("[{}: {}]", label, status)),
            None => self.status(format!("[{}...]", label)),
        }
    }

    fn on_phase_complete(&mut self, progress: &PhaseProgress) {
        let label = self.label(&progress.phase).to_string();
        self.status(format!("[{} done]", label));
    }

    fn on_token(&mut self, token: &TokenPayload) {
        let _ = write!(self.out, "{}", token.value);
        let _ = self.out.flush();
        self.wrote_text = true;
    }

    fn on_message_complete(&mut self, message: &Message) {
        // Servers that skip token events still send the full text here.
        if !self.wrote_text {
            let _ = write!(self.out, "{}", message.content);
        }
        let _ = writeln!(self.out);

        if !message.cited_sources.is_empty() {
            let _ = writeln!(self.out, "\nSources:");
            for (i, source) in message.cited_sources.iter().enumerate() {
                let _ = writeln!(self.out, "  [{}] {}", i + 1, source.title);
            }
        }
        let _ = self.out.flush();
    }

    fn on_error(&mut self, error: &StreamError) {
        if self.wrote_text {
            let _ = writeln!(self.out);
        }
        self.status(format!("error: {}", error.user_message()));
    }
}
