//! Frame buffering.
//!
//! Accumulates decoded text and cuts it into frames at blank lines. The
//! trailing partial frame stays buffered until more text arrives or the
//! stream ends.

/// Separator between two frames on the wire.
pub const FRAME_SEPARATOR: &str = "\n\n";

/// Buffer that yields complete frames from incrementally decoded text.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buffer: String,
}

impl FrameSplitter {
    /// Create an empty splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text and drain every frame completed by it, in order.
    ///
    /// Only the new text, plus a newline just before it, is searched for the
    /// first separator, so a large frame arriving in many small pieces is not
    /// rescanned on every push.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        let mut from = self.scan_start();
        self.buffer.push_str(text);

        let mut frames = Vec::new();
        while let Some(offset) = self.buffer[from..].find(FRAME_SEPARATOR) {
            let idx = from + offset;
            frames.push(self.buffer[..idx].to_string());
            self.buffer.drain(..idx + FRAME_SEPARATOR.len());
            from = 0;
        }
        frames
    }

    /// First byte where a separator could still begin. The buffer never
    /// holds a complete separator between pushes.
    fn scan_start(&self) -> usize {
        if self.buffer.ends_with('\n') {
            self.buffer.len() - 1
        } else {
            self.buffer.len()
        }
    }

    /// Take the remaining buffer at end of stream.
    ///
    /// Returns it as a final frame unless it is blank after trimming.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        if rest.trim().is_empty() {
            None
        } else {
            Some(rest)
        }
    }

    /// Text received but not yet part of a complete frame.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }
}
