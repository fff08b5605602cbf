//! Incremental UTF-8 decoding of response body chunks.
//!
//! Transport chunks are cut at arbitrary byte offsets, so a multi-byte
//! character can straddle two chunks. The decoder holds back an incomplete
//! trailing sequence until the bytes that complete it arrive.

use std::char::REPLACEMENT_CHARACTER;

/// Stateful UTF-8 decoder that carries partial sequences across calls.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    /// Bytes of an incomplete sequence left over from the previous chunk
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a new decoder with no buffered bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, returning all text that is complete so far.
    ///
    /// An incomplete sequence at the end of the chunk is buffered rather than
    /// replaced. Bytes that can never form a valid sequence are replaced with
    /// U+FFFD.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));

                    match err.error_len() {
                        Some(invalid_len) => {
                            out.push(REPLACEMENT_CHARACTER);
                            rest = &after[invalid_len..];
                        }
                        None => {
                            // Truncated sequence: wait for the next chunk
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush any buffered bytes at end of stream.
    ///
    /// No more data will arrive, so a still-incomplete sequence is replaced.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }

    /// Whether bytes of an incomplete sequence are being held back.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
