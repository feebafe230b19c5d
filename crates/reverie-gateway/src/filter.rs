// SPDX-FileCopyrightText: 2026 Reverie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stateful think-tag filter.
//!
//! Reasoning text wrapped in `<think>...</think>` must never reach the
//! client. Because a marker may straddle any number of stream chunks, the
//! filter carries two pieces of state across calls: whether it is
//! currently inside a reasoning span, and any trailing chunk suffix that
//! could still become a full marker once more characters arrive.

/// Opening reasoning marker.
pub const THINK_OPEN: &str = "<think>";

/// Closing reasoning marker.
pub const THINK_CLOSE: &str = "</think>";

/// Strips `<think>` spans from chunked text, preserving correctness for
/// markers split across chunk boundaries.
#[derive(Debug, Default)]
pub struct ThinkFilter {
    /// Currently inside a reasoning span.
    inside: bool,
    /// Trailing text from the previous chunk that is still a proper
    /// prefix of the marker we are looking for.
    pending: String,
}

impl ThinkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning the client-visible portion.
    ///
    /// May return an empty string when the chunk was consumed entirely by
    /// a reasoning span or held back as a possible partial marker.
    pub fn push(&mut self, chunk: &str) -> String {
        let mut buffer = std::mem::take(&mut self.pending);
        buffer.push_str(chunk);

        let mut visible = String::new();
        loop {
            if self.inside {
                if let Some(pos) = buffer.find(THINK_CLOSE) {
                    // Reasoning up to and including the marker is dropped;
                    // anything after it is reprocessed as outside text.
                    buffer.drain(..pos + THINK_CLOSE.len());
                    self.inside = false;
                } else {
                    // All reasoning except a tail that may yet become the
                    // closing marker.
                    let keep = partial_marker_len(&buffer, THINK_CLOSE);
                    buffer.drain(..buffer.len() - keep);
                    self.pending = buffer;
                    return visible;
                }
            } else if let Some(pos) = buffer.find(THINK_OPEN) {
                visible.push_str(&buffer[..pos]);
                buffer.drain(..pos + THINK_OPEN.len());
                self.inside = true;
            } else {
                let keep = partial_marker_len(&buffer, THINK_OPEN);
                let emit_to = buffer.len() - keep;
                visible.push_str(&buffer[..emit_to]);
                buffer.drain(..emit_to);
                self.pending = buffer;
                return visible;
            }
        }
    }

    /// Flush at end of stream.
    ///
    /// A held-back tail that never grew into a marker is ordinary text
    /// when outside a reasoning span, and reasoning when inside.
    pub fn finish(&mut self) -> String {
        let pending = std::mem::take(&mut self.pending);
        if self.inside {
            String::new()
        } else {
            pending
        }
    }
}

/// Length of the longest buffer suffix that is a proper prefix of
/// `marker`.
///
/// Markers are ASCII, so any match starts on a char boundary and the
/// caller may slice the buffer at `len - result`.
fn partial_marker_len(buffer: &str, marker: &str) -> usize {
    let b = buffer.as_bytes();
    let m = marker.as_bytes();
    let max = (m.len() - 1).min(b.len());
    for len in (1..=max).rev() {
        if b[b.len() - len..] == m[..len] {
            return len;
        }
    }
    0
}
