use std::collections::VecDeque;

use crate::error::Result;

/// Byte buffer for line-based parsing over arbitrary chunk boundaries.
pub struct LineBuffer {
    buffer: VecDeque<u8>,
}

impl LineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract the next complete line (without its `\n` / `\r\n`).
    /// Returns None if no complete line is available.
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();

        match std::str::from_utf8(&line_bytes) {
            Ok(line) => Some(Ok(line.trim_end_matches(['\n', '\r']).to_string())),
            Err(e) => Some(Err(e.into())),
        }
    }

    /// Drain an unterminated tail left at end of stream.
    pub fn take_remaining(&mut self) -> Option<Result<String>> {
        if self.buffer.is_empty() {
            return None;
        }
        let bytes: Vec<u8> = self.buffer.drain(..).collect();
        match String::from_utf8(bytes) {
            Ok(line) => Some(Ok(line)),
            Err(e) => Some(Err(e.utf8_error().into())),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::with_capacity(4096)
    }
}
