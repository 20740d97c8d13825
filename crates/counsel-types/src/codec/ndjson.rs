use super::line_buffer::LineBuffer;
use super::StreamDecoder;
use crate::error::{ProtocolError, Result};
use crate::frame::Frame;

/// Decoder for the newline-delimited JSON frame protocol.
#[derive(Default)]
pub struct FrameDecoder {
    lines: LineBuffer,
    terminated: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn decode_line(&mut self, line: &str, out: &mut Vec<Frame>) -> Result<()> {
        if line.trim().is_empty() {
            return Ok(());
        }
        if self.terminated {
            return Err(ProtocolError::TrailingData);
        }
        let frame: Frame = serde_json::from_str(line).map_err(ProtocolError::MalformedFrame)?;
        self.terminated = frame.is_terminal();
        out.push(frame);
        Ok(())
    }
}

impl StreamDecoder for FrameDecoder {
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>> {
        self.lines.extend(chunk);

        let mut frames = Vec::new();
        while let Some(line) = self.lines.next_line() {
            let line = line?;
            self.decode_line(&line, &mut frames)?;
        }
        Ok(frames)
    }

    fn finish(&mut self) -> Result<Vec<Frame>> {
        let mut frames = Vec::new();
        if let Some(tail) = self.lines.take_remaining() {
            let tail = tail?;
            self.decode_line(&tail, &mut frames)?;
        }
        Ok(frames)
    }
}
