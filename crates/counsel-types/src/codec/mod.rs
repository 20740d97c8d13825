mod line_buffer;
mod ndjson;
mod sentinel;

pub use line_buffer::LineBuffer;
pub use ndjson::FrameDecoder;
pub use sentinel::{SentinelDecoder, EXTRA_DATA_SENTINEL};

use crate::error::Result;
use crate::frame::Frame;

/// Incremental decoder for a relay response body.
///
/// Bytes may be split anywhere (inside a UTF-8 sequence, inside a JSON line,
/// inside the legacy sentinel); decoders buffer until a unit is complete.
pub trait StreamDecoder: Send {
    /// Feed the next chunk; returns the frames it completed, in order.
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>>;

    /// Signal end of stream; flushes whatever is still buffered.
    fn finish(&mut self) -> Result<Vec<Frame>>;
}
