use super::StreamDecoder;
use crate::error::{ProtocolError, Result};
use crate::frame::Frame;
use crate::metadata::LegacyEnvelope;

/// Marker that introduces the terminal JSON in the legacy text protocol.
pub const EXTRA_DATA_SENTINEL: &str = "\n[EXTRA_DATA]: ";

/// Decoder for the legacy text protocol: raw UTF-8 reply text followed by
/// `\n[EXTRA_DATA]: {"response": {...}}`.
///
/// The sentinel is searched in the accumulated bytes, not per chunk. Any
/// trailing bytes that could still grow into the sentinel are held back until
/// the next chunk (or end of stream) decides.
#[derive(Default)]
pub struct SentinelDecoder {
    pending: Vec<u8>,
    trailer: Option<Vec<u8>>,
}

impl SentinelDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit the longest prefix of `pending[..limit]` that is complete UTF-8.
    fn drain_text(&mut self, limit: usize) -> Result<Option<Frame>> {
        let valid = match std::str::from_utf8(&self.pending[..limit]) {
            Ok(_) => limit,
            // An incomplete sequence at the end waits for more bytes
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => return Err(e.into()),
        };
        if valid == 0 {
            return Ok(None);
        }
        let bytes: Vec<u8> = self.pending.drain(..valid).collect();
        let text = String::from_utf8(bytes).map_err(|e| e.utf8_error())?;
        Ok(Some(Frame::fragment(text)))
    }
}

impl StreamDecoder for SentinelDecoder {
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<Frame>> {
        if let Some(trailer) = self.trailer.as_mut() {
            trailer.extend_from_slice(chunk);
            return Ok(Vec::new());
        }

        self.pending.extend_from_slice(chunk);
        let sentinel = EXTRA_DATA_SENTINEL.as_bytes();

        if let Some(pos) = find(&self.pending, sentinel) {
            let trailer = self.pending.split_off(pos + sentinel.len());
            self.pending.truncate(pos);
            self.trailer = Some(trailer);
            let len = self.pending.len();
            let frame = self.drain_text(len)?;
            return Ok(frame.into_iter().collect());
        }

        let held = partial_suffix_len(&self.pending, sentinel);
        let limit = self.pending.len() - held;
        Ok(self.drain_text(limit)?.into_iter().collect())
    }

    fn finish(&mut self) -> Result<Vec<Frame>> {
        let mut frames = Vec::new();

        if !self.pending.is_empty() {
            let text = String::from_utf8(std::mem::take(&mut self.pending))
                .map_err(|e| e.utf8_error())?;
            frames.push(Frame::fragment(text));
        }

        if let Some(trailer) = self.trailer.take() {
            let json = std::str::from_utf8(&trailer)?.trim();
            let envelope: LegacyEnvelope =
                serde_json::from_str(json).map_err(ProtocolError::MalformedMetadata)?;
            frames.push(Frame::done(envelope.response.unwrap_or_default()));
        }

        Ok(frames)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Length of the longest suffix of `buf` that is a proper prefix of `needle`.
fn partial_suffix_len(buf: &[u8], needle: &[u8]) -> usize {
    let max = needle.len().saturating_sub(1).min(buf.len());
    (1..=max)
        .rev()
        .find(|&n| buf[buf.len() - n..] == needle[..n])
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{TerminalMetadata, UsageData};

    fn decode_all(chunks: &[&[u8]]) -> Vec<Frame> {
        let mut decoder = SentinelDecoder::new();
        let mut frames = Vec::new();
        for chunk in chunks {
            frames.extend(decoder.push(chunk).unwrap());
        }
        frames.extend(decoder.finish().unwrap());
        frames
    }

    #[test]
    fn test_plain_chunks_pass_through_in_order() {
        let frames = decode_all(&[b"Ol", "á, tudo bem?".as_bytes()]);
        assert_eq!(frames, vec![Frame::fragment("Ol"), Frame::fragment("á, tudo bem?")]);
    }

    #[test]
    fn test_terminal_in_its_own_chunk() {
        let trailer = b"\n[EXTRA_DATA]: {\"response\":{\"threadId\":\"t_123\",\"usageData\":null}}";
        let frames = decode_all(&[b"Hi", trailer]);

        assert_eq!(
            frames,
            vec![
                Frame::fragment("Hi"),
                Frame::done(TerminalMetadata::new(Some("t_123".into()), None)),
            ]
        );
    }

    #[test]
    fn test_sentinel_split_across_chunks() {
        let frames = decode_all(&[
            b"answer\n[EXTRA",
            b"_DATA]: {\"response\":{\"usageData\":",
            b"{\"prompt_tokens\":1,\"completion_tokens\":2,\"total_tokens\":3}}}",
        ]);

        assert_eq!(
            frames,
            vec![
                Frame::fragment("answer"),
                Frame::done(TerminalMetadata::new(
                    None,
                    Some(UsageData {
                        prompt_tokens: 1,
                        completion_tokens: 2,
                        total_tokens: 3,
                    })
                )),
            ]
        );
    }

    #[test]
    fn test_newline_that_is_not_a_sentinel_is_released() {
        let frames = decode_all(&[b"line one\n", b"line two"]);
        let text: String = frames
            .iter()
            .map(|f| match f {
                Frame::Fragment { text } => text.as_str(),
                other => panic!("unexpected frame {other:?}"),
            })
            .collect();
        assert_eq!(text, "line one\nline two");
    }

    #[test]
    fn test_utf8_split_across_chunks() {
        let bytes = "á".as_bytes();
        let frames = decode_all(&[&bytes[..1], &bytes[1..]]);
        assert_eq!(frames, vec![Frame::fragment("á")]);
    }

    #[test]
    fn test_missing_response_yields_empty_metadata() {
        let frames = decode_all(&[b"\n[EXTRA_DATA]: {}"]);
        assert_eq!(frames, vec![Frame::done(TerminalMetadata::default())]);
    }

    #[test]
    fn test_malformed_trailer() {
        let mut decoder = SentinelDecoder::new();
        decoder.push(b"\n[EXTRA_DATA]: {oops").unwrap();
        let err = decoder.finish().unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedMetadata(_)));
    }

    #[test]
    fn test_partial_suffix_len() {
        let needle = EXTRA_DATA_SENTINEL.as_bytes();
        assert_eq!(partial_suffix_len(b"abc", needle), 0);
        assert_eq!(partial_suffix_len(b"abc\n", needle), 1);
        assert_eq!(partial_suffix_len(b"abc\n[EXT", needle), 5);
    }
}
